//! Sequential step runner.
//!
//! Drives the standard steps in order over one shared context. There is no
//! concurrency between steps: each stage consumes the previous stage's
//! output in full before the next one starts.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::pipeline::config::PipelineConfig;
use crate::pipeline::step::{standard_steps, PipelineContext, PipelineStep, StepError};

/// Serializable summary of one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Rows read from the input CSV.
    pub rows_loaded: usize,
    /// Malformed rows dropped by the loader.
    pub rows_skipped: usize,
    /// Which fallback parser loaded the file.
    pub parser: String,
    /// Rows carrying a global score after the scoring stage.
    pub rows_scored: usize,
    /// Whether an empty input was padded with a neutral row.
    pub padded: bool,
    /// R² on the training split.
    pub train_r2: f64,
    /// R² on the held-out split.
    pub test_r2: f64,
    /// Path of the model artifact.
    pub model_path: String,
    /// Path of the top-K CSV.
    pub top_products_path: String,
    /// Rows written to the top-K CSV.
    pub top_rows: usize,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

/// Executes the pipeline steps sequentially.
pub struct PipelineRunner {
    config: PipelineConfig,
}

impl PipelineRunner {
    /// Creates a runner for the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Runs the standard three-step pipeline.
    pub async fn run(&self) -> Result<RunSummary, StepError> {
        self.run_steps(standard_steps()).await
    }

    /// Runs an explicit step sequence, mainly for tests.
    pub async fn run_steps(
        &self,
        steps: Vec<Box<dyn PipelineStep>>,
    ) -> Result<RunSummary, StepError> {
        let started = Instant::now();
        let mut ctx = PipelineContext::new(self.config.clone());

        for step in &steps {
            let step_started = Instant::now();
            info!(step = step.name(), "Starting step");
            step.execute(&mut ctx).await?;
            info!(
                step = step.name(),
                elapsed_ms = step_started.elapsed().as_millis() as u64,
                "Step complete"
            );
        }

        let summary = summarize(&ctx, started.elapsed().as_millis() as u64);
        info!(
            rows = summary.rows_loaded,
            top_rows = summary.top_rows,
            elapsed_ms = summary.elapsed_ms,
            "Pipeline run complete"
        );
        Ok(summary)
    }
}

fn summarize(ctx: &PipelineContext, elapsed_ms: u64) -> RunSummary {
    let load = ctx.load_report.as_ref();
    let score = ctx.score_report.as_ref();
    let model = ctx.model.as_ref();
    let export = ctx.export_paths.as_ref();

    RunSummary {
        rows_loaded: load.map(|r| r.rows_loaded).unwrap_or_default(),
        rows_skipped: load.map(|r| r.rows_skipped).unwrap_or_default(),
        parser: load.map(|r| r.parser.clone()).unwrap_or_default(),
        rows_scored: score.map(|r| r.rows_scored).unwrap_or_default(),
        padded: score.map(|r| r.padded).unwrap_or_default(),
        train_r2: model.map(|m| m.train_r2).unwrap_or_default(),
        test_r2: model.map(|m| m.test_r2).unwrap_or_default(),
        model_path: export
            .map(|p| p.model_path.display().to_string())
            .unwrap_or_default(),
        top_products_path: export
            .map(|p| p.top_products_path.display().to_string())
            .unwrap_or_default(),
        top_rows: export.map(|p| p.rows_written).unwrap_or_default(),
        elapsed_ms,
        finished_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_csv(rows: usize) -> String {
        let mut content = String::from("titre,prix,note_moyenne,disponibilite\n");
        for i in 0..rows {
            let availability = match i % 3 {
                0 => "En stock",
                1 => "Rupture",
                _ => "Précommande",
            };
            content.push_str(&format!(
                "produit_{i},{price:.2},{rating:.1},{availability}\n",
                price = 5.0 + i as f64 * 1.7,
                rating = 1.0 + (i % 5) as f64,
            ));
        }
        content
    }

    #[tokio::test]
    async fn test_full_run_produces_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("produits.csv");
        std::fs::File::create(&input)
            .and_then(|mut f| f.write_all(sample_csv(30).as_bytes()))
            .expect("write input");

        let config = PipelineConfig::new()
            .with_input_path(&input)
            .with_output_dir(dir.path().join("out"))
            .with_n_trees(10);
        let summary = PipelineRunner::new(config).run().await.expect("run");

        assert_eq!(summary.rows_loaded, 30);
        assert_eq!(summary.rows_scored, 30);
        assert_eq!(summary.top_rows, 5);
        assert!(!summary.padded);
        assert!(std::path::Path::new(&summary.model_path).exists());
        assert!(std::path::Path::new(&summary.top_products_path).exists());
    }

    #[tokio::test]
    async fn test_runs_are_deterministic_per_seed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("produits.csv");
        std::fs::File::create(&input)
            .and_then(|mut f| f.write_all(sample_csv(20).as_bytes()))
            .expect("write input");

        let mut outputs = Vec::new();
        for run in 0..2 {
            let config = PipelineConfig::new()
                .with_input_path(&input)
                .with_output_dir(dir.path().join(format!("out_{run}")))
                .with_n_trees(5)
                .with_seed(7);
            let summary = PipelineRunner::new(config).run().await.expect("run");
            outputs.push((
                std::fs::read_to_string(&summary.top_products_path).expect("read top"),
                summary.train_r2,
            ));
        }

        assert_eq!(outputs[0].0, outputs[1].0);
        assert!((outputs[0].1 - outputs[1].1).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_missing_input_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PipelineConfig::new()
            .with_input_path(dir.path().join("absent.csv"))
            .with_output_dir(dir.path().join("out"));

        let result = PipelineRunner::new(config).run().await;
        assert!(matches!(result, Err(StepError::Dataset(_))));
    }
}
