//! The step abstraction shared by both front-ends.
//!
//! Each stage of the pipeline is a [`PipelineStep`] operating on a shared
//! [`PipelineContext`]. The runner awaits the steps strictly in order, and
//! the manifest compiler reads the same step definitions to describe the
//! pipeline without executing it.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::dataset::{load_products, LoadReport, ProductTable};
use crate::error::{DatasetError, ExportError, ModelError};
use crate::export::{export_artifacts, ExportPaths};
use crate::model::{train_scoring_model, ForestConfig, ScoringModel};
use crate::pipeline::config::PipelineConfig;
use crate::preprocess::{preprocess_table, PreprocessReport};
use crate::score::{score_table, ScoreReport};

/// Errors that can occur while executing a pipeline step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Step '{step}' requires output of step '{requires}' which has not run")]
    MissingUpstream {
        step: &'static str,
        requires: &'static str,
    },
}

/// Shared state handed from step to step.
#[derive(Debug)]
pub struct PipelineContext {
    /// Run configuration.
    pub config: PipelineConfig,
    /// The table being transformed.
    pub table: ProductTable,
    /// Filled by the preprocess step.
    pub load_report: Option<LoadReport>,
    /// Filled by the preprocess step.
    pub preprocess_report: Option<PreprocessReport>,
    /// Filled by the score step.
    pub score_report: Option<ScoreReport>,
    /// Filled by the train step.
    pub model: Option<ScoringModel>,
    /// Filled by the train step.
    pub export_paths: Option<ExportPaths>,
}

impl PipelineContext {
    /// Creates a fresh context for one run.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            table: ProductTable::new(),
            load_report: None,
            preprocess_report: None,
            score_report: None,
            model: None,
            export_paths: None,
        }
    }
}

/// One stage of the pipeline.
#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Stable step name, also used as the manifest component name.
    fn name(&self) -> &'static str;

    /// One-line description for logs and the manifest.
    fn description(&self) -> &'static str;

    /// Logical artifacts the step consumes.
    fn inputs(&self) -> Vec<String>;

    /// Logical artifacts the step produces.
    fn outputs(&self) -> Vec<String>;

    /// Executes the step against the shared context.
    async fn execute(&self, ctx: &mut PipelineContext) -> Result<(), StepError>;
}

/// Stage 1: load the CSV, impute, map availability, synthesize sales.
pub struct PreprocessStep;

#[async_trait]
impl PipelineStep for PreprocessStep {
    fn name(&self) -> &'static str {
        "preprocess"
    }

    fn description(&self) -> &'static str {
        "Load the product CSV, impute missing values and synthesize sales"
    }

    fn inputs(&self) -> Vec<String> {
        vec!["input_csv".to_string()]
    }

    fn outputs(&self) -> Vec<String> {
        vec!["product_table".to_string()]
    }

    async fn execute(&self, ctx: &mut PipelineContext) -> Result<(), StepError> {
        let (table, load_report) = load_products(&ctx.config.input_path)?;
        info!(
            rows = load_report.rows_loaded,
            skipped = load_report.rows_skipped,
            parser = %load_report.parser,
            "Loaded {} products",
            load_report.rows_loaded
        );

        ctx.table = table;
        let report = preprocess_table(&mut ctx.table, ctx.config.seed);
        ctx.load_report = Some(load_report);
        ctx.preprocess_report = Some(report);
        Ok(())
    }
}

/// Stage 2: normalize features and compute the global score.
pub struct ScoreStep;

#[async_trait]
impl PipelineStep for ScoreStep {
    fn name(&self) -> &'static str {
        "score"
    }

    fn description(&self) -> &'static str {
        "Min-max normalize features and compute the weighted global score"
    }

    fn inputs(&self) -> Vec<String> {
        vec!["product_table".to_string()]
    }

    fn outputs(&self) -> Vec<String> {
        vec!["scored_table".to_string()]
    }

    async fn execute(&self, ctx: &mut PipelineContext) -> Result<(), StepError> {
        if ctx.preprocess_report.is_none() {
            return Err(StepError::MissingUpstream {
                step: self.name(),
                requires: "preprocess",
            });
        }
        ctx.score_report = Some(score_table(&mut ctx.table));
        Ok(())
    }
}

/// Stage 3: train the forest, persist it and export the top-K products.
pub struct TrainStep;

#[async_trait]
impl PipelineStep for TrainStep {
    fn name(&self) -> &'static str {
        "train"
    }

    fn description(&self) -> &'static str {
        "Train the scoring model and export the model and top-K artifacts"
    }

    fn inputs(&self) -> Vec<String> {
        vec!["scored_table".to_string()]
    }

    fn outputs(&self) -> Vec<String> {
        vec!["model_json".to_string(), "top_products_csv".to_string()]
    }

    async fn execute(&self, ctx: &mut PipelineContext) -> Result<(), StepError> {
        if ctx.score_report.is_none() {
            return Err(StepError::MissingUpstream {
                step: self.name(),
                requires: "score",
            });
        }

        let forest_config = ForestConfig::new()
            .with_n_trees(ctx.config.n_trees)
            .with_seed(ctx.config.seed);
        let model = train_scoring_model(&ctx.table, forest_config, ctx.config.test_fraction)?;

        let paths = export_artifacts(
            &ctx.table,
            &model,
            &ctx.config.output_dir,
            &ctx.config.model_file,
            &ctx.config.top_products_file,
        )?;

        ctx.model = Some(model);
        ctx.export_paths = Some(paths);
        Ok(())
    }
}

/// The three stages in execution order.
pub fn standard_steps() -> Vec<Box<dyn PipelineStep>> {
    vec![
        Box::new(PreprocessStep),
        Box::new(ScoreStep),
        Box::new(TrainStep),
    ]
}
