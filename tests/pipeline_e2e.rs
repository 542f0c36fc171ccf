//! End-to-end tests for the scoring pipeline.
//!
//! These run the full three-stage pipeline against temporary CSV files and
//! check the exported artifacts.

use std::io::Write;
use std::path::Path;

use rankforge::manifest::{compile_standard_manifest, PipelineManifest};
use rankforge::model::ScoringModel;
use rankforge::pipeline::{PipelineConfig, PipelineRunner};

fn write_file(path: &Path, content: &str) {
    let mut file = std::fs::File::create(path).expect("create file");
    file.write_all(content.as_bytes()).expect("write file");
}

fn catalog_csv(rows: usize) -> String {
    let mut content = String::from("titre,prix,note_moyenne,disponibilite\n");
    for i in 0..rows {
        let availability = match i % 4 {
            0 => "En stock",
            1 => "Rupture",
            2 => "En stock",
            _ => "Inconnu",
        };
        content.push_str(&format!(
            "produit_{i},{price:.2},{rating:.1},{availability}\n",
            price = 3.0 + (i as f64 * 2.3) % 90.0,
            rating = 1.0 + (i % 5) as f64 * 0.9,
        ));
    }
    content
}

async fn run_pipeline(input: &Path, output: &Path, seed: u64) -> rankforge::pipeline::RunSummary {
    let config = PipelineConfig::new()
        .with_input_path(input)
        .with_output_dir(output)
        .with_n_trees(20)
        .with_seed(seed);
    PipelineRunner::new(config).run().await.expect("pipeline run")
}

#[tokio::test]
async fn test_top_five_sorted_by_descending_score() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("produits.csv");
    write_file(&input, &catalog_csv(40));

    let summary = run_pipeline(&input, &dir.path().join("out"), 42).await;
    assert_eq!(summary.top_rows, 5);

    let content = std::fs::read_to_string(&summary.top_products_path).expect("top csv");
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let score_col = reader
        .headers()
        .expect("headers")
        .iter()
        .position(|h| h == "global_score")
        .expect("global_score column");

    let scores: Vec<f64> = reader
        .records()
        .map(|r| r.expect("record")[score_col].parse::<f64>().expect("score"))
        .collect();

    assert_eq!(scores.len(), 5);
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1], "scores not descending: {scores:?}");
    }
    // All scores are convex combinations of [0, 1] features.
    for score in &scores {
        assert!((0.0..=1.0).contains(score));
    }
}

#[tokio::test]
async fn test_model_artifact_reloads_and_predicts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("produits.csv");
    write_file(&input, &catalog_csv(50));

    let summary = run_pipeline(&input, &dir.path().join("out"), 42).await;
    assert!(summary.train_r2 > 0.5, "train R² was {}", summary.train_r2);

    let model = ScoringModel::load(&summary.model_path).expect("load model");
    assert_eq!(model.forest.tree_count(), 20);
    assert_eq!(
        model.feature_names,
        vec![
            "average_rating",
            "price_inverted",
            "estimated_sales",
            "availability_score"
        ]
    );

    // A neutral row predicts somewhere inside the score range.
    let features = ndarray::array![[0.5, 0.5, 0.5, 0.5]];
    let prediction = model.forest.predict(features.view())[0];
    assert!((0.0..=1.0).contains(&prediction));
}

#[tokio::test]
async fn test_missing_optional_columns_fall_back_to_neutral() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("produits.csv");
    // No availability column at all, one missing rating.
    write_file(
        &input,
        "titre,prix,note_moyenne\na,10.0,4.0\nb,20.0,\nc,5.0,2.0\n",
    );

    let summary = run_pipeline(&input, &dir.path().join("out"), 42).await;
    assert_eq!(summary.rows_loaded, 3);
    assert_eq!(summary.top_rows, 3);

    let content = std::fs::read_to_string(&summary.top_products_path).expect("top csv");
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers = reader.headers().expect("headers").clone();
    let availability_col = headers
        .iter()
        .position(|h| h == "availability_score")
        .expect("availability_score column");

    // Every row got the neutral availability, which min-max scales to 0.
    for record in reader.records() {
        let value: f64 = record.expect("record")[availability_col]
            .parse()
            .expect("numeric");
        assert_eq!(value, 0.0);
    }
}

#[tokio::test]
async fn test_semicolon_delimited_input_is_recovered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("produits.csv");
    write_file(
        &input,
        "titre;prix;note_moyenne;disponibilite\n\
         a;19,99;4,5;En stock\n\
         b;5,00;2,0;Rupture\n\
         c;12,50;3,5;En stock\n",
    );

    let summary = run_pipeline(&input, &dir.path().join("out"), 42).await;
    assert!(summary.parser.starts_with("sniff"));
    assert_eq!(summary.rows_loaded, 3);
    assert_eq!(summary.top_rows, 3);
}

#[tokio::test]
async fn test_empty_catalog_still_produces_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("produits.csv");
    write_file(&input, "titre,prix,note_moyenne,disponibilite\n");

    let summary = run_pipeline(&input, &dir.path().join("out"), 42).await;
    assert_eq!(summary.rows_loaded, 0);
    assert!(summary.padded);
    assert_eq!(summary.rows_scored, 1);
    assert_eq!(summary.top_rows, 1);
    assert!(Path::new(&summary.model_path).exists());
}

#[test]
fn test_compiled_manifest_matches_runner_steps() {
    let manifest = compile_standard_manifest("product-scoring", &PipelineConfig::default());
    let yaml = manifest.to_yaml().expect("yaml");
    let parsed = PipelineManifest::from_yaml(&yaml).expect("parse");

    let names: Vec<&str> = parsed.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["preprocess", "score", "train"]);
    assert_eq!(
        parsed.components[2].outputs,
        vec!["model_json", "top_products_csv"]
    );
}
