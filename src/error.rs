//! Error types for rankforge operations.
//!
//! Defines error types for the major subsystems:
//! - Dataset loading and CSV parsing
//! - Model training and serialization
//! - Artifact export (model file, top-K CSV)
//! - Pipeline manifest compilation

use thiserror::Error;

/// Errors that can occur while loading or transforming the product table.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Input file not found: {0}")]
    FileNotFound(String),

    #[error("No parsable records in '{path}' after exhausting fallback parsers")]
    Unparsable { path: String },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during model training and persistence.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Feature matrix shape mismatch: {rows} rows but {targets} targets")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("Invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    #[error("Model serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while exporting pipeline artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No products to export")]
    NoProducts,

    #[error("Model artifact error: {0}")]
    Model(#[from] ModelError),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while compiling the pipeline manifest.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Manifest has no components")]
    EmptyManifest,

    #[error("Component '{component}' depends on unknown component '{dependency}'")]
    UnknownDependency {
        component: String,
        dependency: String,
    },

    #[error("Duplicate component name '{0}' in manifest")]
    DuplicateComponent(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
