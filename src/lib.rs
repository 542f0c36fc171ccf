//! rankforge: product catalog scoring pipeline.
//!
//! This library preprocesses a scraped product catalog, derives a weighted
//! attractiveness score, trains a random forest regressor to predict it and
//! exports the fitted model together with the top-K ranked products. Two
//! front-ends wrap the same three-stage logic: a sequential step runner and
//! a YAML manifest compiler.

// Core modules
pub mod cli;
pub mod dataset;
pub mod error;
pub mod export;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod score;

// Re-export commonly used error types
pub use error::{CompileError, DatasetError, ExportError, ModelError};
