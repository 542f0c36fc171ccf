//! Pipeline configuration.
//!
//! Configuration follows the builder-plus-environment pattern: defaults via
//! `Default`, `RANKFORGE_*` environment overrides via `from_env`, `with_*`
//! builder methods, and a `validate` pass before the pipeline runs.

use std::path::PathBuf;
use thiserror::Error;

use crate::export::artifacts::{MODEL_FILE, TOP_PRODUCTS_FILE};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Input CSV of scraped products.
    pub input_path: PathBuf,
    /// Directory receiving the model and top-K artifacts.
    pub output_dir: PathBuf,
    /// Seed driving sales synthesis, the train/test split and bootstrapping.
    pub seed: u64,
    /// Number of trees in the forest.
    pub n_trees: usize,
    /// Fraction of rows held out for the test split.
    pub test_fraction: f64,
    /// File name of the model artifact inside `output_dir`.
    pub model_file: String,
    /// File name of the top-K CSV inside `output_dir`.
    pub top_products_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("produits_scrapy.csv"),
            output_dir: PathBuf::from("./output"),
            seed: 42,
            n_trees: 100,
            test_fraction: 0.2,
            model_file: MODEL_FILE.to_string(),
            top_products_file: TOP_PRODUCTS_FILE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RANKFORGE_INPUT`: input CSV path
    /// - `RANKFORGE_OUTPUT_DIR`: artifact output directory
    /// - `RANKFORGE_SEED`: run seed (default: 42)
    /// - `RANKFORGE_TREES`: forest size (default: 100)
    /// - `RANKFORGE_TEST_FRACTION`: held-out fraction (default: 0.2)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value or the
    /// resulting configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RANKFORGE_INPUT") {
            config.input_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("RANKFORGE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("RANKFORGE_SEED") {
            config.seed = parse_env_value(&val, "RANKFORGE_SEED")?;
        }
        if let Ok(val) = std::env::var("RANKFORGE_TREES") {
            config.n_trees = parse_env_value(&val, "RANKFORGE_TREES")?;
        }
        if let Ok(val) = std::env::var("RANKFORGE_TEST_FRACTION") {
            config.test_fraction = parse_env_value(&val, "RANKFORGE_TEST_FRACTION")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::ValidationFailed(
                "n_trees must be greater than 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(ConfigError::ValidationFailed(
                "test_fraction must be in [0.0, 1.0)".to_string(),
            ));
        }
        if self.model_file.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "model_file cannot be empty".to_string(),
            ));
        }
        if self.top_products_file.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "top_products_file cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder method to set the input CSV path.
    pub fn with_input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = path.into();
        self
    }

    /// Builder method to set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder method to set the run seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to set the forest size.
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Builder method to set the held-out fraction.
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    /// Builder method to set the model artifact file name.
    pub fn with_model_file(mut self, name: impl Into<String>) -> Self {
        self.model_file = name.into();
        self
    }

    /// Builder method to set the top-K CSV file name.
    pub fn with_top_products_file(mut self, name: impl Into<String>) -> Self {
        self.top_products_file = name.into();
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
