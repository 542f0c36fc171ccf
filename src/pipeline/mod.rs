//! Step-based pipeline front-end.
//!
//! The pipeline runs three stages strictly in sequence over one in-memory
//! table:
//!
//! 1. **Preprocess**: load the CSV, impute missing numerics, map
//!    availability labels, synthesize estimated sales.
//! 2. **Score**: min-max normalize the features and compute the weighted
//!    global score.
//! 3. **Train**: fit the random forest on the scored table, persist the
//!    model and export the top-K products.
//!
//! The same step definitions feed the manifest compiler in
//! [`crate::manifest`], which describes the pipeline without executing it.

pub mod config;
pub mod runner;
pub mod step;

pub use config::{ConfigError, PipelineConfig};
pub use runner::{PipelineRunner, RunSummary};
pub use step::{
    standard_steps, PipelineContext, PipelineStep, PreprocessStep, ScoreStep, StepError, TrainStep,
};
