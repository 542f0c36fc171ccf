//! Artifact export: the fitted model and the top-K product CSV.

pub mod artifacts;

pub use artifacts::{export_artifacts, write_top_products, ExportPaths, TOP_K};
