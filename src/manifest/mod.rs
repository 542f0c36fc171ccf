//! Manifest compiler front-end.
//!
//! Instead of executing the pipeline, this front-end compiles the same step
//! definitions into a YAML manifest: an ordered list of components with
//! their logical inputs, outputs and dependency edges, plus the run
//! parameters. The manifest round-trips through serde so external
//! orchestrators can consume or regenerate it.

pub mod compiler;

pub use compiler::{compile_standard_manifest, ComponentSpec, PipelineManifest};
