//! Compilation of step definitions into a YAML pipeline manifest.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CompileError;
use crate::pipeline::step::{standard_steps, PipelineStep};
use crate::pipeline::PipelineConfig;

/// Manifest schema version.
pub const API_VERSION: &str = "rankforge/v1";

/// One component (step) in the compiled manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Component name, matching the step name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Logical artifacts consumed.
    pub inputs: Vec<String>,
    /// Logical artifacts produced.
    pub outputs: Vec<String>,
    /// Components that must complete first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

/// A compiled, executable-order description of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineManifest {
    /// Manifest schema version.
    pub api_version: String,
    /// Pipeline name.
    pub name: String,
    /// Pipeline description.
    pub description: String,
    /// Run parameters with their default values.
    pub parameters: BTreeMap<String, String>,
    /// Components in execution order.
    pub components: Vec<ComponentSpec>,
}

impl PipelineManifest {
    /// Builds a manifest from step definitions, chaining each step onto the
    /// previous one.
    pub fn from_steps(
        name: impl Into<String>,
        description: impl Into<String>,
        steps: &[Box<dyn PipelineStep>],
        parameters: BTreeMap<String, String>,
    ) -> Self {
        let mut components = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let depends_on = if i == 0 {
                Vec::new()
            } else {
                vec![steps[i - 1].name().to_string()]
            };
            components.push(ComponentSpec {
                name: step.name().to_string(),
                description: step.description().to_string(),
                inputs: step.inputs(),
                outputs: step.outputs(),
                depends_on,
            });
        }

        Self {
            api_version: API_VERSION.to_string(),
            name: name.into(),
            description: description.into(),
            parameters,
            components,
        }
    }

    /// Validates component structure: non-empty, unique names, known
    /// dependency references.
    pub fn validate(&self) -> Result<(), CompileError> {
        if self.components.is_empty() {
            return Err(CompileError::EmptyManifest);
        }

        let mut seen = Vec::new();
        for component in &self.components {
            if seen.contains(&component.name.as_str()) {
                return Err(CompileError::DuplicateComponent(component.name.clone()));
            }
            for dependency in &component.depends_on {
                if !seen.contains(&dependency.as_str()) {
                    return Err(CompileError::UnknownDependency {
                        component: component.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
            seen.push(component.name.as_str());
        }
        Ok(())
    }

    /// Serializes the manifest to YAML.
    pub fn to_yaml(&self) -> Result<String, CompileError> {
        self.validate()?;
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parses a manifest back from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, CompileError> {
        let manifest: Self = serde_yaml::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Compiles the manifest to a YAML file.
    pub fn compile_to_file(&self, path: impl AsRef<Path>) -> Result<(), CompileError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_yaml()?)?;
        info!(path = %path.display(), components = self.components.len(), "Compiled pipeline manifest");
        Ok(())
    }
}

/// Compiles the standard three-step pipeline into a manifest, deriving the
/// parameter defaults from a pipeline configuration.
pub fn compile_standard_manifest(
    name: impl Into<String>,
    config: &PipelineConfig,
) -> PipelineManifest {
    let mut parameters = BTreeMap::new();
    parameters.insert(
        "input_file".to_string(),
        config.input_path.display().to_string(),
    );
    parameters.insert(
        "output_dir".to_string(),
        config.output_dir.display().to_string(),
    );
    parameters.insert("seed".to_string(), config.seed.to_string());
    parameters.insert("n_trees".to_string(), config.n_trees.to_string());

    PipelineManifest::from_steps(
        name,
        "Preprocess scraped products, train a scoring model and select the top-K",
        &standard_steps(),
        parameters,
    )
}
