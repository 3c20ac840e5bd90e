// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! TOML pipeline definition parsing and validation.
//!
//! The pipeline definition file is the declaration source for the compiler:
//! it lists the processing steps, cross-cutting aspects, an optional
//! orchestrator template, and the type symbols the compiler resolves delegate
//! and mapper references against.
//!
//! ```toml
//! [pipeline]
//! module = "orders"
//! transport = "grpc"
//!
//! [[steps]]
//! name = "enrich"
//! target = "com.acme.enrich.EnrichService"
//! input = "com.acme.model.Order"
//! output = "com.acme.model.EnrichedOrder"
//! ```

mod error;
mod options;
mod step;
mod symbol;
mod validate;

use std::{collections::BTreeMap, path::Path};

pub use error::{Error, Result};
use flowgen_model::{
    AspectModel, OrchestratorDeclaration, PlatformMode, StepDeclaration, TransportMode,
};
pub use options::{ParallelismPolicy, keys};
use serde::Deserialize;
pub use step::{AspectDef, StepDef};
pub use symbol::{IdentityDef, ImplementsDef, InterfaceKind, TypeDef};

/// The `[pipeline]` section: module identity and pipeline-wide modes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// Module name; also the default orchestrator naming root.
    pub module: String,
    /// Pipeline-wide transport. Defaults to gRPC.
    pub transport: Option<TransportMode>,
    /// Deployment platform. Defaults to standard.
    pub platform: Option<PlatformMode>,
    /// Path to the protocol descriptor set, relative to the definition file.
    pub descriptor_set: Option<String>,
    /// Free-form option entries merged into the flat option map.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// The `[orchestrator]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrchestratorDef {
    /// Base package for generated orchestrator artifacts.
    pub base_package: String,
    /// Ordered step names making up the pipeline.
    #[serde(default)]
    pub steps: Vec<String>,
    /// Orchestrator transport; defaults to the pipeline-wide transport.
    pub transport: Option<TransportMode>,
    /// Generate a command-line client.
    #[serde(default)]
    pub cli_client: bool,
    /// Generate an ingest client.
    #[serde(default)]
    pub ingest: bool,
}

impl OrchestratorDef {
    /// Lower to an orchestrator declaration.
    pub fn declaration(&self) -> OrchestratorDeclaration {
        OrchestratorDeclaration {
            base_package: self.base_package.clone(),
            steps: self.steps.clone(),
            transport: self.transport,
            cli_client: self.cli_client,
            ingest: self.ingest,
        }
    }
}

/// Root schema for a pipeline definition file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDefinition {
    /// Module identity and modes.
    pub pipeline: PipelineSection,
    /// Declared processing steps.
    #[serde(default)]
    pub steps: Vec<StepDef>,
    /// Declared cross-cutting aspects.
    #[serde(default)]
    pub aspects: Vec<AspectDef>,
    /// Optional orchestrator template.
    pub orchestrator: Option<OrchestratorDef>,
    /// Type symbols for delegate and mapper resolution.
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl PipelineDefinition {
    /// Lower all step definitions to declarations, preserving file order.
    ///
    /// Duplicate step names are preserved here; the compiler deduplicates by
    /// service name with a diagnostic.
    pub fn declarations(&self) -> Vec<StepDeclaration> {
        self.steps.iter().map(StepDef::declaration).collect()
    }

    /// Lower all aspect definitions to aspect models.
    pub fn aspect_models(&self) -> Vec<AspectModel> {
        self.aspects.iter().map(AspectDef::model).collect()
    }

    /// Lower the orchestrator section, if present.
    pub fn orchestrator_declaration(&self) -> Option<OrchestratorDeclaration> {
        self.orchestrator.as_ref().map(OrchestratorDef::declaration)
    }

    /// Build the flat option map: section fields first, then free-form
    /// entries, so an explicit `[pipeline.options]` entry wins.
    pub fn option_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(keys::MODULE_NAME.into(), self.pipeline.module.clone());
        if let Some(transport) = self.pipeline.transport {
            map.insert(keys::TRANSPORT.into(), transport.as_str().into());
        }
        if let Some(platform) = self.pipeline.platform {
            map.insert(keys::PLATFORM.into(), platform.as_str().into());
        }
        if let Some(descriptor_set) = &self.pipeline.descriptor_set {
            map.insert(keys::DESCRIPTOR_SET.into(), descriptor_set.clone());
        }
        for (key, value) in &self.pipeline.options {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    /// Validate the definition after parsing.
    pub fn validate(&self, src: &str, filename: &str) -> Result<()> {
        if let Some(reason) = validate::validate_name(&self.pipeline.module) {
            return Err(Error::invalid_name(
                &self.pipeline.module,
                "module",
                reason,
                src,
                filename,
                validate::find_name_span(src, &self.pipeline.module),
            ));
        }

        for step in &self.steps {
            if let Some(reason) = validate::validate_name(&step.name) {
                return Err(Error::invalid_name(
                    &step.name,
                    "step",
                    reason,
                    src,
                    filename,
                    validate::find_name_span(src, &step.name),
                ));
            }
            validate_step_type_refs(step, src, filename)?;
        }

        for aspect in &self.aspects {
            if let Some(reason) = validate::validate_name(&aspect.name) {
                return Err(Error::invalid_name(
                    &aspect.name,
                    "aspect",
                    reason,
                    src,
                    filename,
                    validate::find_name_span(src, &aspect.name),
                ));
            }
        }

        if let Some(orchestrator) = &self.orchestrator {
            for step_name in &orchestrator.steps {
                if !self.steps.iter().any(|s| &s.name == step_name) {
                    return Err(Error::validation(
                        format!("orchestrator references unknown step '{}'", step_name),
                        src,
                        filename,
                    ));
                }
            }
        }

        for ty in &self.types {
            if !validate::is_valid_type_ref(&ty.name) {
                return Err(Error::invalid_type_ref(
                    &ty.name,
                    "type symbol",
                    src,
                    filename,
                    validate::find_name_span(src, &ty.name),
                ));
            }
        }

        Ok(())
    }
}

fn validate_step_type_refs(step: &StepDef, src: &str, filename: &str) -> Result<()> {
    let refs = [
        (Some(step.target.as_str()), "step target"),
        (step.input.as_deref(), "step input"),
        (step.output.as_deref(), "step output"),
        (step.delegate.as_deref(), "step delegate"),
        (step.mapper.as_deref(), "step mapper"),
        (step.cache_key.as_deref(), "cache key generator"),
    ];
    for (name, context) in refs {
        if let Some(name) = name
            && !validate::is_valid_type_ref(name)
        {
            return Err(Error::invalid_type_ref(
                name,
                context,
                src,
                filename,
                validate::find_name_span(src, name),
            ));
        }
    }
    Ok(())
}

/// Parse a pipeline definition file from the given path
pub fn parse_file(path: impl AsRef<Path>) -> Result<PipelineDefinition> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    let filename = path.display().to_string();
    parse_str_with_filename(&content, &filename)
}

/// Parse a pipeline definition from a string (uses "pipeline.toml" as default filename)
pub fn parse_str(content: &str) -> Result<PipelineDefinition> {
    parse_str_with_filename(content, "pipeline.toml")
}

/// Parse a pipeline definition from a string with a custom filename for error reporting
pub fn parse_str_with_filename(content: &str, filename: &str) -> Result<PipelineDefinition> {
    let definition: PipelineDefinition =
        toml::from_str(content).map_err(|e| Error::parse(e, content, filename))?;

    definition.validate(content, filename)?;
    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [pipeline]
        module = "orders"
        transport = "grpc"

        [pipeline.options]
        parallelismPolicy = "sequential"

        [[steps]]
        name = "enrich"
        target = "com.acme.enrich.EnrichService"
        input = "com.acme.model.Order"
        output = "com.acme.model.EnrichedOrder"

        [[steps]]
        name = "score"
        target = "com.acme.score.ScoreService"
        cardinality = "one-to-many"

        [orchestrator]
        base_package = "com.acme.orch"
        steps = ["enrich", "score"]
        cli_client = true
    "#;

    #[test]
    fn test_parse_sample() {
        let def = parse_str(SAMPLE).expect("sample should parse");
        assert_eq!(def.pipeline.module, "orders");
        assert_eq!(def.steps.len(), 2);
        assert!(def.orchestrator.is_some());
    }

    #[test]
    fn test_option_map_merges_section_and_options() {
        let def = parse_str(SAMPLE).expect("sample should parse");
        let map = def.option_map();
        assert_eq!(map.get(keys::MODULE_NAME).map(String::as_str), Some("orders"));
        assert_eq!(map.get(keys::TRANSPORT).map(String::as_str), Some("grpc"));
        assert_eq!(
            map.get(keys::PARALLELISM_POLICY).map(String::as_str),
            Some("sequential")
        );
    }

    #[test]
    fn test_rejects_invalid_step_name() {
        let result = parse_str(
            r#"
            [pipeline]
            module = "orders"

            [[steps]]
            name = "Enrich"
            target = "com.acme.EnrichService"
        "#,
        );
        assert!(matches!(*result.unwrap_err(), Error::InvalidName { .. }));
    }

    #[test]
    fn test_rejects_unknown_orchestrator_step() {
        let result = parse_str(
            r#"
            [pipeline]
            module = "orders"

            [[steps]]
            name = "enrich"
            target = "com.acme.EnrichService"

            [orchestrator]
            base_package = "com.acme.orch"
            steps = ["missing"]
        "#,
        );
        assert!(matches!(*result.unwrap_err(), Error::Validation { .. }));
    }

    #[test]
    fn test_rejects_invalid_type_ref() {
        let result = parse_str(
            r#"
            [pipeline]
            module = "orders"

            [[steps]]
            name = "enrich"
            target = "com..acme.EnrichService"
        "#,
        );
        assert!(matches!(*result.unwrap_err(), Error::InvalidTypeRef { .. }));
    }

    #[test]
    fn test_duplicate_step_names_survive_parsing() {
        // Dedup is the compiler's job, with a diagnostic; parsing keeps both.
        let def = parse_str(
            r#"
            [pipeline]
            module = "orders"

            [[steps]]
            name = "enrich"
            target = "com.acme.First"

            [[steps]]
            name = "enrich"
            target = "com.acme.Second"
        "#,
        )
        .expect("duplicates should parse");
        assert_eq!(def.declarations().len(), 2);
    }
}
