//! Compilation input assembly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use flowgen_definition::{PipelineDefinition, keys};
use flowgen_model::{AspectModel, OrchestratorDeclaration, StepDeclaration};

use crate::symbols::SymbolTable;

/// Everything one compilation pass consumes.
///
/// The input is assembled once by the driver and treated as read-only by all
/// phases. Successive compilation rounds build a fresh input each time; no
/// state survives a pass other than artifacts already on disk.
#[derive(Debug, Clone, Default)]
pub struct CompilationInput {
    /// Step declarations, in declaration-source order.
    pub declarations: Vec<StepDeclaration>,
    /// Declared cross-cutting aspects.
    pub aspects: Vec<AspectModel>,
    /// Orchestrator declarations.
    pub orchestrators: Vec<OrchestratorDeclaration>,
    /// The flat configuration option map.
    pub options: BTreeMap<String, String>,
    /// Symbol table for delegate and mapper resolution.
    pub symbols: SymbolTable,
}

impl CompilationInput {
    /// Assemble an input from a parsed pipeline definition.
    ///
    /// `base_dir` anchors relative resource paths (the descriptor set) to the
    /// definition file's directory.
    pub fn from_definition(definition: &PipelineDefinition, base_dir: &Path) -> Self {
        let mut options = definition.option_map();
        if let Some(descriptor_set) = options.get(keys::DESCRIPTOR_SET).map(PathBuf::from)
            && descriptor_set.is_relative()
        {
            options.insert(
                keys::DESCRIPTOR_SET.into(),
                base_dir.join(descriptor_set).display().to_string(),
            );
        }

        Self {
            declarations: definition.declarations(),
            aspects: definition.aspect_models(),
            orchestrators: definition
                .orchestrator_declaration()
                .into_iter()
                .collect(),
            options,
            symbols: SymbolTable::from_defs(&definition.types),
        }
    }

    /// Set or replace a single option entry.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_definition_anchors_descriptor_path() {
        let definition = flowgen_definition::parse_str(
            r#"
            [pipeline]
            module = "orders"
            descriptor_set = "descriptors.json"

            [[steps]]
            name = "enrich"
            target = "com.acme.EnrichService"
        "#,
        )
        .expect("definition should parse");

        let input = CompilationInput::from_definition(&definition, Path::new("/work/pipelines"));
        assert_eq!(
            input.options.get(keys::DESCRIPTOR_SET).map(String::as_str),
            Some("/work/pipelines/descriptors.json")
        );
        assert_eq!(input.declarations.len(), 1);
    }

    #[test]
    fn test_with_option_overrides() {
        let input = CompilationInput::default()
            .with_option(keys::TRANSPORT, "rest")
            .with_option(keys::TRANSPORT, "local");
        assert_eq!(
            input.options.get(keys::TRANSPORT).map(String::as_str),
            Some("local")
        );
    }
}
