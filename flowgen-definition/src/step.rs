//! Step and aspect definition tables.

use std::collections::BTreeMap;

use flowgen_model::{
    AspectModel, AspectScope, Cardinality, GenerationTarget, MapperFallback, StepDeclaration,
    TypeRef,
};
use serde::Deserialize;

/// One `[[steps]]` entry in the pipeline definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDef {
    /// Step name; becomes the service name.
    pub name: String,
    /// Type implementing (or fronting) the step.
    pub target: String,
    /// Declared input type; inferred from the delegate when absent.
    pub input: Option<String>,
    /// Declared output type; inferred from the delegate when absent.
    pub output: Option<String>,
    /// Declared cardinality.
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Pre-existing service this step forwards to.
    pub delegate: Option<String>,
    /// Explicitly named external mapper type.
    pub mapper: Option<String>,
    /// Fallback behavior when no mapper resolves.
    #[serde(default)]
    pub mapper_fallback: MapperFallback,
    /// Cache key generator type.
    pub cache_key: Option<String>,
    /// Explicitly requested generation targets.
    #[serde(default)]
    pub targets: Vec<GenerationTarget>,
}

impl StepDef {
    /// Lower this definition entry to a step declaration.
    pub fn declaration(&self) -> StepDeclaration {
        StepDeclaration {
            name: self.name.clone(),
            execution_target: TypeRef::new(&self.target),
            input: self.input.as_deref().map(TypeRef::new),
            output: self.output.as_deref().map(TypeRef::new),
            cardinality: self.cardinality,
            delegate: self.delegate.as_deref().map(TypeRef::new),
            mapper: self.mapper.as_deref().map(TypeRef::new),
            mapper_fallback: self.mapper_fallback,
            cache_key_generator: self.cache_key.as_deref().map(TypeRef::new),
            requested_targets: self.targets.clone(),
        }
    }
}

/// One `[[aspects]]` entry in the pipeline definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AspectDef {
    /// Aspect name.
    pub name: String,
    /// Step names the aspect applies to; global when absent.
    pub steps: Option<Vec<String>>,
    /// Opaque configuration entries.
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl AspectDef {
    /// Lower this definition entry to an aspect model.
    pub fn model(&self) -> AspectModel {
        AspectModel {
            name: self.name.clone(),
            scope: match &self.steps {
                Some(steps) => AspectScope::Steps(steps.clone()),
                None => AspectScope::Global,
            },
            config: self.config.clone(),
        }
    }
}
