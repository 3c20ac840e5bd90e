//! Step declarations and the step IR.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{DeploymentRole, GenerationTarget, StreamingShape, TypeRef};

/// Declared cardinality of a step, before lowering to a streaming shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    /// Lower the declared cardinality to its call shape.
    pub fn streaming_shape(&self) -> StreamingShape {
        match self {
            Cardinality::OneToOne => StreamingShape::UnaryUnary,
            Cardinality::OneToMany => StreamingShape::UnaryStreaming,
            Cardinality::ManyToOne => StreamingShape::StreamingUnary,
            Cardinality::ManyToMany => StreamingShape::StreamingStreaming,
        }
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::OneToOne
    }
}

/// Mapper fallback behavior requested by a step declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapperFallback {
    /// No fallback; a mapper must be resolvable when types differ.
    #[default]
    None,
    /// Fall back to serialization-based conversion when no mapper resolves.
    /// Only honored when the global fallback option is enabled.
    Serialize,
}

/// Raw, source-agnostic description of one pipeline step.
///
/// Declarations are produced once by the declaration source (the external
/// definition list) and treated as read-only input by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDeclaration {
    /// Step name; becomes the unique service name.
    pub name: String,
    /// The type implementing (or, for delegated steps, fronting) the step.
    pub execution_target: TypeRef,
    /// Declared input type, inferred from the delegate when absent.
    pub input: Option<TypeRef>,
    /// Declared output type, inferred from the delegate when absent.
    pub output: Option<TypeRef>,
    /// Declared cardinality.
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Pre-existing service this step forwards to, if any.
    pub delegate: Option<TypeRef>,
    /// Explicitly named external mapper type.
    pub mapper: Option<TypeRef>,
    /// Fallback behavior when no mapper resolves.
    #[serde(default)]
    pub mapper_fallback: MapperFallback,
    /// Cache key generator type, carried through to the generated artifact.
    pub cache_key_generator: Option<TypeRef>,
    /// Server-side targets explicitly requested by the declaration.
    ///
    /// Normally empty; target resolution computes the set. Delegated steps
    /// that still request server-side targets get a warning, since those
    /// targets are ignored.
    #[serde(default)]
    pub requested_targets: Vec<GenerationTarget>,
}

impl StepDeclaration {
    /// Create a minimal declaration for an internal (non-delegated) step.
    pub fn internal(name: impl Into<String>, execution_target: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            execution_target: execution_target.into(),
            input: None,
            output: None,
            cardinality: Cardinality::OneToOne,
            delegate: None,
            mapper: None,
            mapper_fallback: MapperFallback::None,
            cache_key_generator: None,
            requested_targets: Vec::new(),
        }
    }

    /// Returns true if this step forwards to a pre-existing service.
    pub fn is_delegated(&self) -> bool {
        self.delegate.is_some()
    }
}

/// Type mapping on one side (input or output) of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMapping {
    /// The declared domain type flowing through the pipeline.
    pub domain_type: TypeRef,
    /// Resolved mapper type, when mapping is required and resolvable.
    pub mapper_type: Option<TypeRef>,
    /// Whether the domain type differs from the native type.
    pub requires_mapping: bool,
    /// The delegate's native type on this side, when the step is delegated.
    pub native_type: Option<TypeRef>,
}

impl TypeMapping {
    /// Mapping for a type that is used as-is.
    pub fn direct(domain_type: impl Into<TypeRef>) -> Self {
        Self {
            domain_type: domain_type.into(),
            mapper_type: None,
            requires_mapping: false,
            native_type: None,
        }
    }

    /// Mapping between a declared domain type and a differing native type.
    pub fn mapped(
        domain_type: impl Into<TypeRef>,
        native_type: impl Into<TypeRef>,
        mapper_type: Option<TypeRef>,
    ) -> Self {
        Self {
            domain_type: domain_type.into(),
            mapper_type,
            requires_mapping: true,
            native_type: Some(native_type.into()),
        }
    }
}

/// Ordering requirement declared by a step or plugin implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingRequirement {
    #[default]
    Unspecified,
    /// The implementation must observe pipeline items in order.
    Strict,
}

/// Thread-safety declared by a step or plugin implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreadSafety {
    #[default]
    Unspecified,
    Safe,
    Unsafe,
}

/// Validated semantic IR for one pipeline step.
///
/// Created once during model extraction, possibly cloned and role-tagged
/// during aspect expansion, then read-only through semantic analysis, target
/// resolution (which replaces the target set) and binding construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepModel {
    /// Unique service name; the dedup key across the final model list.
    pub service_name: String,
    /// Name of the generated artifact class.
    pub generated_name: String,
    /// Package the generated artifact lives in.
    pub service_package: String,
    /// The implementing (or fronting) type.
    pub service_type: TypeRef,
    /// Input-side type mapping.
    pub input: TypeMapping,
    /// Output-side type mapping.
    pub output: TypeMapping,
    /// Resolved call shape.
    pub streaming: StreamingShape,
    /// Targets to render; replaced wholesale by target resolution.
    pub enabled_targets: BTreeSet<GenerationTarget>,
    /// Deployment role of the step's server-side artifacts.
    pub role: DeploymentRole,
    /// Whether this model is a side-effect (observer) variant.
    pub side_effect: bool,
    /// Cache key generator type, if any.
    pub cache_key_generator: Option<TypeRef>,
    /// Ordering requirement of the implementation.
    pub ordering: OrderingRequirement,
    /// Thread-safety of the implementation.
    pub thread_safety: ThreadSafety,
    /// Delegate service, for delegated steps.
    pub delegate: Option<TypeRef>,
    /// Resolved external mapper, for delegated steps with differing types.
    pub external_mapper: Option<TypeRef>,
    /// Effective fallback mode.
    pub mapper_fallback: MapperFallback,
    /// Server-side targets the declaration explicitly requested.
    pub requested_targets: Vec<GenerationTarget>,
}

impl StepModel {
    /// Returns true if this step forwards to a pre-existing service.
    pub fn is_delegated(&self) -> bool {
        self.delegate.is_some()
    }

    /// Fully-qualified name of the generated artifact.
    pub fn qualified_generated_name(&self) -> String {
        if self.service_package.is_empty() {
            self.generated_name.clone()
        } else {
            format!("{}.{}", self.service_package, self.generated_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_to_streaming_shape() {
        assert_eq!(
            Cardinality::OneToOne.streaming_shape(),
            StreamingShape::UnaryUnary
        );
        assert_eq!(
            Cardinality::OneToMany.streaming_shape(),
            StreamingShape::UnaryStreaming
        );
        assert_eq!(
            Cardinality::ManyToOne.streaming_shape(),
            StreamingShape::StreamingUnary
        );
        assert_eq!(
            Cardinality::ManyToMany.streaming_shape(),
            StreamingShape::StreamingStreaming
        );
    }

    #[test]
    fn test_declaration_is_delegated() {
        let mut decl = StepDeclaration::internal("enrich", "com.acme.EnrichService");
        assert!(!decl.is_delegated());

        decl.delegate = Some(TypeRef::new("com.acme.legacy.Enricher"));
        assert!(decl.is_delegated());
    }

    #[test]
    fn test_qualified_generated_name() {
        let model = StepModel {
            service_name: "enrich".into(),
            generated_name: "EnrichStep".into(),
            service_package: "com.acme.enrich".into(),
            service_type: TypeRef::new("com.acme.enrich.EnrichService"),
            input: TypeMapping::direct("com.acme.Order"),
            output: TypeMapping::direct("com.acme.Order"),
            streaming: StreamingShape::UnaryUnary,
            enabled_targets: BTreeSet::new(),
            role: DeploymentRole::PipelineServer,
            side_effect: false,
            cache_key_generator: None,
            ordering: OrderingRequirement::Unspecified,
            thread_safety: ThreadSafety::Unspecified,
            delegate: None,
            external_mapper: None,
            mapper_fallback: MapperFallback::None,
            requested_targets: Vec::new(),
        };
        assert_eq!(
            model.qualified_generated_name(),
            "com.acme.enrich.EnrichStep"
        );
    }
}
