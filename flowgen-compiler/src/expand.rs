//! Aspect expansion.
//!
//! Aspects that name a plugin implementation expand into additional step
//! variants: one side-effect step per matching original step, deployed in
//! the plugin-server role. Expansion is a collaborator behind a trait so
//! alternative expansion strategies can be registered on the extract phase.

use flowgen_model::{AspectModel, DeploymentRole, StepModel, TypeRef};

use crate::symbols::SymbolTable;

/// Aspect config key naming a cache key generator for expanded variants.
const CACHE_KEY_GENERATOR_KEY: &str = "cacheKeyGenerator";

/// Expands one aspect against the full step model list.
pub trait AspectExpander: Send + Sync {
    /// The name of this expander.
    fn name(&self) -> &'static str;

    /// Produce additional step variants for an aspect. Models that do not
    /// concern this expander yield an empty list.
    fn expand(
        &self,
        aspect: &AspectModel,
        models: &[StepModel],
        symbols: &SymbolTable,
    ) -> Vec<StepModel>;
}

/// Built-in expander for plugin-implementation aspects.
///
/// Each matching original step gets a side-effect variant named
/// `<step>-<aspect>`, typed by the aspect's plugin implementation and
/// deployed in the plugin-server role. The variant observes the same input
/// as the original step; its target set is computed later by target
/// resolution like any other model.
pub struct SideEffectExpander;

impl AspectExpander for SideEffectExpander {
    fn name(&self) -> &'static str {
        "side-effect"
    }

    fn expand(
        &self,
        aspect: &AspectModel,
        models: &[StepModel],
        symbols: &SymbolTable,
    ) -> Vec<StepModel> {
        let Some(implementation) = aspect.plugin_implementation() else {
            return Vec::new();
        };
        let implementation = TypeRef::new(implementation);

        let hint = symbols
            .resolve(implementation.qualified())
            .and_then(|s| s.parallelism_hint());
        let cache_key = aspect
            .config
            .get(CACHE_KEY_GENERATOR_KEY)
            .map(|v| TypeRef::new(v.as_str()));

        models
            .iter()
            .filter(|model| !model.side_effect && aspect.applies_to(&model.service_name))
            .map(|model| {
                let service_name = format!("{}-{}", model.service_name, aspect.name);
                let mut variant = model.clone();
                variant.generated_name = crate::naming::generated_step_name(&service_name);
                variant.service_name = service_name;
                variant.service_package = implementation.package().to_string();
                variant.service_type = implementation.clone();
                variant.role = DeploymentRole::PluginServer;
                variant.side_effect = true;
                variant.cache_key_generator = cache_key.clone();
                variant.delegate = None;
                variant.external_mapper = None;
                variant.requested_targets = Vec::new();
                if let Some(hint) = hint {
                    variant.thread_safety = hint.thread_safety;
                    variant.ordering = hint.ordering;
                }
                variant
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use flowgen_model::{
        AspectScope, MapperFallback, OrderingRequirement, StreamingShape, ThreadSafety,
        TypeMapping,
    };

    use super::*;

    fn base_model(name: &str) -> StepModel {
        StepModel {
            service_name: name.into(),
            generated_name: crate::naming::generated_step_name(name),
            service_package: "com.acme".into(),
            service_type: TypeRef::new("com.acme.EnrichService"),
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
        }
    }

    fn plugin_aspect(name: &str) -> AspectModel {
        let mut aspect = AspectModel::new(name);
        aspect.config.insert(
            flowgen_model::PLUGIN_IMPLEMENTATION_KEY.into(),
            "com.acme.audit.AuditPlugin".into(),
        );
        aspect
    }

    #[test]
    fn test_expands_one_variant_per_step() {
        let models = vec![base_model("enrich"), base_model("score")];
        let variants =
            SideEffectExpander.expand(&plugin_aspect("audit"), &models, &SymbolTable::new());

        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].service_name, "enrich-audit");
        assert_eq!(variants[1].service_name, "score-audit");
        for variant in &variants {
            assert!(variant.side_effect);
            assert_eq!(variant.role, DeploymentRole::PluginServer);
            assert_eq!(
                variant.service_type.qualified(),
                "com.acme.audit.AuditPlugin"
            );
        }
    }

    #[test]
    fn test_scoped_aspect_only_expands_named_steps() {
        let mut aspect = plugin_aspect("audit");
        aspect.scope = AspectScope::Steps(vec!["score".into()]);

        let models = vec![base_model("enrich"), base_model("score")];
        let variants = SideEffectExpander.expand(&aspect, &models, &SymbolTable::new());

        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].service_name, "score-audit");
    }

    #[test]
    fn test_aspect_without_plugin_implementation_expands_nothing() {
        let models = vec![base_model("enrich")];
        let variants =
            SideEffectExpander.expand(&AspectModel::new("audit"), &models, &SymbolTable::new());
        assert!(variants.is_empty());
    }

    #[test]
    fn test_side_effect_variants_are_not_re_expanded() {
        let mut observed = base_model("enrich-audit");
        observed.side_effect = true;

        let variants = SideEffectExpander.expand(
            &plugin_aspect("metrics"),
            &[observed],
            &SymbolTable::new(),
        );
        assert!(variants.is_empty());
    }
}
