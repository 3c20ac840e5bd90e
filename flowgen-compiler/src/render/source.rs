//! Built-in deterministic source renderer.
//!
//! Emits small Java-style source stubs. Every artifact starts from the same
//! class skeleton; the interesting part is which binding data lands in the
//! class body, since that is what integration tests and downstream tooling
//! key on.

use flowgen_model::{
    ExternalAdapterBinding, GrpcBinding, LocalBinding, OrchestratorBinding, RestBinding, StepModel,
};

use super::{ArtifactRenderer, RenderedArtifact};
use crate::naming::to_pascal_case;

const HEADER: &str = "// Generated by flowgen. Do not edit.";

/// The default renderer used when no custom renderer is installed.
#[derive(Debug, Default)]
pub struct SourceRenderer;

impl SourceRenderer {
    pub fn new() -> Self {
        Self
    }

    fn artifact(
        &self,
        package: &str,
        class_name: &str,
        comment: &str,
        body: &[String],
    ) -> RenderedArtifact {
        let mut lines = vec![HEADER.to_string()];
        if !package.is_empty() {
            lines.push(format!("package {};", package));
        }
        lines.push(String::new());
        lines.push(format!("/** {} */", comment));
        lines.push(format!("public final class {} {{", class_name));
        for line in body {
            lines.push(format!("    {}", line));
        }
        lines.push("}".to_string());
        lines.push(String::new());

        let qualified_name = if package.is_empty() {
            class_name.to_string()
        } else {
            format!("{}.{}", package, class_name)
        };
        RenderedArtifact {
            qualified_name,
            file_name: format!("{}.java", class_name),
            content: lines.join("\n"),
        }
    }

    fn step_class_name(model: &StepModel, suffix: &str) -> String {
        format!("{}{}", to_pascal_case(&model.service_name), suffix)
    }
}

impl ArtifactRenderer for SourceRenderer {
    fn grpc_service(&self, binding: &GrpcBinding) -> RenderedArtifact {
        let model = &binding.model;
        self.artifact(
            &model.service_package,
            &Self::step_class_name(model, "GrpcAdapter"),
            "gRPC service adapter",
            &[
                format!("// service: {}", binding.service.qualified_name()),
                format!("// method: {}", binding.method.name),
                format!("// shape: {}", model.streaming),
                format!("// in: {}", binding.method.input_type),
                format!("// out: {}", binding.method.output_type),
            ],
        )
    }

    fn client_step(&self, binding: &GrpcBinding) -> RenderedArtifact {
        let model = &binding.model;
        self.artifact(
            &model.service_package,
            &Self::step_class_name(model, "Client"),
            "gRPC client stub",
            &[
                format!("// service: {}", binding.service.qualified_name()),
                format!("// method: {}", binding.method.name),
                format!("// shape: {}", model.streaming),
            ],
        )
    }

    fn rest_resource(&self, binding: &RestBinding) -> RenderedArtifact {
        let model = &binding.model;
        self.artifact(
            &model.service_package,
            &Self::step_class_name(model, "Resource"),
            "REST resource",
            &[
                format!("// path: {}", binding.path()),
                format!("// in: {}", model.input.domain_type),
                format!("// out: {}", model.output.domain_type),
            ],
        )
    }

    fn rest_client_step(&self, binding: &RestBinding) -> RenderedArtifact {
        let model = &binding.model;
        self.artifact(
            &model.service_package,
            &Self::step_class_name(model, "RestClient"),
            "REST client stub",
            &[format!("// path: {}", binding.path())],
        )
    }

    fn local_client_step(&self, binding: &LocalBinding) -> RenderedArtifact {
        let model = &binding.model;
        self.artifact(
            &model.service_package,
            &Self::step_class_name(model, "LocalClient"),
            "in-process client wrapper",
            &[format!("// target: {}", model.service_type)],
        )
    }

    fn external_adapter(&self, binding: &ExternalAdapterBinding) -> RenderedArtifact {
        let mut body = vec![format!("// delegate: {}", binding.delegate_service)];
        match &binding.external_mapper {
            Some(mapper) => body.push(format!("// mapper: {}", mapper)),
            None => body.push("// mapper: none".to_string()),
        }
        self.artifact(
            &binding.service_package,
            &Self::step_class_name(&binding.model, "ExternalAdapter"),
            "external delegate adapter",
            &body,
        )
    }

    fn delegated_client_step(&self, binding: &ExternalAdapterBinding) -> RenderedArtifact {
        let model = &binding.model;
        self.artifact(
            &binding.service_package,
            &Self::step_class_name(model, "Client"),
            "delegated client stub",
            &[
                format!(
                    "// adapter: {}",
                    Self::step_class_name(model, "ExternalAdapter")
                ),
                format!("// shape: {}", model.streaming),
            ],
        )
    }

    fn side_effect_bean(&self, model: &StepModel) -> RenderedArtifact {
        let mut body = vec![format!("// wraps: {}", model.service_type)];
        if let Some(cache_key) = &model.cache_key_generator {
            body.push(format!("// cacheKey: {}", cache_key));
        }
        self.artifact(
            &model.service_package,
            &Self::step_class_name(model, "SideEffectBean"),
            "side-effect wrapper bean",
            &body,
        )
    }

    fn orchestrator_server(&self, binding: &OrchestratorBinding) -> RenderedArtifact {
        let model = &binding.model;
        let mut body = vec![
            format!("// transport: {}", model.transport),
            format!("// order: {}", model.step_order.join(" -> ")),
        ];
        if let Some(input) = &model.input_type {
            body.push(format!("// in: {}", input));
        }
        if let Some(output) = &model.output_type {
            body.push(format!("// out: {}", output));
        }
        self.artifact(
            &model.base_package,
            &to_pascal_case(&model.service_name),
            "pipeline orchestrator",
            &body,
        )
    }

    fn orchestrator_cli_client(&self, binding: &OrchestratorBinding) -> RenderedArtifact {
        let model = &binding.model;
        self.artifact(
            &model.base_package,
            &format!("{}Cli", to_pascal_case(&model.service_name)),
            "orchestrator command-line client",
            &[format!("// transport: {}", model.transport)],
        )
    }

    fn orchestrator_ingest_client(&self, binding: &OrchestratorBinding) -> RenderedArtifact {
        let model = &binding.model;
        let mut body = vec![format!("// transport: {}", model.transport)];
        if let Some(input) = &model.input_type {
            body.push(format!("// in: {}", input));
        }
        self.artifact(
            &model.base_package,
            &format!("{}IngestClient", to_pascal_case(&model.service_name)),
            "orchestrator ingest client",
            &body,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use flowgen_model::{
        DeploymentRole, MapperFallback, OrderingRequirement, StreamingShape, ThreadSafety,
        TypeMapping, TypeRef,
    };

    use super::*;

    fn model() -> StepModel {
        StepModel {
            service_name: "enrich-orders".into(),
            generated_name: "EnrichOrdersStep".into(),
            service_package: "com.acme.enrich".into(),
            service_type: TypeRef::new("com.acme.enrich.EnrichService"),
            input: TypeMapping::direct("com.acme.Order"),
            output: TypeMapping::direct("com.acme.EnrichedOrder"),
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

    #[test]
    fn test_side_effect_bean_naming() {
        let artifact = SourceRenderer::new().side_effect_bean(&model());
        assert_eq!(
            artifact.qualified_name,
            "com.acme.enrich.EnrichOrdersSideEffectBean"
        );
        assert_eq!(artifact.file_name, "EnrichOrdersSideEffectBean.java");
        assert!(artifact.content.starts_with(HEADER));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = SourceRenderer::new();
        let model = model();
        assert_eq!(
            renderer.side_effect_bean(&model),
            renderer.side_effect_bean(&model)
        );
    }
}
