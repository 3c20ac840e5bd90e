//! Generation dispatch phase.

use std::sync::Arc;

use eyre::Result;
use flowgen_model::{
    Binding, BindingKind, DeploymentRole, GenerationTarget, StepModel, TransportMode,
};

use crate::{
    metadata, output,
    pipeline::{CompilationContext, Phase},
    render::{ArtifactRenderer, RenderedArtifact},
    session::DispatchSession,
};

/// Phase that walks every (model, target) pair and renders artifacts.
///
/// Dispatch owns placement: it remaps client-side targets to the consuming
/// deployment role, claims the side-effect bean once per service, and writes
/// each artifact under its role directory. Rendering itself stays behind the
/// [`ArtifactRenderer`] seam. Everything here degrades to warnings; by this
/// point the pass has nothing left that is worth aborting over.
pub struct DispatchPhase {
    renderer: Arc<dyn ArtifactRenderer>,
}

impl DispatchPhase {
    pub fn new(renderer: Arc<dyn ArtifactRenderer>) -> Self {
        Self { renderer }
    }
}

impl Phase for DispatchPhase {
    fn name(&self) -> &'static str {
        "dispatch"
    }

    fn description(&self) -> &'static str {
        "Render artifacts and deployment metadata"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let mut session = DispatchSession::new();

        let models = ctx.models.clone();
        for model in &models {
            self.dispatch_step(ctx, model, &mut session);
        }
        if ctx.generate_orchestrator {
            self.dispatch_orchestrators(ctx, &mut session);
        }

        metadata::write_all(ctx, &session);
        ctx.add_note(
            self.name(),
            format!("rendered {} artifacts", session.rendered_count()),
        );
        Ok(())
    }
}

impl DispatchPhase {
    fn dispatch_step(
        &self,
        ctx: &mut CompilationContext,
        model: &StepModel,
        session: &mut DispatchSession,
    ) {
        for target in model.enabled_targets.clone() {
            let role = if target.is_client_side() {
                model.role.client_counterpart()
            } else {
                model.role
            };

            // Plugin-server artifacts only materialize on a plugin host
            if role == DeploymentRole::PluginServer
                && !ctx.plugin_host
                && ctx.runtime_layout.is_none()
            {
                continue;
            }

            // Server-side targets of a side-effect variant render the wrapper
            // bean instead of a transport surface, once per service even when
            // several transport branches reach it
            if model.side_effect && target.is_server_side() {
                if session.claim_bean(&model.service_package, &model.service_name) {
                    let artifact = self.renderer.side_effect_bean(model);
                    self.write(ctx, session, role, artifact);
                }
                continue;
            }

            // Under local transport the service target only exists to drive
            // the bean above; no transport surface is rendered
            if target == GenerationTarget::GrpcService && ctx.transport == TransportMode::Local {
                continue;
            }

            let Some(artifact) = self.render_target(ctx, model, target) else {
                continue;
            };
            self.write(ctx, session, role, artifact);
        }
    }

    /// Render one target from its binding; a missing binding skips the
    /// target with a warning.
    fn render_target(
        &self,
        ctx: &mut CompilationContext,
        model: &StepModel,
        target: GenerationTarget,
    ) -> Option<RenderedArtifact> {
        // A delegated step's only binding is its adapter; client stubs
        // render from it too
        let kind = if model.is_delegated() {
            BindingKind::ExternalAdapter
        } else {
            match target {
                GenerationTarget::GrpcService | GenerationTarget::ClientStep => BindingKind::Grpc,
                GenerationTarget::RestResource | GenerationTarget::RestClientStep => {
                    BindingKind::Rest
                }
                GenerationTarget::LocalClientStep => BindingKind::Local,
                GenerationTarget::ExternalAdapter => BindingKind::ExternalAdapter,
            }
        };

        let binding = ctx.binding(&model.service_name, kind).cloned();
        let artifact = match (target, binding) {
            (
                GenerationTarget::ClientStep
                | GenerationTarget::RestClientStep
                | GenerationTarget::LocalClientStep,
                Some(Binding::ExternalAdapter(binding)),
            ) => self.renderer.delegated_client_step(&binding),
            (GenerationTarget::GrpcService, Some(Binding::Grpc(binding))) => {
                self.renderer.grpc_service(&binding)
            }
            (GenerationTarget::ClientStep, Some(Binding::Grpc(binding))) => {
                self.renderer.client_step(&binding)
            }
            (GenerationTarget::RestResource, Some(Binding::Rest(binding))) => {
                self.renderer.rest_resource(&binding)
            }
            (GenerationTarget::RestClientStep, Some(Binding::Rest(binding))) => {
                self.renderer.rest_client_step(&binding)
            }
            (GenerationTarget::LocalClientStep, Some(Binding::Local(binding))) => {
                self.renderer.local_client_step(&binding)
            }
            (GenerationTarget::ExternalAdapter, Some(Binding::ExternalAdapter(binding))) => {
                self.renderer.external_adapter(&binding)
            }
            _ => {
                ctx.add_warning(
                    self.name(),
                    format!(
                        "no binding for target {} of step '{}'; target skipped",
                        target, model.service_name
                    ),
                );
                return None;
            }
        };
        Some(artifact)
    }

    fn dispatch_orchestrators(&self, ctx: &mut CompilationContext, session: &mut DispatchSession) {
        let orchestrators = ctx.orchestrators.clone();
        for orchestrator in &orchestrators {
            let binding = ctx
                .binding(&orchestrator.service_name, BindingKind::Orchestrator)
                .cloned();
            let Some(Binding::Orchestrator(binding)) = binding else {
                ctx.add_warning(
                    self.name(),
                    format!(
                        "no binding for orchestrator '{}'; generation skipped",
                        orchestrator.service_name
                    ),
                );
                continue;
            };

            let server = self.renderer.orchestrator_server(&binding);
            self.write(ctx, session, DeploymentRole::PipelineServer, server);

            if binding.model.cli_client {
                let cli = self.renderer.orchestrator_cli_client(&binding);
                self.write(ctx, session, DeploymentRole::OrchestratorClient, cli);
            }
            if binding.model.ingest {
                let ingest = self.renderer.orchestrator_ingest_client(&binding);
                self.write(ctx, session, DeploymentRole::OrchestratorClient, ingest);
            }
        }
    }

    fn write(
        &self,
        ctx: &mut CompilationContext,
        session: &mut DispatchSession,
        role: DeploymentRole,
        artifact: RenderedArtifact,
    ) {
        match output::write_artifact(&ctx.output_root, role.dir_name(), &artifact) {
            Ok(_) => session.record(role, artifact.qualified_name),
            Err(err) => ctx.add_warning(
                self.name(),
                format!("failed to write '{}': {:#}", artifact.file_name, err),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use flowgen_definition::keys;
    use flowgen_model::{AspectModel, PLUGIN_IMPLEMENTATION_KEY, StepDeclaration};

    use super::*;
    use crate::{
        input::CompilationInput,
        pipeline::Pipeline,
    };

    fn internal_step(name: &str) -> StepDeclaration {
        let mut declaration = StepDeclaration::internal(name, "com.acme.EnrichService");
        declaration.input = Some("com.acme.Order".into());
        declaration.output = Some("com.acme.EnrichedOrder".into());
        declaration
    }

    fn local_input(output_root: &Path) -> CompilationInput {
        let mut input = CompilationInput::default()
            .with_option(keys::MODULE_NAME, "orders")
            .with_option(keys::TRANSPORT, "local")
            .with_option(keys::OUTPUT_ROOT, output_root.display().to_string());
        input.declarations.push(internal_step("enrich"));
        input
    }

    #[test]
    fn test_local_transport_renders_no_service_surface() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = Pipeline::new()
            .run(local_input(dir.path()))
            .expect("pipeline should succeed");

        assert!(!ctx.has_errors());
        // The service target is retained but produces no artifact under the
        // local transport
        assert!(!dir.path().join("pipeline-server").exists());
        assert!(dir.path().join("role-map.json").exists());
    }

    #[test]
    fn test_side_effect_bean_requires_plugin_host() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut aspect = AspectModel::new("audit");
        aspect.config.insert(
            PLUGIN_IMPLEMENTATION_KEY.into(),
            "com.acme.audit.AuditPlugin".into(),
        );

        let mut input = local_input(dir.path());
        input.aspects.push(aspect.clone());
        let ctx = Pipeline::new().run(input).expect("pipeline should succeed");
        assert!(!ctx.has_errors());
        assert!(!dir.path().join("plugin-server").exists());

        // Same input on a plugin host renders the bean
        let host_dir = tempfile::tempdir().expect("tempdir");
        let mut input = local_input(host_dir.path()).with_option(keys::PLUGIN_HOST, "true");
        input.aspects.push(aspect);
        let ctx = Pipeline::new().run(input).expect("pipeline should succeed");
        assert!(!ctx.has_errors());

        let bean = host_dir
            .path()
            .join("plugin-server")
            .join("EnrichAuditSideEffectBean.java");
        assert!(bean.exists());
    }

    #[test]
    fn test_repeated_runs_are_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = local_input(dir.path()).with_option(keys::GENERATE_ORCHESTRATOR, "true");

        Pipeline::new()
            .run(input.clone())
            .expect("first run should succeed");
        let first = std::fs::read_to_string(dir.path().join("role-map.json")).expect("read back");

        Pipeline::new().run(input).expect("second run should succeed");
        let second = std::fs::read_to_string(dir.path().join("role-map.json")).expect("read back");
        assert_eq!(first, second);
    }
}
