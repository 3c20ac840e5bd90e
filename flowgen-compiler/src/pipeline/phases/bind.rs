//! Binding construction phase.

use eyre::{Result, bail};
use flowgen_model::{
    Binding, DescriptorSet, ExternalAdapterBinding, GenerationTarget, GrpcBinding, LocalBinding,
    OrchestratorBinding, OrchestratorDeclaration, OrchestratorModel, RestBinding, StepModel,
    TransportMode,
};

use crate::{
    naming,
    pipeline::{CompilationContext, Phase},
};

/// Phase that turns resolved targets into renderer-facing bindings.
///
/// The protocol descriptor set is loaded lazily, at most once per pass, and
/// only when some binding actually resolves against it. Per-step binding
/// failures degrade to warnings; the single fatal condition is a duplicate
/// binding key, which indicates the dedup invariant upstream was violated.
pub struct BindPhase;

impl Phase for BindPhase {
    fn name(&self) -> &'static str {
        "bind"
    }

    fn description(&self) -> &'static str {
        "Construct renderer bindings"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        if self.needs_descriptors(ctx) {
            let descriptors = self.load_descriptors(ctx);
            ctx.descriptors = Some(descriptors);
        }

        let mut bindings = Vec::new();
        let models = ctx.models.clone();
        for model in &models {
            self.bind_step(ctx, model, &mut bindings);
        }
        if ctx.generate_orchestrator {
            self.bind_orchestrators(ctx, &mut bindings);
        }

        for binding in bindings {
            let key = binding.key();
            if ctx.bindings.contains_key(&key) {
                ctx.add_error(self.name(), format!("duplicate binding key '{}'", key));
                bail!("duplicate binding key '{}'", key);
            }
            ctx.bindings.insert(key, binding);
        }
        Ok(())
    }
}

impl BindPhase {
    /// Whether any binding in this pass resolves against the descriptor set.
    /// Delegated steps bind through their adapter and never resolve here; an
    /// orchestrator counts when its effective transport is grpc.
    fn needs_descriptors(&self, ctx: &CompilationContext) -> bool {
        let step_needs = ctx.transport == TransportMode::Grpc
            && ctx.models.iter().any(|m| {
                !m.side_effect
                    && !m.is_delegated()
                    && m.enabled_targets.iter().any(|t| t.needs_descriptors())
            });
        let orchestrator_needs = ctx.generate_orchestrator
            && if ctx.input.orchestrators.is_empty() {
                ctx.transport == TransportMode::Grpc
            } else {
                ctx.input
                    .orchestrators
                    .iter()
                    .any(|d| d.transport.unwrap_or(ctx.transport) == TransportMode::Grpc)
            };
        step_needs || orchestrator_needs
    }

    fn load_descriptors(&self, ctx: &mut CompilationContext) -> DescriptorSet {
        let Some(path) = ctx.options.descriptor_set() else {
            ctx.add_warning(
                self.name(),
                "grpc bindings requested but no descriptor set is configured",
            );
            return DescriptorSet::empty();
        };
        match crate::descriptor::load(&path) {
            Ok(set) => set,
            Err(err) => {
                ctx.add_warning(
                    self.name(),
                    format!("failed to load descriptor set {}: {:#}", path.display(), err),
                );
                DescriptorSet::empty()
            }
        }
    }

    fn bind_step(&self, ctx: &mut CompilationContext, model: &StepModel, out: &mut Vec<Binding>) {
        // Delegated steps bypass transport binding construction entirely;
        // the adapter binding carries everything their artifacts need,
        // client stubs included.
        if model.is_delegated() {
            if model
                .requested_targets
                .iter()
                .any(|t| t.is_server_side())
            {
                ctx.add_warning(
                    self.name(),
                    format!(
                        "step '{}' delegates to an external service; requested server-side targets are ignored",
                        model.service_name
                    ),
                );
            }
            let delegate = model
                .delegate
                .clone()
                .expect("delegated step implies a delegate");
            out.push(Binding::ExternalAdapter(ExternalAdapterBinding {
                model: model.clone(),
                service_name: model.service_name.clone(),
                service_package: model.service_package.clone(),
                delegate_service: delegate,
                external_mapper: model.external_mapper.clone(),
            }));
            return;
        }

        for target in model.enabled_targets.clone() {
            // Side-effect variants render a wrapper bean from the model
            // alone; their server-side target binds to nothing
            if model.side_effect && target.is_server_side() {
                continue;
            }
            match target {
                // Only delegated steps carry this target; handled above
                GenerationTarget::ExternalAdapter => {}
                GenerationTarget::GrpcService | GenerationTarget::ClientStep => {
                    // Under local transport the service target exists only to
                    // drive the side-effect bean and binds to nothing.
                    if ctx.transport == TransportMode::Grpc
                        && let Some(binding) = self.bind_grpc(ctx, model)
                    {
                        out.push(binding);
                    }
                }
                GenerationTarget::RestResource | GenerationTarget::RestClientStep => {
                    let path_override = ctx
                        .options
                        .rest_path_override(&model.service_name, model.service_type.qualified())
                        .map(str::to_string);
                    out.push(Binding::Rest(RestBinding {
                        model: model.clone(),
                        path_override,
                    }));
                }
                GenerationTarget::LocalClientStep => {
                    out.push(Binding::Local(LocalBinding {
                        model: model.clone(),
                    }));
                }
            }
        }
    }

    /// Resolve a step against the descriptor set, matching the method by
    /// streaming shape.
    fn bind_grpc(&self, ctx: &mut CompilationContext, model: &StepModel) -> Option<Binding> {
        let service = ctx
            .descriptors
            .as_ref()
            .and_then(|d| d.find_service(&model.service_name))
            .cloned();
        let Some(service) = service else {
            ctx.add_warning(
                self.name(),
                format!(
                    "no descriptor service matches step '{}'; grpc generation skipped",
                    model.service_name
                ),
            );
            return None;
        };

        let method = service
            .methods
            .iter()
            .find(|m| {
                m.client_streaming == model.streaming.client_streaming()
                    && m.server_streaming == model.streaming.server_streaming()
            })
            .cloned();
        let Some(method) = method else {
            ctx.add_warning(
                self.name(),
                format!(
                    "descriptor service '{}' has no method with shape {}; grpc generation skipped",
                    service.name, model.streaming
                ),
            );
            return None;
        };

        Some(Binding::Grpc(GrpcBinding {
            model: model.clone(),
            service,
            method,
        }))
    }

    fn bind_orchestrators(&self, ctx: &mut CompilationContext, out: &mut Vec<Binding>) {
        let declarations = if ctx.input.orchestrators.is_empty() {
            vec![self.synthesize_declaration(ctx)]
        } else {
            ctx.input.orchestrators.clone()
        };

        for declaration in declarations {
            let model = self.orchestrator_model(ctx, &declaration);
            ctx.orchestrators.push(model.clone());
            out.push(Binding::Orchestrator(OrchestratorBinding { model }));
        }
    }

    /// Opt-in without a declaration: orchestrate every non-side-effect step
    /// in model order.
    fn synthesize_declaration(&self, ctx: &CompilationContext) -> OrchestratorDeclaration {
        let base_package = ctx
            .models
            .iter()
            .find(|m| !m.side_effect)
            .map(|m| m.service_package.clone())
            .unwrap_or_else(|| ctx.module_name.clone());
        let mut declaration = OrchestratorDeclaration::new(base_package);
        declaration.steps = ctx
            .models
            .iter()
            .filter(|m| !m.side_effect)
            .map(|m| m.service_name.clone())
            .collect();
        declaration
    }

    fn orchestrator_model(
        &self,
        ctx: &CompilationContext,
        declaration: &OrchestratorDeclaration,
    ) -> OrchestratorModel {
        let first = declaration.steps.first().and_then(|name| ctx.model(name));
        let last = declaration.steps.last().and_then(|name| ctx.model(name));

        OrchestratorModel {
            service_name: naming::orchestrator_service_name(&ctx.module_name),
            base_package: declaration.base_package.clone(),
            step_order: declaration.steps.clone(),
            transport: declaration.transport.unwrap_or(ctx.transport),
            input_type: first.map(|m| m.input.domain_type.clone()),
            output_type: last.map(|m| m.output.domain_type.clone()),
            client_streaming: first.is_some_and(|m| m.streaming.client_streaming()),
            server_streaming: last.is_some_and(|m| m.streaming.server_streaming()),
            cli_client: declaration.cli_client,
            ingest: declaration.ingest,
        }
    }
}
