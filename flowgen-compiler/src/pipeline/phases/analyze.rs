//! Analyze phase - semantic validation over the extracted models.

use eyre::{Result, bail};
use flowgen_model::{MapperFallback, PlatformMode, TransportMode};

use crate::pipeline::{CompilationContext, Phase};

/// Phase that validates semantic constraints across the whole model set.
///
/// Step-local findings surface as diagnostics and never block siblings. The
/// single fatal condition here is a platform/transport combination the
/// runtime cannot host.
pub struct AnalyzePhase;

impl Phase for AnalyzePhase {
    fn name(&self) -> &'static str {
        "analyze"
    }

    fn description(&self) -> &'static str {
        "Validate semantic constraints"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        if ctx.platform == PlatformMode::Function && ctx.transport != TransportMode::Rest {
            ctx.add_error(
                self.name(),
                format!(
                    "function platform requires rest transport, found '{}'",
                    ctx.transport.as_str()
                ),
            );
            bail!("function platform requires rest transport");
        }

        self.audit_parallelism(ctx);
        self.revalidate_delegates(ctx);

        ctx.generate_orchestrator =
            !ctx.input.orchestrators.is_empty() || ctx.options.generate_orchestrator();

        if ctx.options.warn_unreferenced_steps() {
            self.warn_unreferenced(ctx);
        }

        Ok(())
    }
}

impl AnalyzePhase {
    /// Audit each plugin aspect's parallelism provider against the global
    /// policy. A missing or unhinted provider warns exactly once regardless
    /// of policy; a sequential-only hint warns under the unset policy and is
    /// an error when the policy explicitly demands concurrency.
    fn audit_parallelism(&self, ctx: &mut CompilationContext) {
        let policy = ctx.options.parallelism_policy();
        let aspects = ctx.aspects.clone();

        for aspect in &aspects {
            let Some(implementation) = aspect.plugin_implementation() else {
                continue;
            };
            let provider = ctx
                .options
                .parallelism_provider(&aspect.name)
                .unwrap_or(implementation)
                .to_string();

            let hint = ctx
                .input
                .symbols
                .resolve(&provider)
                .and_then(|s| s.parallelism_hint());

            match hint {
                None => ctx.add_warning(
                    self.name(),
                    format!(
                        "parallelism provider '{}' for aspect '{}' declares no hint",
                        provider, aspect.name
                    ),
                ),
                Some(hint) if hint.sequential_only() => {
                    if policy.explicitly_non_sequential() {
                        ctx.add_error(
                            self.name(),
                            format!(
                                "aspect '{}' is sequential-only but the parallelism policy requires concurrency",
                                aspect.name
                            ),
                        );
                    } else if policy == flowgen_definition::ParallelismPolicy::Unset {
                        ctx.add_warning(
                            self.name(),
                            format!(
                                "aspect '{}' is sequential-only; set an explicit parallelism policy",
                                aspect.name
                            ),
                        );
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Re-check delegate references and mapper compatibility on the
    /// surviving models. Extraction already dropped broken declarations; this
    /// pass catches models whose delegates an expander introduced or that a
    /// custom phase mutated.
    fn revalidate_delegates(&self, ctx: &mut CompilationContext) {
        let mut findings = Vec::new();
        for model in &ctx.models {
            let Some(delegate) = &model.delegate else {
                continue;
            };
            match ctx.input.symbols.resolve(delegate.qualified()) {
                None => findings.push(format!(
                    "step '{}' delegates to unknown type '{}'",
                    model.service_name, delegate
                )),
                Some(symbol) if symbol.operator_shapes().len() != 1 => findings.push(format!(
                    "step '{}' delegate '{}' does not expose exactly one operator interface",
                    model.service_name, delegate
                )),
                Some(_) => {}
            }
            if (model.input.requires_mapping || model.output.requires_mapping)
                && model.external_mapper.is_none()
                && model.mapper_fallback == MapperFallback::None
            {
                findings.push(format!(
                    "step '{}' requires type mapping but carries no mapper and allows no fallback",
                    model.service_name
                ));
            }
        }
        for finding in findings {
            ctx.add_error(self.name(), finding);
        }
    }

    /// Warn about steps an orchestrator declaration never references.
    /// Side-effect variants are observers, not pipeline stages, and are
    /// exempt.
    fn warn_unreferenced(&self, ctx: &mut CompilationContext) {
        let mut findings = Vec::new();
        for declaration in &ctx.input.orchestrators {
            for model in &ctx.models {
                if model.side_effect {
                    continue;
                }
                if !declaration.steps.contains(&model.service_name) {
                    findings.push(format!(
                        "step '{}' is not referenced by the orchestrator step order",
                        model.service_name
                    ));
                }
            }
        }
        for finding in findings {
            ctx.add_warning(self.name(), finding);
        }
    }
}
