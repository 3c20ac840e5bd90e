//! Target resolution phase.

use std::collections::BTreeSet;

use eyre::Result;
use flowgen_model::{DeploymentRole, GenerationTarget, TransportMode};

use crate::pipeline::{CompilationContext, Phase};

/// Compute the enabled generation targets for one step.
///
/// Pure policy function of the pipeline transport, the step's deployment
/// role, and whether the step delegates to an external service. Delegated
/// steps always produce the adapter plus the transport's client target;
/// everything else splits on whether the role consumes or provides the step.
pub fn resolve_targets(
    transport: TransportMode,
    role: DeploymentRole,
    delegated: bool,
) -> BTreeSet<GenerationTarget> {
    if delegated {
        return BTreeSet::from([GenerationTarget::ExternalAdapter, client_target(transport)]);
    }

    if role.is_client_like() {
        return BTreeSet::from([client_target(transport)]);
    }

    match transport {
        TransportMode::Grpc => BTreeSet::from([GenerationTarget::GrpcService]),
        TransportMode::Rest => BTreeSet::from([GenerationTarget::RestResource]),
        // Local transport keeps the service target solely to drive the
        // side-effect bean; no transport surface is rendered for it.
        TransportMode::Local => BTreeSet::from([GenerationTarget::GrpcService]),
    }
}

/// The consuming-side target for a transport.
fn client_target(transport: TransportMode) -> GenerationTarget {
    match transport {
        TransportMode::Grpc => GenerationTarget::ClientStep,
        TransportMode::Rest => GenerationTarget::RestClientStep,
        TransportMode::Local => GenerationTarget::LocalClientStep,
    }
}

/// Phase that replaces every model's enabled target set with the policy
/// result.
pub struct ResolveTargetsPhase;

impl Phase for ResolveTargetsPhase {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn description(&self) -> &'static str {
        "Resolve generation targets per step"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let transport = ctx.transport;
        for model in &mut ctx.models {
            model.enabled_targets = resolve_targets(transport, model.role, model.is_delegated());
        }
        Ok(())
    }
}
