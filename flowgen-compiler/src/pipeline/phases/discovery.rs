//! Discovery phase - resolves run context from configuration.

use eyre::Result;
use flowgen_definition::keys;
use flowgen_model::{PlatformMode, TransportMode};

use crate::{
    options::CompilerOptions,
    pipeline::{CompilationContext, Phase},
};

/// Phase that resolves the run context from the flat option map.
///
/// Pure function of configuration: output root (override → fallback →
/// default), module identity, transport and platform modes, plugin-host
/// flag, runtime layout, and the declared aspects. Always produces a usable
/// context; absent configuration falls back to defaults.
pub struct DiscoveryPhase;

impl Phase for DiscoveryPhase {
    fn name(&self) -> &'static str {
        "discovery"
    }

    fn description(&self) -> &'static str {
        "Resolve run context from configuration"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let options = CompilerOptions::new(ctx.input.options.clone());

        ctx.output_root = options.output_root();
        ctx.module_name = options.module_name();

        ctx.transport = match options.transport() {
            Some(transport) => transport,
            None => {
                if let Some(raw) = options.get(keys::TRANSPORT) {
                    ctx.add_warning(
                        self.name(),
                        format!("unrecognized transport '{}', defaulting to grpc", raw),
                    );
                }
                TransportMode::Grpc
            }
        };

        ctx.platform = match options.platform() {
            Some(platform) => platform,
            None => {
                if let Some(raw) = options.get(keys::PLATFORM) {
                    ctx.add_warning(
                        self.name(),
                        format!("unrecognized platform '{}', defaulting to standard", raw),
                    );
                }
                PlatformMode::Standard
            }
        };

        ctx.plugin_host = options.plugin_host();
        ctx.runtime_layout = options.runtime_layout().map(str::to_string);
        ctx.aspects = ctx.input.aspects.clone();
        ctx.options = options;

        Ok(())
    }
}
