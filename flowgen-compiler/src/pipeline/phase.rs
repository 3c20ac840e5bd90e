//! Pipeline phase trait.

use eyre::Result;

use super::CompilationContext;

/// Information about a pipeline phase.
#[derive(Debug, Clone)]
pub struct PhaseInfo {
    /// The phase name.
    pub name: &'static str,
    /// A human-readable description.
    pub description: &'static str,
}

/// A phase in the compilation pipeline.
///
/// Phases are executed strictly in order; each phase's correctness depends on
/// completed, validated state from its predecessors. Built-in phases:
///
/// - `DiscoveryPhase` - resolves run context from configuration
/// - `ExtractPhase` - lowers declarations to step models
/// - `AnalyzePhase` - validates IR-wide invariants
/// - `ResolveTargetsPhase` - computes generation targets per step
/// - `BindPhase` - builds renderer-facing bindings
/// - `DispatchPhase` - renders artifacts and flushes metadata
pub trait Phase: Send + Sync {
    /// The name of this phase (used in diagnostics and plugin hooks).
    fn name(&self) -> &'static str;

    /// A human-readable description of what this phase does.
    fn description(&self) -> &'static str;

    /// Run this phase on the compilation context.
    ///
    /// # Errors
    ///
    /// Returns an error only for pass-global failures (unsupported mode
    /// combinations, binding-key invariant violations). Step-local issues
    /// are recorded as diagnostics and the offending step is dropped or
    /// skipped instead.
    fn run(&self, ctx: &mut CompilationContext) -> Result<()>;

    /// Get information about this phase.
    fn info(&self) -> PhaseInfo {
        PhaseInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}
