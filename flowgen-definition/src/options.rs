//! The flat configuration option surface.
//!
//! All compiler configuration travels as a flat string key/value map,
//! regardless of whether a value originated in the `[pipeline]` section, the
//! `[pipeline.options]` table, or a command-line override. The compiler's
//! discovery phase gives the map its types and defaults.

/// Well-known option keys.
pub mod keys {
    /// Explicit generated-output root override.
    pub const OUTPUT_ROOT: &str = "outputRoot";
    /// Fallback output root, consulted when no override is set.
    pub const OUTPUT_ROOT_FALLBACK: &str = "outputRootFallback";
    /// Module name used for metadata and orchestrator naming.
    pub const MODULE_NAME: &str = "moduleName";
    /// Pipeline-wide transport mode.
    pub const TRANSPORT: &str = "transport";
    /// Deployment platform mode.
    pub const PLATFORM: &str = "platform";
    /// Global parallelism policy: sequential, auto, or parallel.
    pub const PARALLELISM_POLICY: &str = "parallelismPolicy";
    /// Enable serialization fallback for steps that request it.
    pub const MAPPER_FALLBACK_ENABLED: &str = "mapperFallbackEnabled";
    /// Warn about steps not referenced by the orchestrator order.
    pub const WARN_UNREFERENCED_STEPS: &str = "warnUnreferencedSteps";
    /// Generate an orchestrator even without an orchestrator declaration.
    pub const GENERATE_ORCHESTRATOR: &str = "generateOrchestrator";
    /// Mark this compilation as running in a plugin-host context.
    pub const PLUGIN_HOST: &str = "pluginHost";
    /// Runtime layout mapping name; also permits plugin-server generation.
    pub const RUNTIME_LAYOUT: &str = "runtimeLayout";
    /// Path to the protocol descriptor set resource.
    pub const DESCRIPTOR_SET: &str = "descriptorSet";
    /// Per-service or per-type REST path overrides, e.g.
    /// `restPathOverride.enrich` or `restPathOverride.com.acme.EnrichService`.
    pub const REST_PATH_OVERRIDE_PREFIX: &str = "restPathOverride.";
    /// Per-aspect parallelism provider class, e.g.
    /// `parallelismProvider.audit`.
    pub const PARALLELISM_PROVIDER_PREFIX: &str = "parallelismProvider.";
}

/// Global parallelism policy combined with per-implementation hints during
/// semantic analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParallelismPolicy {
    /// No policy configured; incompatibilities are advisory.
    #[default]
    Unset,
    /// Steps run strictly in order; every hint is compatible.
    Sequential,
    /// The runtime chooses; incompatible hints are errors.
    Auto,
    /// Steps run concurrently; incompatible hints are errors.
    Parallel,
}

impl ParallelismPolicy {
    /// Parse an option value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sequential" => Some(ParallelismPolicy::Sequential),
            "auto" => Some(ParallelismPolicy::Auto),
            "parallel" => Some(ParallelismPolicy::Parallel),
            _ => None,
        }
    }

    /// Returns true when the policy was explicitly set to a value that may
    /// run steps out of order or concurrently.
    pub fn explicitly_non_sequential(&self) -> bool {
        matches!(self, ParallelismPolicy::Auto | ParallelismPolicy::Parallel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallelism_policy_parse() {
        assert_eq!(
            ParallelismPolicy::parse("sequential"),
            Some(ParallelismPolicy::Sequential)
        );
        assert_eq!(
            ParallelismPolicy::parse("auto"),
            Some(ParallelismPolicy::Auto)
        );
        assert_eq!(
            ParallelismPolicy::parse("parallel"),
            Some(ParallelismPolicy::Parallel)
        );
        assert_eq!(ParallelismPolicy::parse("bogus"), None);
    }

    #[test]
    fn test_explicitly_non_sequential() {
        assert!(!ParallelismPolicy::Unset.explicitly_non_sequential());
        assert!(!ParallelismPolicy::Sequential.explicitly_non_sequential());
        assert!(ParallelismPolicy::Auto.explicitly_non_sequential());
        assert!(ParallelismPolicy::Parallel.explicitly_non_sequential());
    }
}
