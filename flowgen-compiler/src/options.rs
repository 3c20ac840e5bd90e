//! Typed view over the flat configuration option map.

use std::collections::BTreeMap;
use std::path::PathBuf;

use flowgen_definition::{ParallelismPolicy, keys};
use flowgen_model::{PlatformMode, TransportMode};

/// Default generated-output root under the working directory, used when
/// neither the override nor the fallback option is set.
pub const DEFAULT_OUTPUT_ROOT: &str = "generated";

/// Typed accessors over the flat string option map.
///
/// Every accessor defaults; option resolution is never fatal.
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    map: BTreeMap<String, String>,
}

impl CompilerOptions {
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self { map }
    }

    /// Raw lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some("true") | Some("1"))
    }

    /// Resolve the generated-output root: explicit override, then fallback,
    /// then the default path under the working directory.
    pub fn output_root(&self) -> PathBuf {
        self.get(keys::OUTPUT_ROOT)
            .or_else(|| self.get(keys::OUTPUT_ROOT_FALLBACK))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT))
    }

    /// Module name; defaults to "pipeline".
    pub fn module_name(&self) -> String {
        self.get(keys::MODULE_NAME).unwrap_or("pipeline").to_string()
    }

    /// Pipeline-wide transport; defaults to gRPC. Unknown values also fall
    /// back to gRPC, with the caller expected to surface a diagnostic.
    pub fn transport(&self) -> Option<TransportMode> {
        match self.get(keys::TRANSPORT) {
            Some("grpc") => Some(TransportMode::Grpc),
            Some("rest") => Some(TransportMode::Rest),
            Some("local") => Some(TransportMode::Local),
            _ => None,
        }
    }

    /// Platform mode, when recognized.
    pub fn platform(&self) -> Option<PlatformMode> {
        match self.get(keys::PLATFORM) {
            Some("standard") => Some(PlatformMode::Standard),
            Some("function") => Some(PlatformMode::Function),
            _ => None,
        }
    }

    /// Global parallelism policy; unset when absent or unrecognized.
    pub fn parallelism_policy(&self) -> ParallelismPolicy {
        self.get(keys::PARALLELISM_POLICY)
            .and_then(ParallelismPolicy::parse)
            .unwrap_or_default()
    }

    /// Whether serialization fallback is globally enabled.
    pub fn mapper_fallback_enabled(&self) -> bool {
        self.get_bool(keys::MAPPER_FALLBACK_ENABLED)
    }

    /// Whether to warn about steps not referenced by the orchestrator order.
    /// Defaults to on.
    pub fn warn_unreferenced_steps(&self) -> bool {
        match self.get(keys::WARN_UNREFERENCED_STEPS) {
            Some("false") | Some("0") => false,
            _ => true,
        }
    }

    /// Orchestrator generation opt-in, for passes without an orchestrator
    /// declaration.
    pub fn generate_orchestrator(&self) -> bool {
        self.get_bool(keys::GENERATE_ORCHESTRATOR)
    }

    /// Whether this compilation runs in a plugin-host context.
    pub fn plugin_host(&self) -> bool {
        self.get_bool(keys::PLUGIN_HOST)
    }

    /// Runtime layout mapping name, if configured.
    pub fn runtime_layout(&self) -> Option<&str> {
        self.get(keys::RUNTIME_LAYOUT)
    }

    /// Path to the protocol descriptor set resource.
    pub fn descriptor_set(&self) -> Option<PathBuf> {
        self.get(keys::DESCRIPTOR_SET).map(PathBuf::from)
    }

    /// REST path override for a step: looked up by exact service name first,
    /// then by fully-qualified service type.
    pub fn rest_path_override(&self, service_name: &str, service_type: &str) -> Option<&str> {
        self.get(&format!("{}{}", keys::REST_PATH_OVERRIDE_PREFIX, service_name))
            .or_else(|| {
                self.get(&format!(
                    "{}{}",
                    keys::REST_PATH_OVERRIDE_PREFIX,
                    service_type
                ))
            })
    }

    /// Explicitly configured parallelism provider class for an aspect.
    pub fn parallelism_provider(&self, aspect_name: &str) -> Option<&str> {
        self.get(&format!(
            "{}{}",
            keys::PARALLELISM_PROVIDER_PREFIX, aspect_name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(entries: &[(&str, &str)]) -> CompilerOptions {
        CompilerOptions::new(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_output_root_resolution_order() {
        let both = options(&[
            (keys::OUTPUT_ROOT, "explicit"),
            (keys::OUTPUT_ROOT_FALLBACK, "fallback"),
        ]);
        assert_eq!(both.output_root(), PathBuf::from("explicit"));

        let fallback_only = options(&[(keys::OUTPUT_ROOT_FALLBACK, "fallback")]);
        assert_eq!(fallback_only.output_root(), PathBuf::from("fallback"));

        let neither = options(&[]);
        assert_eq!(neither.output_root(), PathBuf::from(DEFAULT_OUTPUT_ROOT));
    }

    #[test]
    fn test_rest_path_override_lookup_order() {
        let opts = options(&[
            ("restPathOverride.enrich", "/v2/enrich"),
            ("restPathOverride.com.acme.ScoreService", "/v2/score"),
        ]);
        assert_eq!(
            opts.rest_path_override("enrich", "com.acme.EnrichService"),
            Some("/v2/enrich")
        );
        assert_eq!(
            opts.rest_path_override("score", "com.acme.ScoreService"),
            Some("/v2/score")
        );
        assert_eq!(opts.rest_path_override("other", "com.acme.Other"), None);
    }

    #[test]
    fn test_boolean_defaults() {
        let empty = options(&[]);
        assert!(!empty.mapper_fallback_enabled());
        assert!(!empty.generate_orchestrator());
        assert!(!empty.plugin_host());
        assert!(empty.warn_unreferenced_steps());

        let off = options(&[(keys::WARN_UNREFERENCED_STEPS, "false")]);
        assert!(!off.warn_unreferenced_steps());
    }

    #[test]
    fn test_parallelism_policy_defaults_to_unset() {
        let empty = options(&[]);
        assert_eq!(empty.parallelism_policy(), ParallelismPolicy::Unset);

        let set = options(&[(keys::PARALLELISM_POLICY, "parallel")]);
        assert_eq!(set.parallelism_policy(), ParallelismPolicy::Parallel);
    }
}
