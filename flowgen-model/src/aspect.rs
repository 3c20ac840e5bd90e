//! Cross-cutting aspect models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Aspect config key marking an aspect as expandable into side-effect step
/// variants.
pub const PLUGIN_IMPLEMENTATION_KEY: &str = "pluginImplementationClass";

/// Which steps an aspect applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AspectScope {
    /// Applies to every step in the pipeline.
    Global,
    /// Applies only to the named steps.
    Steps(Vec<String>),
}

impl Default for AspectScope {
    fn default() -> Self {
        AspectScope::Global
    }
}

/// A declared cross-cutting aspect.
///
/// Aspects carry an opaque config map; the compiler only interprets a small
/// set of well-known keys (notably [`PLUGIN_IMPLEMENTATION_KEY`], which marks
/// the aspect for expansion into side-effect step variants).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectModel {
    /// Aspect name, used to derive expanded step names.
    pub name: String,
    /// Which steps the aspect applies to.
    #[serde(default)]
    pub scope: AspectScope,
    /// Opaque configuration entries.
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl AspectModel {
    /// Create an aspect with global scope and no config.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: AspectScope::Global,
            config: BTreeMap::new(),
        }
    }

    /// The plugin implementation class, when this aspect expands into
    /// side-effect step variants.
    pub fn plugin_implementation(&self) -> Option<&str> {
        self.config
            .get(PLUGIN_IMPLEMENTATION_KEY)
            .map(String::as_str)
    }

    /// Whether the aspect applies to the step with the given name.
    pub fn applies_to(&self, step_name: &str) -> bool {
        match &self.scope {
            AspectScope::Global => true,
            AspectScope::Steps(names) => names.iter().any(|n| n == step_name),
        }
    }
}
