//! Protocol descriptor set loading.
//!
//! The descriptor set is loaded lazily, at most once per compilation pass,
//! and only when some step actually needs a gRPC-capable binding. A load
//! failure is an infrastructure warning, not a fatal error; the caller
//! substitutes an empty set and downstream dispatch skips gRPC generation
//! with a diagnostic per affected step.

use std::path::Path;

use eyre::{Result, WrapErr};
use flowgen_model::DescriptorSet;

/// Load a descriptor set from a JSON resource.
pub fn load(path: &Path) -> Result<DescriptorSet> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read descriptor set '{}'", path.display()))?;
    let set: DescriptorSet = serde_json::from_str(&content)
        .wrap_err_with(|| format!("failed to parse descriptor set '{}'", path.display()))?;
    Ok(set)
}
