//! Generated file output.
//!
//! All artifact and metadata writes go through this module. Writes are
//! idempotent: identical inputs produce byte-identical files, and existing
//! files are always overwritten so regeneration is safe to repeat.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};

use crate::render::RenderedArtifact;

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(path, content)
        .wrap_err_with(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

/// Write a rendered artifact under its role directory and return the path.
pub fn write_artifact(
    output_root: &Path,
    role_dir: &str,
    artifact: &RenderedArtifact,
) -> Result<PathBuf> {
    let path = output_root.join(role_dir).join(&artifact.file_name);
    write_file(&path, &artifact.content)?;
    Ok(path)
}

/// Write a metadata resource at the output root and return the path.
pub fn write_metadata(output_root: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = output_root.join(file_name);
    write_file(&path, content)?;
    Ok(path)
}
