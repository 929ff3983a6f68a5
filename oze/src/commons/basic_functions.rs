use std::path::Path;

use tracing::info;

use crate::error::PipelineError;

/// Create `path` and its parents if absent. Returns whether it was created.
/// Calling it on an existing directory is a no-op.
pub fn ensure_dir(path: &Path) -> Result<bool, PipelineError> {
    if path.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(path).map_err(|source| PipelineError::Directory {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Created directory: {}", path.display());
    Ok(true)
}

/// File stem as a string, used as the layer reference name by the engine
pub fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
