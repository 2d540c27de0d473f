//! Output bookkeeping
//!
//! Whether a task is done is decided purely by the filesystem: a task is
//! satisfied when every one of its declared outputs exists.

use crate::error::{ExecutionError, ExecutionResult};
use crate::placeholder::{PathMap, TEMP_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};

/// Check whether every output path exists, relative to `base`
///
/// A task without outputs is never satisfied, so it always runs.
pub fn is_satisfied(outputs: &PathMap, base: &Path) -> bool {
    !outputs.is_empty() && outputs.values().all(|path| base.join(path).exists())
}

/// The temp path an output is written to before it is moved in place
pub fn temp_path(path: &str) -> String {
    format!("{}{}", path, TEMP_SUFFIX)
}

/// Fail if a previous run left a temp file behind for any output
pub fn check_stale_temp_files(outputs: &PathMap, base: &Path) -> ExecutionResult<()> {
    for path in outputs.values() {
        let temp = base.join(temp_path(path));
        if temp.exists() {
            return Err(ExecutionError::StaleTempFile(temp));
        }
    }
    Ok(())
}

/// Create the parent directory of every output
pub fn ensure_output_dirs(outputs: &PathMap, base: &Path) -> std::io::Result<()> {
    for path in outputs.values() {
        if let Some(parent) = base.join(path).parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

/// Move each `<output>.tmp` to `<output>`
///
/// An output written straight to its final path is accepted as-is.
pub fn promote_temp_files(outputs: &PathMap, base: &Path) -> crate::Result<Vec<PathBuf>> {
    let mut promoted = Vec::new();

    for path in outputs.values() {
        let target = base.join(path);
        let temp = base.join(temp_path(path));

        if temp.exists() {
            fs::rename(&temp, &target)?;
            promoted.push(target);
        } else if !target.exists() {
            return Err(ExecutionError::MissingOutput(target).into());
        }
    }

    Ok(promoted)
}
