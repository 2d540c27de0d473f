//! Common test utilities

use sciflow::runner::{Context, Verbosity};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory and a silent context running inside it
pub fn create_test_context() -> (TempDir, Context) {
    let temp_dir = TempDir::new().unwrap();
    let ctx = Context::new()
        .with_working_dir(temp_dir.path().to_path_buf())
        .with_verbosity(Verbosity::Silent);
    (temp_dir, ctx)
}

/// Write a file relative to the temp directory, creating parents
#[allow(dead_code)]
pub fn write_file(dir: &TempDir, rel: &str, content: &str) -> PathBuf {
    let path = dir.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Read a file relative to the temp directory
#[allow(dead_code)]
pub fn read_file(dir: &TempDir, rel: &str) -> String {
    fs::read_to_string(dir.path().join(rel)).unwrap()
}
