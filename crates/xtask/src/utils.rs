//! Utility functions for xtask commands

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

/// Sample data shipped with the content crate.
pub fn default_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("battle")
        .join("content")
        .join("data")
}

/// Resolve `--data-dir`, falling back to the sample data.
pub fn data_dir(arg: Option<PathBuf>) -> Result<PathBuf> {
    let dir = arg.unwrap_or_else(default_data_dir);
    if !dir.is_dir() {
        return Err(anyhow!("Data directory does not exist: {}", dir.display()));
    }
    Ok(dir)
}
