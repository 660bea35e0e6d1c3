//! Content loaders for reading battle data from files.
//!
//! Database tables are RON catalogs, the engine configuration is TOML.

pub mod config;
pub mod database;
pub mod factory;

pub use config::ConfigLoader;
pub use database::{
    ArmorRecord, Catalog, DatabaseLoader, ItemRecord, SkillRecord, SourceRecord, WeaponRecord,
};
pub use factory::ContentFactory;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
