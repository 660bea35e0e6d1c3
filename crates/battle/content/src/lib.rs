//! Data-driven battle content and loaders.
//!
//! This crate turns designer data files into the engine's inputs:
//! - Database tables (actors, classes, enemies, states, skills, items,
//!   weapons, armors) from RON files
//! - Engine configuration from TOML
//!
//! Every note is tag-extracted and every formula tag compiled while loading,
//! so a malformed formula stops the load instead of surfacing mid-battle.

#[cfg(feature = "loaders")]
pub mod loaders;

/// In-memory database produced by the loaders.
pub use battle_core::DatabaseSnapshot as Database;

#[cfg(feature = "loaders")]
pub use loaders::{
    ArmorRecord, Catalog, ConfigLoader, ContentFactory, DatabaseLoader, ItemRecord, LoadResult,
    SkillRecord, SourceRecord, WeaponRecord,
};
