//! Content factory for building the engine from a data directory.

use std::path::{Path, PathBuf};

use battle_core::{DatabaseSnapshot, EngineConfig, RuleEngine};

use crate::loaders::{ConfigLoader, DatabaseLoader, LoadResult};

/// Content factory that loads all battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── actors.ron
/// ├── classes.ron
/// ├── enemies.ron
/// ├── states.ron
/// ├── skills.ron
/// ├── items.ron
/// ├── weapons.ron
/// └── armors.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`; defaults when absent.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!("{} not found, using default config", path.display());
            return Ok(EngineConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load every database table.
    pub fn load_database(&self) -> LoadResult<DatabaseSnapshot> {
        DatabaseLoader::load(&self.data_dir)
    }

    /// Load config and database and build a [`RuleEngine`].
    pub fn load_engine(&self) -> LoadResult<RuleEngine<DatabaseSnapshot>> {
        let config = self.load_config()?;
        let database = self.load_database()?;
        RuleEngine::new(config, database).map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
