//! Database table loader.
//!
//! One RON catalog per table under the data directory:
//!
//! ```text
//! (
//!     entries: [
//!         (id: 1, name: "Harold", note: "<piercing:0.2>"),
//!     ],
//! )
//! ```
//!
//! Absent files load as empty tables.

use std::path::Path;

use battle_core::{
    DatabaseSnapshot, GoodsDefinition, GoodsKind, HitType, RuleSource, SourceKind, SourceRef,
    Stats, UsableDefinition,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Top-level structure of every table file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog<T> {
    pub entries: Vec<T>,
}

/// Actors, classes, enemies and states: tags only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub note: String,
}

fn default_variance() -> u32 {
    UsableDefinition::DEFAULT_VARIANCE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRecord {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub hit_type: HitType,
    #[serde(default)]
    pub stype_id: u32,
    #[serde(default)]
    pub speed: i32,
    #[serde(default = "default_variance")]
    pub variance: u32,
}

/// Usable item; also registered as carriable goods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub hit_type: HitType,
    #[serde(default)]
    pub speed: i32,
    #[serde(default = "default_variance")]
    pub variance: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponRecord {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub params: Stats,
}

pub type ArmorRecord = WeaponRecord;

fn params(stats: &Stats) -> [i32; 8] {
    [
        stats.mhp, stats.mmp, stats.atk, stats.def, stats.mat, stats.mdf, stats.agi, stats.luk,
    ]
}

/// Loader for every database table of a data directory.
pub struct DatabaseLoader;

impl DatabaseLoader {
    pub const ACTORS: &'static str = "actors.ron";
    pub const CLASSES: &'static str = "classes.ron";
    pub const ENEMIES: &'static str = "enemies.ron";
    pub const STATES: &'static str = "states.ron";
    pub const SKILLS: &'static str = "skills.ron";
    pub const ITEMS: &'static str = "items.ron";
    pub const WEAPONS: &'static str = "weapons.ron";
    pub const ARMORS: &'static str = "armors.ron";

    /// Load all tables found in `dir`.
    ///
    /// Fails on the first unreadable file, RON syntax error, or note whose
    /// formula tags do not compile.
    pub fn load(dir: &Path) -> LoadResult<DatabaseSnapshot> {
        let mut db = DatabaseSnapshot::new();

        for (file, kind) in [
            (Self::ACTORS, SourceKind::Actor),
            (Self::CLASSES, SourceKind::Class),
            (Self::ENEMIES, SourceKind::Enemy),
            (Self::STATES, SourceKind::State),
        ] {
            let path = dir.join(file);
            for record in Self::read_catalog::<SourceRecord>(&path)? {
                let origin = SourceRef::new(kind, record.id);
                let source = RuleSource::new(origin, record.name, &record.note)
                    .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
                db.insert_source(source);
            }
        }

        let path = dir.join(Self::SKILLS);
        for record in Self::read_catalog::<SkillRecord>(&path)? {
            let skill = UsableDefinition::skill(record.id, record.name, &record.note)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
                .with_hit_type(record.hit_type)
                .with_stype(record.stype_id)
                .with_speed(record.speed)
                .with_variance(record.variance);
            db.insert_usable(skill);
        }

        let path = dir.join(Self::ITEMS);
        for record in Self::read_catalog::<ItemRecord>(&path)? {
            let item = UsableDefinition::item(record.id, record.name.clone(), &record.note)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
                .with_hit_type(record.hit_type)
                .with_speed(record.speed)
                .with_variance(record.variance);
            db.insert_usable(item);
            let goods = GoodsDefinition::new(GoodsKind::Item, record.id, record.name, &record.note)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
                .with_price(record.price);
            db.insert_goods(goods);
        }

        for (file, kind) in [
            (Self::WEAPONS, GoodsKind::Weapon),
            (Self::ARMORS, GoodsKind::Armor),
        ] {
            let path = dir.join(file);
            for record in Self::read_catalog::<WeaponRecord>(&path)? {
                let goods = GoodsDefinition::new(kind, record.id, record.name, &record.note)
                    .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
                    .with_price(record.price)
                    .with_params(params(&record.params));
                db.insert_goods(goods);
            }
        }

        let counts = db.counts();
        tracing::info!(
            "loaded database from {}: {}",
            dir.display(),
            counts
                .iter()
                .map(|(kind, count)| format!("{count} {kind}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(db)
    }

    fn read_catalog<T: DeserializeOwned>(path: &Path) -> LoadResult<Vec<T>> {
        if !path.exists() {
            tracing::debug!("{} not found, table left empty", path.display());
            return Ok(Vec::new());
        }
        let content = read_file(path)?;
        let catalog: Catalog<T> = ron::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse catalog RON {}: {}", path.display(), e)
        })?;
        tracing::debug!("{}: {} entries", path.display(), catalog.entries.len());
        Ok(catalog.entries)
    }
}
