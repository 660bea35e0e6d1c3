//! In-memory database.

use std::collections::BTreeMap;

use super::DatabaseOracle;
use crate::data::{
    GoodsDefinition, GoodsKind, RuleSource, SourceKind, SourceRef, UsableDefinition, UsableKind,
};
use crate::error::Result;

/// Owned tables of every source kind, keyed by id.
///
/// Content loaders fill one of these; tests build them by hand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatabaseSnapshot {
    actors: BTreeMap<u32, RuleSource>,
    classes: BTreeMap<u32, RuleSource>,
    enemies: BTreeMap<u32, RuleSource>,
    states: BTreeMap<u32, RuleSource>,
    skills: BTreeMap<u32, UsableDefinition>,
    items: BTreeMap<u32, UsableDefinition>,
    goods: BTreeMap<(GoodsKind, u32), GoodsDefinition>,
}

impl DatabaseSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tag-only source into the table matching its kind.
    ///
    /// Skills, items, weapons and armors carry more than tags and go
    /// through [`Self::insert_usable`] and [`Self::insert_goods`].
    pub fn insert_source(&mut self, source: RuleSource) {
        let id = source.origin().id;
        let table = match source.origin().kind {
            SourceKind::Actor => &mut self.actors,
            SourceKind::Class => &mut self.classes,
            SourceKind::Enemy => &mut self.enemies,
            SourceKind::State => &mut self.states,
            SourceKind::Skill | SourceKind::Item | SourceKind::Weapon | SourceKind::Armor => {
                return;
            }
        };
        table.insert(id, source);
    }

    /// Builds and inserts a tag-only source from a raw note.
    pub fn add(&mut self, kind: SourceKind, id: u32, name: &str, note: &str) -> Result<()> {
        self.insert_source(RuleSource::new(SourceRef::new(kind, id), name, note)?);
        Ok(())
    }

    pub fn insert_usable(&mut self, usable: UsableDefinition) {
        let table = match usable.kind {
            UsableKind::Skill => &mut self.skills,
            UsableKind::Item => &mut self.items,
        };
        table.insert(usable.id, usable);
    }

    pub fn insert_goods(&mut self, goods: GoodsDefinition) {
        self.goods.insert((goods.kind, goods.id), goods);
    }

    /// Number of entries per source kind.
    pub fn counts(&self) -> BTreeMap<SourceKind, usize> {
        let goods = |kind: GoodsKind| self.goods.keys().filter(|(k, _)| *k == kind).count();
        BTreeMap::from([
            (SourceKind::Actor, self.actors.len()),
            (SourceKind::Class, self.classes.len()),
            (SourceKind::Enemy, self.enemies.len()),
            (SourceKind::State, self.states.len()),
            (SourceKind::Skill, self.skills.len()),
            (SourceKind::Item, self.items.len().max(goods(GoodsKind::Item))),
            (SourceKind::Weapon, goods(GoodsKind::Weapon)),
            (SourceKind::Armor, goods(GoodsKind::Armor)),
        ])
    }

    pub fn sources(&self) -> impl Iterator<Item = &RuleSource> {
        self.actors
            .values()
            .chain(self.classes.values())
            .chain(self.enemies.values())
            .chain(self.states.values())
            .chain(self.skills.values().map(|skill| &skill.source))
            .chain(self.items.values().map(|item| &item.source))
            .chain(self.goods.values().map(|goods| &goods.source))
    }
}

impl DatabaseOracle for DatabaseSnapshot {
    fn actor(&self, id: u32) -> Option<&RuleSource> {
        self.actors.get(&id)
    }

    fn class(&self, id: u32) -> Option<&RuleSource> {
        self.classes.get(&id)
    }

    fn enemy(&self, id: u32) -> Option<&RuleSource> {
        self.enemies.get(&id)
    }

    fn state(&self, id: u32) -> Option<&RuleSource> {
        self.states.get(&id)
    }

    fn skill(&self, id: u32) -> Option<&UsableDefinition> {
        self.skills.get(&id)
    }

    fn item(&self, id: u32) -> Option<&UsableDefinition> {
        self.items.get(&id)
    }

    fn goods(&self, kind: GoodsKind, id: u32) -> Option<&GoodsDefinition> {
        self.goods.get(&(kind, id))
    }
}
