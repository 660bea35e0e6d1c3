use crate::data::{GoodsDefinition, GoodsKind, RuleSource, SourceKind, SourceRef, UsableDefinition};
use crate::error::{EngineError, Result};

/// Static database lookups.
///
/// Implementations return `None` for unknown ids; the engine turns that into
/// [`EngineError::MissingSource`].
pub trait DatabaseOracle: Send + Sync {
    fn actor(&self, id: u32) -> Option<&RuleSource>;

    fn class(&self, id: u32) -> Option<&RuleSource>;

    fn enemy(&self, id: u32) -> Option<&RuleSource>;

    fn state(&self, id: u32) -> Option<&RuleSource>;

    fn skill(&self, id: u32) -> Option<&UsableDefinition>;

    fn item(&self, id: u32) -> Option<&UsableDefinition>;

    fn goods(&self, kind: GoodsKind, id: u32) -> Option<&GoodsDefinition>;

    /// Looks up a tag source of any kind.
    fn source(&self, origin: SourceRef) -> Option<&RuleSource> {
        let id = origin.id;
        match origin.kind {
            SourceKind::Actor => self.actor(id),
            SourceKind::Class => self.class(id),
            SourceKind::Enemy => self.enemy(id),
            SourceKind::State => self.state(id),
            SourceKind::Skill => self.skill(id).map(|skill| &skill.source),
            SourceKind::Item => self.item(id).map(|item| &item.source),
            SourceKind::Weapon => self.goods(GoodsKind::Weapon, id).map(|goods| &goods.source),
            SourceKind::Armor => self.goods(GoodsKind::Armor, id).map(|goods| &goods.source),
        }
    }
}

/// Maps an absent lookup to [`EngineError::MissingSource`].
pub fn require<T>(found: Option<T>, kind: SourceKind, id: u32) -> Result<T> {
    found.ok_or(EngineError::MissingSource(SourceRef::new(kind, id)))
}
