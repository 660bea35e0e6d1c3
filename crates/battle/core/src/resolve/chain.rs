use crate::battler::{Battler, BattlerKind};
use crate::data::{RuleSource, SourceKind};
use crate::env::{DatabaseOracle, require};
use crate::error::Result;

/// Sources shaping one battler's modifiers, lowest precedence first.
///
/// Actors: actor, class, then active states. Enemies: enemy, then states.
#[derive(Clone, Debug, Default)]
pub struct Chain<'a> {
    sources: Vec<&'a RuleSource>,
}

impl<'a> Chain<'a> {
    /// Looks up every source of `battler`; a dangling id is an error.
    pub fn of<D: DatabaseOracle + ?Sized>(database: &'a D, battler: &Battler) -> Result<Self> {
        let mut sources = Vec::with_capacity(battler.states.len() + 2);
        match battler.kind {
            BattlerKind::Actor { actor_id, class_id } => {
                sources.push(require(database.actor(actor_id), SourceKind::Actor, actor_id)?);
                sources.push(require(database.class(class_id), SourceKind::Class, class_id)?);
            }
            BattlerKind::Enemy { enemy_id } => {
                sources.push(require(database.enemy(enemy_id), SourceKind::Enemy, enemy_id)?);
            }
        }
        for &state in &battler.states {
            sources.push(require(database.state(state), SourceKind::State, state)?);
        }
        Ok(Self { sources })
    }

    pub fn from_sources(sources: Vec<&'a RuleSource>) -> Self {
        Self { sources }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a RuleSource> + '_ {
        self.sources.iter().copied()
    }

    /// Highest-precedence source carrying any of `tags` as a truthy flag.
    pub fn any_flag(&self, tags: &[&str]) -> Option<&'a RuleSource> {
        self.iter()
            .rev()
            .find(|source| tags.iter().any(|tag| source.flag(tag)))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
