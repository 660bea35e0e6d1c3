//! Static definitions authored in the database.
//!
//! Every definition owns a [`RuleSource`]: its display name, the [`TagSet`]
//! extracted from its note, and the compiled formula tags. Sources are built
//! once at load time and never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{EngineError, Result};
use crate::formula::{Formula, FormulaObject, ParseError, Scope, Value};
use crate::tags::{FORMULA_TAGS, TagSet, TagValue};

/// Database table a source lives in.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SourceKind {
    Actor,
    Class,
    Enemy,
    State,
    Skill,
    Item,
    Weapon,
    Armor,
}

/// Identity of a source, e.g. `class #7`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: u32,
}

impl SourceRef {
    pub const fn new(kind: SourceKind, id: u32) -> Self {
        Self { kind, id }
    }
}

impl core::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} #{}", self.kind, self.id)
    }
}

/// Tags whose literal is a comma-separated list of numeric ids.
pub const ID_LIST_TAGS: &[&str] = &["unseal", "unsealtype"];

/// Tagged view over one database entry.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleSource {
    origin: SourceRef,
    name: String,
    tags: TagSet,
    formulas: BTreeMap<String, Formula>,
    id_lists: BTreeMap<String, BTreeSet<u32>>,
}

impl RuleSource {
    /// Extracts the note's tags, compiles every formula tag and parses the
    /// id lists. A formula body with no statements counts as absent.
    pub fn new(origin: SourceRef, name: impl Into<String>, note: &str) -> Result<Self> {
        Self::from_tags(origin, name, TagSet::from_note(note))
    }

    pub fn from_tags(origin: SourceRef, name: impl Into<String>, tags: TagSet) -> Result<Self> {
        let mut formulas = BTreeMap::new();
        for &tag in FORMULA_TAGS {
            let Some(TagValue::Code(body)) = tags.get(tag) else {
                continue;
            };
            match Formula::compile(body) {
                Ok(formula) => {
                    formulas.insert(tag.to_string(), formula);
                }
                Err(ParseError::Empty) => {
                    tracing::trace!("{origin} <{tag}> is empty; ignored");
                }
                Err(error) => {
                    return Err(EngineError::Parse {
                        origin,
                        tag: tag.to_string(),
                        error,
                    });
                }
            }
        }

        let mut id_lists = BTreeMap::new();
        for &tag in ID_LIST_TAGS {
            let mut ids = BTreeSet::new();
            for entry in tags.list(tag) {
                let id: u32 = entry.parse().map_err(|_| EngineError::InvalidLiteral {
                    origin,
                    tag: tag.to_string(),
                    value: entry.to_string(),
                })?;
                ids.insert(id);
            }
            if !ids.is_empty() {
                id_lists.insert(tag.to_string(), ids);
            }
        }

        Ok(Self {
            origin,
            name: name.into(),
            tags,
            formulas,
            id_lists,
        })
    }

    pub fn origin(&self) -> SourceRef {
        self.origin
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn has(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn flag(&self, tag: &str) -> bool {
        self.tags.flag(tag)
    }

    pub fn list(&self, tag: &str) -> Vec<&str> {
        self.tags.list(tag)
    }

    pub fn formula(&self, tag: &str) -> Option<&Formula> {
        self.formulas.get(tag)
    }

    /// Ids listed by `<tag:1,2,3>` for one of [`ID_LIST_TAGS`].
    pub fn ids(&self, tag: &str) -> Option<&BTreeSet<u32>> {
        self.id_lists.get(tag)
    }

    /// Numeric literal of `<tag:value>`.
    pub fn number(&self, tag: &str) -> Result<Option<f64>> {
        self.tags
            .number(tag)
            .map_err(|value| EngineError::InvalidLiteral {
                origin: self.origin,
                tag: tag.to_string(),
                value,
            })
    }

    /// Runs the formula stored under `tag`; `Ok(None)` when there is none.
    pub fn evaluate(&self, tag: &str, scope: &mut Scope<'_>) -> Result<Option<Value>> {
        let Some(formula) = self.formulas.get(tag) else {
            return Ok(None);
        };
        formula
            .evaluate(scope)
            .map(Some)
            .map_err(|error| EngineError::Evaluation {
                origin: self.origin,
                tag: tag.to_string(),
                error,
            })
    }
}

/// How a skill or item connects with its target.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HitType {
    /// Always hits; no damage rate applies.
    #[default]
    Certain,
    Physical,
    Magical,
}

impl HitType {
    /// Host numbering: certain 0, physical 1, magical 2.
    pub const fn code(self) -> u8 {
        match self {
            HitType::Certain => 0,
            HitType::Physical => 1,
            HitType::Magical => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum UsableKind {
    Skill,
    Item,
}

/// A skill or usable item as seen by an action.
#[derive(Clone, Debug, PartialEq)]
pub struct UsableDefinition {
    pub kind: UsableKind,
    pub id: u32,
    pub hit_type: HitType,
    /// Skill type; 0 for items.
    pub stype_id: u32,
    pub speed: i32,
    /// Damage variance in percent.
    pub variance: u32,
    pub source: RuleSource,
}

impl UsableDefinition {
    pub const DEFAULT_VARIANCE: u32 = 20;

    pub fn new(kind: UsableKind, id: u32, name: impl Into<String>, note: &str) -> Result<Self> {
        let source_kind = match kind {
            UsableKind::Skill => SourceKind::Skill,
            UsableKind::Item => SourceKind::Item,
        };
        Ok(Self {
            kind,
            id,
            hit_type: HitType::default(),
            stype_id: 0,
            speed: 0,
            variance: Self::DEFAULT_VARIANCE,
            source: RuleSource::new(SourceRef::new(source_kind, id), name, note)?,
        })
    }

    pub fn skill(id: u32, name: impl Into<String>, note: &str) -> Result<Self> {
        Self::new(UsableKind::Skill, id, name, note)
    }

    pub fn item(id: u32, name: impl Into<String>, note: &str) -> Result<Self> {
        Self::new(UsableKind::Item, id, name, note)
    }

    pub fn with_hit_type(mut self, hit_type: HitType) -> Self {
        self.hit_type = hit_type;
        self
    }

    pub fn with_stype(mut self, stype_id: u32) -> Self {
        self.stype_id = stype_id;
        self
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_variance(mut self, variance: u32) -> Self {
        self.variance = variance;
        self
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }
}

impl FormulaObject for UsableDefinition {
    fn type_name(&self) -> &'static str {
        match self.kind {
            UsableKind::Skill => "skill",
            UsableKind::Item => "item",
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => Value::from(self.id),
            "speed" => Value::from(self.speed),
            "hitType" => Value::from(u32::from(self.hit_type.code())),
            "stypeId" => Value::from(self.stype_id),
            "variance" => Value::from(self.variance),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GoodsKind {
    Item,
    Weapon,
    Armor,
}

impl GoodsKind {
    pub const fn source_kind(self) -> SourceKind {
        match self {
            GoodsKind::Item => SourceKind::Item,
            GoodsKind::Weapon => SourceKind::Weapon,
            GoodsKind::Armor => SourceKind::Armor,
        }
    }
}

/// Order of the eight parameter slots on equipment.
pub const PARAM_NAMES: [&str; 8] = ["mhp", "mmp", "atk", "def", "mat", "mdf", "agi", "luk"];

/// Anything the party can carry: items, weapons, armors.
#[derive(Clone, Debug, PartialEq)]
pub struct GoodsDefinition {
    pub kind: GoodsKind,
    pub id: u32,
    pub price: u32,
    /// Parameter bonuses in [`PARAM_NAMES`] order; zero for items.
    pub params: [i32; 8],
    pub source: RuleSource,
}

impl GoodsDefinition {
    pub fn new(kind: GoodsKind, id: u32, name: impl Into<String>, note: &str) -> Result<Self> {
        Ok(Self {
            kind,
            id,
            price: 0,
            params: [0; 8],
            source: RuleSource::new(SourceRef::new(kind.source_kind(), id), name, note)?,
        })
    }

    pub fn with_price(mut self, price: u32) -> Self {
        self.price = price;
        self
    }

    pub fn with_params(mut self, params: [i32; 8]) -> Self {
        self.params = params;
        self
    }

    pub fn origin(&self) -> SourceRef {
        self.source.origin()
    }

    pub fn is_equipment(&self) -> bool {
        !matches!(self.kind, GoodsKind::Item)
    }

    pub fn param_total(&self) -> i64 {
        self.params.iter().map(|&p| i64::from(p)).sum()
    }
}

impl FormulaObject for GoodsDefinition {
    fn type_name(&self) -> &'static str {
        match self.kind {
            GoodsKind::Item => "item",
            GoodsKind::Weapon => "weapon",
            GoodsKind::Armor => "armor",
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "price" => Some(Value::from(self.price)),
            _ => PARAM_NAMES
                .iter()
                .position(|param| *param == name)
                .map(|index| Value::from(self.params[index])),
        }
    }
}
