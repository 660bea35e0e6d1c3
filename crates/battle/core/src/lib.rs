//! Combat modifier rule engine.
//!
//! Designers annotate database entries with note tags such as
//! `<piercing:0.4>` or `<sealeval>...</sealeval>`. `battle-core` turns those
//! notes into structured [`tags::TagSet`]s once at load time, folds them over
//! each battler's precedence chain, and answers the host's combat queries
//! through [`CombatRulesProvider`].
//!
//! The crate is pure: no I/O, no global state. Static data comes in through
//! [`env::DatabaseOracle`], randomness through [`env::RngOracle`].
pub mod battler;
pub mod config;
pub mod data;
pub mod env;
pub mod error;
pub mod formula;
pub mod pipeline;
pub mod provider;
pub mod resolve;
pub mod tags;

pub use battler::{Battler, BattlerKind, Stats};
pub use config::{EngineConfig, ForceVarianceRuling, NoVarianceRuling, UngradedPolicy};
pub use data::{
    GoodsDefinition, GoodsKind, HitType, PARAM_NAMES, RuleSource, SourceKind, SourceRef,
    UsableDefinition, UsableKind,
};
pub use env::{DatabaseOracle, DatabaseSnapshot, PcgRng, RngOracle};
pub use error::{EngineError, ErrorSeverity, Result, RuleError};
pub use formula::{EvalError, Formula, ParseError, Value};
pub use pipeline::{DamageBreakdown, DamageModifiers, DamageRequest, SpeedRequest};
pub use provider::{CombatRulesProvider, RuleEngine};
pub use resolve::{Provenance, ResolvedModifier, VarianceMode};
pub use tags::{TagSet, TagValue, extract_tags};
