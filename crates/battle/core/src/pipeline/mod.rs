//! Modifier Pipeline.
//!
//! Stateless stages that turn a host base value into the final answer of a
//! query. Each stage consumes the previous stage's number plus the
//! modifiers the resolver produced for this action.
//!
//! - [`damage`]: rate, recovery, critical, variance, guard, rounding
//! - [`speed`]: base formula, item and attack bonuses, `<speed>` program

pub mod damage;
pub mod speed;

pub use damage::{
    DamageBreakdown, DamageModifiers, DamageRequest, compute_damage, resolve_modifiers,
};
pub use speed::{SpeedRequest, compute_speed};
