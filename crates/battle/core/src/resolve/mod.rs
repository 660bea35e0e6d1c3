//! Override Resolver.
//!
//! Every query folds the same way: start from the item's own tags, then walk
//! the subject's [`Chain`] lowest precedence first, applying at each source
//! a literal override, an evaluated override, an additive bonus and a
//! multiplier, in that order. Later sources win. `null*` tags on the
//! defender's chain run last and force the neutral value.
//!
//! Results carry [`Provenance`] and are rebuilt on every query, since
//! formulas can read volatile battler state such as HP.

mod adaptive;
mod capacity;
mod chain;
mod context;
mod fold;
mod grade;
mod guard;
mod piercing;
mod resolved;
mod seal;
mod variance;

pub use adaptive::resolve_adaptive;
pub use capacity::{gain_quantity, resolve_max_carry};
pub use chain::Chain;
pub use context::ModifierContext;
pub use fold::{AxisTags, fold_flag, fold_number, nullify};
pub use grade::{UNIQUE_DUPLICATE_PERFORMANCE, equip_performance};
pub use guard::resolve_guard_bypass;
pub use piercing::{MAGICAL_PIERCING, PHYSICAL_PIERCING, Piercing, pierced_rate, resolve_piercing};
pub use resolved::{Provenance, ResolvedModifier};
pub use seal::resolve_seal;
pub use variance::{VarianceFlags, VarianceMode, apply_variance, decide_variance, resolve_variance};
