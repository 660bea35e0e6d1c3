use super::{AxisTags, Chain, ResolvedModifier, fold_number, nullify};
use crate::data::RuleSource;
use crate::error::Result;
use crate::formula::Scope;

pub const PHYSICAL_PIERCING: AxisTags = AxisTags {
    literal: &["ppiercing", "piercing"],
    eval: &["ppiercingeval", "piercingeval"],
    plus: &["ppiercingplus", "piercingplus"],
    mult: &["ppiercingmult", "piercingmult"],
    eval_floor: Some(0.0),
};

pub const MAGICAL_PIERCING: AxisTags = AxisTags {
    literal: &["mpiercing", "piercing"],
    eval: &["mpiercingeval", "piercingeval"],
    plus: &["mpiercingplus", "piercingplus"],
    mult: &["mpiercingmult", "piercingmult"],
    eval_floor: Some(0.0),
};

const NULL_PHYSICAL: &[&str] = &["nullppiercing", "nullpiercing"];
const NULL_MAGICAL: &[&str] = &["nullmpiercing", "nullpiercing"];

/// Fraction of the target's damage reduction ignored, per axis. Never
/// negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Piercing {
    pub physical: ResolvedModifier<f64>,
    pub magical: ResolvedModifier<f64>,
}

impl Piercing {
    pub const NONE: Self = Self {
        physical: ResolvedModifier::stock(0.0),
        magical: ResolvedModifier::stock(0.0),
    };

    pub fn is_active(&self) -> bool {
        self.physical.value > 0.0 || self.magical.value > 0.0
    }
}

pub fn resolve_piercing<'s>(
    item: &RuleSource,
    attacker: &Chain<'_>,
    defender: &Chain<'_>,
    scope: &dyn Fn() -> Scope<'s>,
) -> Result<Piercing> {
    let axis = |tags: &AxisTags, null_tags: &[&str]| -> Result<ResolvedModifier<f64>> {
        let mut resolved = fold_number(Some(item), attacker, tags, scope)?;
        if resolved.value < 0.0 || resolved.value.is_nan() {
            resolved.value = 0.0;
        }
        if resolved.value > 0.0 {
            nullify(&mut resolved, defender, null_tags, 0.0);
        }
        Ok(resolved)
    };

    let piercing = Piercing {
        physical: axis(&PHYSICAL_PIERCING, NULL_PHYSICAL)?,
        magical: axis(&MAGICAL_PIERCING, NULL_MAGICAL)?,
    };
    tracing::debug!(
        "piercing physical = {}, magical = {}",
        piercing.physical,
        piercing.magical
    );
    Ok(piercing)
}

/// Damage rate after piercing.
///
/// Only reductions (`rate < 1`) are pierced: the reduction `1 - rate` is
/// scaled by `1 - min(piercing, 1)`.
pub fn pierced_rate(rate: f64, piercing: f64) -> f64 {
    if piercing > 0.0 && rate < 1.0 {
        let reduction = (1.0 - rate) * (1.0 - piercing.min(1.0));
        1.0 - reduction
    } else {
        rate
    }
}
