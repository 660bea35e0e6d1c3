//! Generic precedence folds shared by the per-query resolvers.

use super::{Chain, Provenance, ResolvedModifier};
use crate::data::RuleSource;
use crate::error::Result;
use crate::formula::{Scope, Value};

/// Tag names feeding one numeric axis.
///
/// Names are listed axis-specific first. Within one source the first present
/// literal and eval win; every present plus and mult applies, in list order.
#[derive(Clone, Copy, Debug)]
pub struct AxisTags {
    pub literal: &'static [&'static str],
    pub eval: &'static [&'static str],
    pub plus: &'static [&'static str],
    pub mult: &'static [&'static str],
    /// Lower bound for evaluated results.
    pub eval_floor: Option<f64>,
}

fn first_number(source: &RuleSource, names: &[&str]) -> Result<Option<f64>> {
    for name in names {
        if let Some(value) = source.number(name)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn first_eval<'s>(
    source: &RuleSource,
    names: &[&str],
    scope: &dyn Fn() -> Scope<'s>,
) -> Result<Option<Value>> {
    for name in names {
        if source.formula(name).is_some() {
            return source.evaluate(name, &mut scope());
        }
    }
    Ok(None)
}

fn apply_source<'s>(
    resolved: &mut ResolvedModifier<f64>,
    source: &RuleSource,
    tags: &AxisTags,
    layered: bool,
    scope: &dyn Fn() -> Scope<'s>,
) -> Result<()> {
    let origin = source.origin();

    if let Some(value) = first_number(source, tags.literal)? {
        resolved.set_by(value, origin);
    }
    if let Some(value) = first_eval(source, tags.eval, scope)? {
        let value = match tags.eval_floor {
            Some(floor) => value.as_number().max(floor),
            None => value.as_number(),
        };
        resolved.set_by(value, origin);
    }
    if !layered {
        return Ok(());
    }
    for name in tags.plus {
        if let Some(bonus) = source.number(name)? {
            resolved.set_by(resolved.value + bonus, origin);
        }
    }
    for name in tags.mult {
        if let Some(factor) = source.number(name)? {
            resolved.set_by(resolved.value * factor, origin);
        }
    }
    Ok(())
}

/// Folds a numeric axis: the item's literal/eval tags, then every chain
/// source with all four stages. Starts at 0.
pub fn fold_number<'s>(
    base: Option<&RuleSource>,
    chain: &Chain<'_>,
    tags: &AxisTags,
    scope: &dyn Fn() -> Scope<'s>,
) -> Result<ResolvedModifier<f64>> {
    let mut resolved = ResolvedModifier::stock(0.0);
    if let Some(base) = base {
        apply_source(&mut resolved, base, tags, false, scope)?;
    }
    for source in chain.iter() {
        apply_source(&mut resolved, source, tags, true, scope)?;
    }
    Ok(resolved)
}

/// Folds a boolean: `<flag>` overrides, then `<eval>` overrides by
/// truthiness. Starts at `false`.
pub fn fold_flag<'s>(
    base: Option<&RuleSource>,
    chain: &Chain<'_>,
    flag: &str,
    eval: &str,
    scope: &dyn Fn() -> Scope<'s>,
) -> Result<ResolvedModifier<bool>> {
    let mut resolved = ResolvedModifier::stock(false);
    for source in base.into_iter().chain(chain.iter()) {
        if source.has(flag) {
            resolved.set_by(source.flag(flag), source.origin());
        }
        if source.formula(eval).is_some() {
            if let Some(value) = source.evaluate(eval, &mut scope())? {
                resolved.set_by(value.is_truthy(), source.origin());
            }
        }
    }
    Ok(resolved)
}

/// Forces `neutral` when any source of the defender's chain carries one of
/// `null_tags`. Returns whether it did.
pub fn nullify<T>(
    resolved: &mut ResolvedModifier<T>,
    defender: &Chain<'_>,
    null_tags: &[&str],
    neutral: T,
) -> bool {
    let Some(source) = defender.any_flag(null_tags) else {
        return false;
    };
    tracing::debug!("{} cancels <{}>", source.origin(), null_tags.join("|"));
    resolved.value = neutral;
    resolved.provenance = Provenance::Nulled(source.origin());
    true
}
