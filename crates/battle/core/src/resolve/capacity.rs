use super::{Provenance, ResolvedModifier};
use crate::config::EngineConfig;
use crate::data::GoodsDefinition;
use crate::error::{EngineError, Result};
use crate::formula::{Formula, Scope, Value};

fn to_count(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.floor().min(f64::from(u32::MAX)) as u32
    }
}

/// Maximum quantity of `goods` the party may hold.
///
/// `<maxeval>` when it yields more than 0, then `<max:x>`, then the
/// configured default formula when truthy and positive, then the host cap.
/// Formulas bind `item`.
pub fn resolve_max_carry(
    config: &EngineConfig,
    default_formula: &Formula,
    goods: &GoodsDefinition,
) -> Result<ResolvedModifier<u32>> {
    let source = &goods.source;
    let scope = || Scope::new().with_object("item", goods);

    if let Some(value) = source.evaluate("maxeval", &mut scope())? {
        let value = value.as_number();
        if value > 0.0 {
            return Ok(ResolvedModifier::new(
                to_count(value),
                Provenance::Source(source.origin()),
            ));
        }
    }

    if let Some(value) = source.number("max")? {
        return Ok(ResolvedModifier::new(
            to_count(value),
            Provenance::Source(source.origin()),
        ));
    }

    let fallback = default_formula.evaluate(&mut scope()).map_err(|error| {
        EngineError::InvalidConfig(format!(
            "default_max_items `{}` failed for {}: {error}",
            default_formula.source().trim(),
            source.origin()
        ))
    })?;
    if fallback.is_truthy() {
        let value = match fallback {
            Value::Bool(_) => 1.0,
            Value::Number(n) => n,
        };
        if value > 0.0 {
            return Ok(ResolvedModifier::stock(to_count(value)));
        }
    }

    tracing::trace!("{} falls back to host cap", source.origin());
    Ok(ResolvedModifier::new(config.host_max_items, Provenance::Host))
}

/// Quantity after gaining `amount` (negative to lose).
///
/// Within the cap the result is clamped to `[0, max]`. A stock already over
/// the cap keeps its excess but cannot grow.
pub fn gain_quantity(current: u32, amount: i64, max: u32) -> u32 {
    let upper = if current <= max { max } else { current };
    let next = i64::from(current).saturating_add(amount);
    next.clamp(0, i64::from(upper)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GoodsKind;

    fn goods(note: &str) -> GoodsDefinition {
        GoodsDefinition::new(GoodsKind::Item, 7, "Potion", note)
            .unwrap()
            .with_price(50)
    }

    fn max_of(note: &str) -> ResolvedModifier<u32> {
        let config = EngineConfig::default();
        let formula = Formula::compile(&config.default_max_items).unwrap();
        resolve_max_carry(&config, &formula, &goods(note)).unwrap()
    }

    #[test]
    fn layers_in_order() {
        assert_eq!(max_of("").value, 99);
        assert!(max_of("").is_default());
        assert_eq!(max_of("<max:20>").value, 20);
        assert_eq!(max_of("<maxeval>\nitem.price / 10\n</maxeval>\n<max:20>").value, 5);
        // Non-positive evaluations fall through to the literal.
        assert_eq!(max_of("<maxeval>\n0\n</maxeval>\n<max:20>").value, 20);
    }

    #[test]
    fn results_are_floored() {
        assert_eq!(max_of("<max:12.9>").value, 12);
        assert_eq!(max_of("<max:-3>").value, 0);
    }

    #[test]
    fn falsy_default_uses_host_cap() {
        let config = EngineConfig::default().with_default_max_items("0");
        let formula = Formula::compile(&config.default_max_items).unwrap();
        let resolved = resolve_max_carry(&config, &formula, &goods("")).unwrap();
        assert_eq!(resolved, ResolvedModifier::new(99, Provenance::Host));

        let config = EngineConfig::default().with_default_max_items("item.price * 2");
        let formula = Formula::compile(&config.default_max_items).unwrap();
        assert_eq!(
            resolve_max_carry(&config, &formula, &goods("")).unwrap().value,
            100
        );
    }

    #[test]
    fn broken_default_formula_is_a_config_error() {
        let config = EngineConfig::default();
        let formula = Formula::compile("item.weight").unwrap();
        let err = resolve_max_carry(&config, &formula, &goods("")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn gain_clamps_within_cap() {
        assert_eq!(gain_quantity(5, 10, 12), 12);
        assert_eq!(gain_quantity(5, -10, 12), 0);
        assert_eq!(gain_quantity(5, 3, 12), 8);
    }

    #[test]
    fn gain_keeps_excess_without_growing() {
        assert_eq!(gain_quantity(30, 5, 20), 30);
        assert_eq!(gain_quantity(30, -4, 20), 26);
    }
}
