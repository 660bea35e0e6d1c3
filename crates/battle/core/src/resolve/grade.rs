use super::{Provenance, ResolvedModifier};
use crate::config::{EngineConfig, UngradedPolicy};
use crate::data::GoodsDefinition;
use crate::error::Result;

/// Performance of a `<unique>` piece the actor already wears.
pub const UNIQUE_DUPLICATE_PERFORMANCE: f64 = -1000.0;

/// Score used to pick the best equipment for a slot.
pub fn equip_performance(
    config: &EngineConfig,
    goods: &GoodsDefinition,
    already_equipped: bool,
) -> Result<ResolvedModifier<f64>> {
    let source = &goods.source;
    if already_equipped && source.flag("unique") {
        return Ok(ResolvedModifier::new(
            UNIQUE_DUPLICATE_PERFORMANCE,
            Provenance::Source(source.origin()),
        ));
    }
    if let Some(grade) = source.number("grade")? {
        return Ok(ResolvedModifier::new(grade, Provenance::Source(source.origin())));
    }
    let grade = match config.default_ungraded_policy {
        UngradedPolicy::UseDefault => config.default_grade,
        UngradedPolicy::UseStatTotal => goods.param_total() as f64,
        UngradedPolicy::UsePrice => f64::from(goods.price),
    };
    Ok(ResolvedModifier::stock(grade))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GoodsKind;

    fn sword(note: &str) -> GoodsDefinition {
        GoodsDefinition::new(GoodsKind::Weapon, 3, "Sword", note)
            .unwrap()
            .with_price(300)
            .with_params([0, 0, 12, 2, 0, 0, 1, 0])
    }

    #[test]
    fn unique_duplicate_is_penalised() {
        let config = EngineConfig::default();
        let piece = sword("<unique>\n<grade:9>");
        assert_eq!(
            equip_performance(&config, &piece, true).unwrap().value,
            UNIQUE_DUPLICATE_PERFORMANCE
        );
        assert_eq!(equip_performance(&config, &piece, false).unwrap().value, 9.0);
    }

    #[test]
    fn ungraded_policies() {
        let piece = sword("");
        let grade = |policy| {
            let config = EngineConfig::default().with_ungraded_policy(policy);
            equip_performance(&config, &piece, false).unwrap().value
        };
        assert_eq!(grade(UngradedPolicy::UseDefault), 0.0);
        assert_eq!(grade(UngradedPolicy::UseStatTotal), 15.0);
        assert_eq!(grade(UngradedPolicy::UsePrice), 300.0);
    }
}
