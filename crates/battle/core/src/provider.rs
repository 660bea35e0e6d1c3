//! Host-facing query contract.
//!
//! The host calls a [`CombatRulesProvider`] wherever its stock rules would
//! run: damage, action speed, skill usability and inventory limits.
//! [`RuleEngine`] is the provider backed by a [`DatabaseOracle`].

use crate::battler::Battler;
use crate::config::EngineConfig;
use crate::data::{GoodsDefinition, UsableDefinition};
use crate::env::{DatabaseOracle, PcgRng, RngOracle};
use crate::error::{EngineError, Result};
use crate::formula::Formula;
use crate::pipeline::{
    DamageBreakdown, DamageRequest, SpeedRequest, compute_damage, compute_speed, resolve_modifiers,
};
use crate::resolve::{self, Chain, ResolvedModifier};

/// One method per query the host delegates.
pub trait CombatRulesProvider {
    /// Final integer damage of one hit; negative values heal.
    fn resolve_damage(&self, request: &DamageRequest<'_>) -> Result<i64>;

    fn resolve_speed(&self, request: &SpeedRequest<'_>) -> Result<f64>;

    /// Whether `skill` is sealed for `subject`.
    ///
    /// `host_sealed` reports the host's own seal-skill traits.
    fn is_sealed(
        &self,
        subject: &Battler,
        skill: &UsableDefinition,
        host_sealed: bool,
    ) -> Result<bool>;

    /// Host usable conditions (cost, weapon type, ...) and not sealed.
    fn meets_skill_conditions(
        &self,
        subject: &Battler,
        skill: &UsableDefinition,
        host_usable: bool,
        host_sealed: bool,
    ) -> Result<bool> {
        Ok(host_usable && !self.is_sealed(subject, skill, host_sealed)?)
    }

    fn max_carry_quantity(&self, goods: &GoodsDefinition) -> Result<u32>;

    /// Quantity of `goods` after the party gains `amount` of it.
    fn gain_quantity(&self, goods: &GoodsDefinition, current: u32, amount: i64) -> Result<u32> {
        let max = self.max_carry_quantity(goods)?;
        Ok(resolve::gain_quantity(current, amount, max))
    }

    fn equip_performance(&self, goods: &GoodsDefinition, already_equipped: bool) -> Result<f64>;
}

/// Rule engine over a static database.
///
/// Holds no per-battle state; one engine can serve any number of battles.
#[derive(Debug)]
pub struct RuleEngine<D, R = PcgRng> {
    config: EngineConfig,
    database: D,
    rng: R,
    base_speed: Formula,
    default_max_items: Formula,
}

fn compile_config(field: &str, source: &str) -> Result<Formula> {
    Formula::compile(source)
        .map_err(|error| EngineError::InvalidConfig(format!("{field} `{source}`: {error}")))
}

impl<D: DatabaseOracle> RuleEngine<D, PcgRng> {
    pub fn new(config: EngineConfig, database: D) -> Result<Self> {
        Self::with_rng(config, database, PcgRng)
    }
}

impl<D: DatabaseOracle, R: RngOracle> RuleEngine<D, R> {
    /// Compiles the config formulas; fails with [`EngineError::InvalidConfig`].
    pub fn with_rng(config: EngineConfig, database: D, rng: R) -> Result<Self> {
        let base_speed = compile_config("base_speed", &config.base_speed)?;
        let default_max_items = compile_config("default_max_items", &config.default_max_items)?;
        Ok(Self {
            config,
            database,
            rng,
            base_speed,
            default_max_items,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    /// Damage with every stage and modifier exposed.
    pub fn explain_damage(&self, request: &DamageRequest<'_>) -> Result<DamageBreakdown> {
        let modifiers = resolve_modifiers(&self.database, &self.config, request)?;
        Ok(compute_damage(&self.config, request, modifiers, &self.rng))
    }

    pub fn explain_speed(&self, request: &SpeedRequest<'_>) -> Result<ResolvedModifier<f64>> {
        compute_speed(&self.base_speed, request)
    }

    pub fn explain_seal(
        &self,
        subject: &Battler,
        skill: &UsableDefinition,
        host_sealed: bool,
    ) -> Result<ResolvedModifier<bool>> {
        let chain = Chain::of(&self.database, subject)?;
        resolve::resolve_seal(&self.config, &chain, subject, skill, host_sealed)
    }

    pub fn explain_max_carry(&self, goods: &GoodsDefinition) -> Result<ResolvedModifier<u32>> {
        resolve::resolve_max_carry(&self.config, &self.default_max_items, goods)
    }
}

impl<D: DatabaseOracle, R: RngOracle> CombatRulesProvider for RuleEngine<D, R> {
    fn resolve_damage(&self, request: &DamageRequest<'_>) -> Result<i64> {
        self.explain_damage(request).map(|breakdown| breakdown.value)
    }

    fn resolve_speed(&self, request: &SpeedRequest<'_>) -> Result<f64> {
        self.explain_speed(request).map(|speed| speed.value)
    }

    fn is_sealed(
        &self,
        subject: &Battler,
        skill: &UsableDefinition,
        host_sealed: bool,
    ) -> Result<bool> {
        self.explain_seal(subject, skill, host_sealed)
            .map(|sealed| sealed.value)
    }

    fn max_carry_quantity(&self, goods: &GoodsDefinition) -> Result<u32> {
        self.explain_max_carry(goods).map(|max| max.value)
    }

    fn equip_performance(&self, goods: &GoodsDefinition, already_equipped: bool) -> Result<f64> {
        resolve::equip_performance(&self.config, goods, already_equipped).map(|grade| grade.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GoodsKind, HitType, SourceKind};
    use crate::env::DatabaseSnapshot;

    fn engine() -> RuleEngine<DatabaseSnapshot> {
        let mut db = DatabaseSnapshot::new();
        db.add(SourceKind::Actor, 1, "Harold", "").unwrap();
        db.add(SourceKind::Class, 1, "Mage", "<sealp>").unwrap();
        RuleEngine::new(EngineConfig::default(), db).unwrap()
    }

    #[test]
    fn uncompilable_config_is_rejected() {
        let config = EngineConfig::default().with_base_speed("agi +");
        let err = RuleEngine::new(config, DatabaseSnapshot::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidConfig(ref message) if message.starts_with("base_speed")
        ));
    }

    #[test]
    fn skill_conditions_combine_host_and_seal() {
        let engine = engine();
        let subject = Battler::actor(1, 1);
        let strike = UsableDefinition::skill(10, "Strike", "")
            .unwrap()
            .with_hit_type(HitType::Physical);
        let spark = UsableDefinition::skill(11, "Spark", "")
            .unwrap()
            .with_hit_type(HitType::Magical);

        assert!(!engine.meets_skill_conditions(&subject, &strike, true, false).unwrap());
        assert!(engine.meets_skill_conditions(&subject, &spark, true, false).unwrap());
        assert!(!engine.meets_skill_conditions(&subject, &spark, false, false).unwrap());
    }

    #[test]
    fn gain_respects_carry_cap() {
        let engine = engine();
        let ether = GoodsDefinition::new(GoodsKind::Item, 2, "Ether", "<max:5>").unwrap();
        assert_eq!(engine.max_carry_quantity(&ether).unwrap(), 5);
        assert_eq!(engine.gain_quantity(&ether, 4, 3).unwrap(), 5);
    }
}
