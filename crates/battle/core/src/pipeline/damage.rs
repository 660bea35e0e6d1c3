//! Damage stages.

use crate::battler::Battler;
use crate::config::EngineConfig;
use crate::data::{HitType, UsableDefinition};
use crate::env::{DatabaseOracle, RngOracle, compute_seed};
use crate::error::Result;
use crate::formula::round_half_up;
use crate::resolve::{
    Chain, ModifierContext, Piercing, ResolvedModifier, VarianceMode, apply_variance,
    pierced_rate, resolve_adaptive, resolve_guard_bypass, resolve_piercing, resolve_variance,
};

// ============================================================================
// Request
// ============================================================================

/// One hit of an action against one target.
#[derive(Clone, Copy, Debug)]
pub struct DamageRequest<'a> {
    pub subject: &'a Battler,
    pub target: &'a Battler,
    pub item: &'a UsableDefinition,
    /// Result of the host's damage formula, before any rate.
    pub base_value: f64,
    pub element_rate: f64,
    pub critical: bool,
    pub battle_seed: u64,
    /// Action sequence number within the battle.
    pub action: u64,
}

impl<'a> DamageRequest<'a> {
    pub fn new(
        subject: &'a Battler,
        target: &'a Battler,
        item: &'a UsableDefinition,
        base_value: f64,
    ) -> Self {
        Self {
            subject,
            target,
            item,
            base_value,
            element_rate: 1.0,
            critical: false,
            battle_seed: 0,
            action: 0,
        }
    }

    pub fn with_element_rate(mut self, rate: f64) -> Self {
        self.element_rate = rate;
        self
    }

    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    pub fn with_seed(mut self, battle_seed: u64, action: u64) -> Self {
        self.battle_seed = battle_seed;
        self.action = action;
        self
    }

    fn context(&self) -> ModifierContext<'a> {
        ModifierContext::new(self.subject)
            .with_target(self.target)
            .with_item(self.item)
    }

    fn variance_seeds(&self) -> [u64; 2] {
        let subject = self.subject.id();
        [
            compute_seed(self.battle_seed, self.action, subject, 0),
            compute_seed(self.battle_seed, self.action, subject, 1),
        ]
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// Everything the resolver decided for one hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageModifiers {
    pub adaptive: ResolvedModifier<bool>,
    pub piercing: Piercing,
    pub guard_bypass: ResolvedModifier<bool>,
    pub variance: ResolvedModifier<VarianceMode>,
}

impl DamageModifiers {
    /// Neutral modifiers: the stock host formula.
    pub const STOCK: Self = Self {
        adaptive: ResolvedModifier::stock(false),
        piercing: Piercing::NONE,
        guard_bypass: ResolvedModifier::stock(false),
        variance: ResolvedModifier::stock(VarianceMode::Normal),
    };

    /// True when no modifier departs from the host's own rules.
    pub fn is_stock(&self) -> bool {
        !self.adaptive.value
            && !self.piercing.is_active()
            && !self.guard_bypass.value
            && self.variance.value == VarianceMode::Normal
    }
}

/// Resolves the attacker's and defender's chains into [`DamageModifiers`].
pub fn resolve_modifiers<D: DatabaseOracle + ?Sized>(
    database: &D,
    config: &EngineConfig,
    request: &DamageRequest<'_>,
) -> Result<DamageModifiers> {
    let attacker = Chain::of(database, request.subject)?;
    let defender = Chain::of(database, request.target)?;
    let context = request.context();
    let scope = || context.scope();
    let item = &request.item.source;

    Ok(DamageModifiers {
        adaptive: resolve_adaptive(item, &attacker, &defender, &scope)?,
        piercing: resolve_piercing(item, &attacker, &defender, &scope)?,
        guard_bypass: resolve_guard_bypass(item, &attacker),
        variance: resolve_variance(&attacker, config),
    })
}

// ============================================================================
// Stages
// ============================================================================

/// Per-stage trace of one damage computation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageBreakdown {
    pub modifiers: DamageModifiers,
    /// After base value and element rate.
    pub elemental: f64,
    /// After the damage rate stage.
    pub rated: f64,
    /// After recovery, critical and variance.
    pub varied: f64,
    /// After guard.
    pub guarded: f64,
    pub value: i64,
}

fn rate_stage(
    value: f64,
    hit_type: HitType,
    adaptive: bool,
    piercing: &Piercing,
    target: &Battler,
) -> f64 {
    let physical = || value * pierced_rate(target.pdr, piercing.physical.value);
    let magical = || value * pierced_rate(target.mdr, piercing.magical.value);
    if adaptive {
        return physical().max(magical());
    }
    match hit_type {
        HitType::Physical => physical(),
        HitType::Magical => magical(),
        HitType::Certain => value,
    }
}

/// Runs every damage stage.
///
/// # Formula
///
/// ```text
/// value = base * element_rate
/// value *= rate          physical: pdr, magical: mdr, certain: 1,
///                        adaptive: max over both axes; piercing scales
///                        the reduction 1 - rate by 1 - min(piercing, 1)
/// value *= rec           when base < 0
/// value *= critical      when critical
/// value = variance(value)
/// value /= 2 * grd       when value > 0, guarding and not bypassed
/// round half up
/// ```
///
/// With [`DamageModifiers::STOCK`] this is exactly the host's formula.
pub fn compute_damage<R: RngOracle + ?Sized>(
    config: &EngineConfig,
    request: &DamageRequest<'_>,
    modifiers: DamageModifiers,
    rng: &R,
) -> DamageBreakdown {
    let target = request.target;
    if modifiers.is_stock() {
        tracing::trace!("no damage modifiers apply; stock formula");
    }

    let elemental = request.base_value * request.element_rate;
    let rated = rate_stage(
        elemental,
        request.item.hit_type,
        modifiers.adaptive.value,
        &modifiers.piercing,
        target,
    );

    let mut value = rated;
    if request.base_value < 0.0 {
        value *= target.rec;
    }
    if request.critical {
        value *= config.critical_multiplier;
    }
    let varied = apply_variance(
        value,
        request.item.variance,
        modifiers.variance.value,
        rng,
        request.variance_seeds(),
    );

    let guarded = if varied > 0.0 && target.guarding && !modifiers.guard_bypass.value {
        varied / (2.0 * target.grd)
    } else {
        varied
    };

    let value = round_half_up(guarded) as i64;
    tracing::debug!("damage {} -> {value}", request.base_value);

    DamageBreakdown {
        modifiers,
        elemental,
        rated,
        varied,
        guarded,
        value,
    }
}
