//! Action speed.

use crate::battler::Battler;
use crate::data::UsableDefinition;
use crate::error::{EngineError, Result};
use crate::formula::{Formula, Scope, Value};
use crate::resolve::{Provenance, ResolvedModifier};

/// Tag holding the per-item speed program.
const SPEED_TAG: &str = "speed";

#[derive(Clone, Copy, Debug)]
pub struct SpeedRequest<'a> {
    pub subject: &'a Battler,
    pub item: Option<&'a UsableDefinition>,
    /// Normal attacks add the subject's attack speed.
    pub is_attack: bool,
}

impl<'a> SpeedRequest<'a> {
    pub fn new(subject: &'a Battler) -> Self {
        Self {
            subject,
            item: None,
            is_attack: false,
        }
    }

    pub fn with_item(mut self, item: &'a UsableDefinition) -> Self {
        self.item = Some(item);
        self
    }

    pub fn attack(mut self) -> Self {
        self.is_attack = true;
        self
    }
}

/// Speed of one action.
///
/// `base_speed(agi, a) + item.speed + attack_speed`, then the item's
/// `<speed>` program runs with locals `speed` and `agi` and objects `a` and
/// `item`. The final `speed` local is the result.
pub fn compute_speed(
    base_speed: &Formula,
    request: &SpeedRequest<'_>,
) -> Result<ResolvedModifier<f64>> {
    let subject = request.subject;
    let agi = Value::from(subject.stats.agi);

    let mut base_scope = Scope::new().with_object("a", subject).with_local("agi", agi);
    let mut speed = base_speed
        .evaluate(&mut base_scope)
        .map_err(|error| {
            EngineError::InvalidConfig(format!(
                "base_speed `{}` failed: {error}",
                base_speed.source().trim()
            ))
        })?
        .as_number();

    if let Some(item) = request.item {
        speed += f64::from(item.speed);
    }
    if request.is_attack {
        speed += subject.attack_speed;
    }

    let Some(item) = request.item.filter(|item| item.source.formula(SPEED_TAG).is_some()) else {
        return Ok(ResolvedModifier::stock(speed));
    };

    let mut scope = Scope::new()
        .with_object("a", subject)
        .with_object("item", item)
        .with_local("speed", speed)
        .with_local("agi", agi);
    item.source.evaluate(SPEED_TAG, &mut scope)?;
    let speed = scope.local("speed").map_or(speed, |value| value.as_number());

    tracing::debug!("speed of {} = {speed}", item.source.origin());
    Ok(ResolvedModifier::new(speed, Provenance::Source(item.source.origin())))
}
