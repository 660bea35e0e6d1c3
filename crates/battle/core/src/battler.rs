//! Live combat participant snapshot.
//!
//! The host owns battler state; queries receive a read-only copy of the
//! values formulas and pipelines need.

use crate::formula::{EvalError, FormulaObject, Value, expect_args};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BattlerKind {
    Actor { actor_id: u32, class_id: u32 },
    Enemy { enemy_id: u32 },
}

/// Current parameter values, including equipment and state bonuses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Stats {
    pub mhp: i32,
    pub mmp: i32,
    pub atk: i32,
    pub def: i32,
    pub mat: i32,
    pub mdf: i32,
    pub agi: i32,
    pub luk: i32,
}

#[cfg(feature = "serde")]
fn unit_rate() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battler {
    pub kind: BattlerKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stats: Stats,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hp: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mp: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tp: i32,
    /// Physical damage rate.
    #[cfg_attr(feature = "serde", serde(default = "unit_rate"))]
    pub pdr: f64,
    /// Magical damage rate.
    #[cfg_attr(feature = "serde", serde(default = "unit_rate"))]
    pub mdr: f64,
    /// Guard effect rate.
    #[cfg_attr(feature = "serde", serde(default = "unit_rate"))]
    pub grd: f64,
    /// Recovery effect rate.
    #[cfg_attr(feature = "serde", serde(default = "unit_rate"))]
    pub rec: f64,
    /// Speed bonus of normal attacks.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack_speed: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub guarding: bool,
    /// Active state ids in the host's display order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub states: Vec<u32>,
}

impl Battler {
    fn with_kind(kind: BattlerKind) -> Self {
        Self {
            kind,
            level: 1,
            stats: Stats::default(),
            hp: 0,
            mp: 0,
            tp: 0,
            pdr: 1.0,
            mdr: 1.0,
            grd: 1.0,
            rec: 1.0,
            attack_speed: 0.0,
            guarding: false,
            states: Vec::new(),
        }
    }

    pub fn actor(actor_id: u32, class_id: u32) -> Self {
        Self::with_kind(BattlerKind::Actor { actor_id, class_id })
    }

    pub fn enemy(enemy_id: u32) -> Self {
        Self::with_kind(BattlerKind::Enemy { enemy_id })
    }

    /// Sets stats and fills HP/MP to their maximums.
    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self.hp = stats.mhp;
        self.mp = stats.mmp;
        self
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self
    }

    pub fn with_rates(mut self, pdr: f64, mdr: f64) -> Self {
        self.pdr = pdr;
        self.mdr = mdr;
        self
    }

    pub fn with_states(mut self, states: impl IntoIterator<Item = u32>) -> Self {
        self.states = states.into_iter().collect();
        self
    }

    pub fn guarding(mut self, grd: f64) -> Self {
        self.guarding = true;
        self.grd = grd;
        self
    }

    pub fn is_actor(&self) -> bool {
        matches!(self.kind, BattlerKind::Actor { .. })
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, BattlerKind::Enemy { .. })
    }

    /// Actor id or enemy id, depending on the kind.
    pub fn id(&self) -> u32 {
        match self.kind {
            BattlerKind::Actor { actor_id, .. } => actor_id,
            BattlerKind::Enemy { enemy_id } => enemy_id,
        }
    }

    pub fn is_state_affected(&self, state_id: u32) -> bool {
        self.states.contains(&state_id)
    }

    pub fn hp_rate(&self) -> f64 {
        ratio(self.hp, self.stats.mhp)
    }

    pub fn mp_rate(&self) -> f64 {
        ratio(self.mp, self.stats.mmp)
    }

    pub fn tp_rate(&self) -> f64 {
        f64::from(self.tp) / 100.0
    }
}

fn ratio(current: i32, max: i32) -> f64 {
    if max > 0 {
        f64::from(current) / f64::from(max)
    } else {
        0.0
    }
}

impl FormulaObject for Battler {
    fn type_name(&self) -> &'static str {
        if self.is_actor() { "actor" } else { "enemy" }
    }

    fn field(&self, name: &str) -> Option<Value> {
        let stats = &self.stats;
        let value = match name {
            "mhp" => Value::from(stats.mhp),
            "mmp" => Value::from(stats.mmp),
            "atk" => Value::from(stats.atk),
            "def" => Value::from(stats.def),
            "mat" => Value::from(stats.mat),
            "mdf" => Value::from(stats.mdf),
            "agi" => Value::from(stats.agi),
            "luk" => Value::from(stats.luk),
            "hp" => Value::from(self.hp),
            "mp" => Value::from(self.mp),
            "tp" => Value::from(self.tp),
            "pdr" => Value::from(self.pdr),
            "mdr" => Value::from(self.mdr),
            "grd" => Value::from(self.grd),
            "rec" => Value::from(self.rec),
            "level" => Value::from(self.level),
            "id" => Value::from(self.id()),
            _ => return None,
        };
        Some(value)
    }

    fn call(&self, method: &str, args: &[Value]) -> Result<Value, EvalError> {
        let nullary = |value: Value| expect_args(method, args, 0).map(|()| value);
        match method {
            "hpRate" => nullary(Value::from(self.hp_rate())),
            "mpRate" => nullary(Value::from(self.mp_rate())),
            "tpRate" => nullary(Value::from(self.tp_rate())),
            "isActor" => nullary(Value::from(self.is_actor())),
            "isEnemy" => nullary(Value::from(self.is_enemy())),
            "isGuard" => nullary(Value::from(self.guarding)),
            "isStateAffected" => {
                expect_args(method, args, 1)?;
                let state = args[0].as_number();
                Ok(Value::from(
                    self.states.iter().any(|&id| f64::from(id) == state),
                ))
            }
            _ => Err(EvalError::UnknownMethod {
                object: self.type_name().to_string(),
                method: method.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> Battler {
        Battler::actor(1, 2)
            .with_stats(Stats {
                mhp: 200,
                agi: 50,
                atk: 30,
                ..Stats::default()
            })
            .with_hp(50)
            .with_states([4])
    }

    #[test]
    fn rates() {
        let knight = knight();
        assert_eq!(knight.hp_rate(), 0.25);
        assert_eq!(knight.mp_rate(), 0.0);
    }

    #[test]
    fn formula_fields_and_methods() {
        let knight = knight();
        assert_eq!(knight.field("agi"), Some(Value::Number(50.0)));
        assert_eq!(knight.field("id"), Some(Value::Number(1.0)));
        assert_eq!(knight.field("str"), None);
        assert_eq!(
            knight.call("isStateAffected", &[Value::Number(4.0)]),
            Ok(Value::Bool(true))
        );
        assert_eq!(knight.call("isEnemy", &[]), Ok(Value::Bool(false)));
        assert!(matches!(
            knight.call("hpRate", &[Value::Number(1.0)]),
            Err(EvalError::ArgCount { .. })
        ));
    }
}
