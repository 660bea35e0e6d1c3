//! Variance forcing.

use super::{Chain, Provenance, ResolvedModifier};
use crate::config::{EngineConfig, ForceVarianceRuling, NoVarianceRuling};
use crate::env::RngOracle;

/// How the variance stage treats a damage value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum VarianceMode {
    /// Stock randomized spread.
    Normal,
    /// No spread at all.
    Unchanged,
    Minimum,
    Maximum,
}

/// Force tags collected over a subject's chain (boolean OR).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VarianceFlags {
    pub min: bool,
    pub max: bool,
    pub none: bool,
}

impl VarianceFlags {
    pub fn collect(chain: &Chain<'_>) -> Self {
        chain.iter().fold(Self::default(), |flags, source| Self {
            min: flags.min || source.flag("forceminvariance"),
            max: flags.max || source.flag("forcemaxvariance"),
            none: flags.none || source.flag("forcenovariance"),
        })
    }

    pub fn any(&self) -> bool {
        self.min || self.max || self.none
    }
}

/// Settles the force flags under the configured rulings.
///
/// Force-none is considered first. Conflicting min and max then follow
/// `force`: both flags cancel under [`ForceVarianceRuling::Cancel`], the
/// named side wins otherwise.
pub fn decide_variance(
    flags: VarianceFlags,
    force: ForceVarianceRuling,
    none: NoVarianceRuling,
) -> VarianceMode {
    let VarianceFlags {
        mut min,
        mut max,
        none: forced_none,
    } = flags;

    if forced_none {
        match none {
            NoVarianceRuling::NoOverride if !min && !max => return VarianceMode::Unchanged,
            NoVarianceRuling::NoOverride => {}
            NoVarianceRuling::OverrideBoth => return VarianceMode::Unchanged,
            NoVarianceRuling::OverrideMinOnly if !max => return VarianceMode::Unchanged,
            NoVarianceRuling::OverrideMinOnly => min = false,
            NoVarianceRuling::OverrideMaxOnly if !min => return VarianceMode::Unchanged,
            NoVarianceRuling::OverrideMaxOnly => max = false,
        }
    }

    match (min, max) {
        (false, false) => VarianceMode::Normal,
        (true, false) => VarianceMode::Minimum,
        (false, true) => VarianceMode::Maximum,
        (true, true) => {
            tracing::debug!("force-min and force-max both set; ruling {force}");
            match force {
                ForceVarianceRuling::Cancel => VarianceMode::Normal,
                ForceVarianceRuling::ForceMin => VarianceMode::Minimum,
                ForceVarianceRuling::ForceMax => VarianceMode::Maximum,
            }
        }
    }
}

pub fn resolve_variance(chain: &Chain<'_>, config: &EngineConfig) -> ResolvedModifier<VarianceMode> {
    let flags = VarianceFlags::collect(chain);
    let mode = decide_variance(
        flags,
        config.force_variance_ruling,
        config.no_variance_ruling,
    );
    let provenance = chain
        .any_flag(&["forceminvariance", "forcemaxvariance", "forcenovariance"])
        .map_or(Provenance::Default, |source| Provenance::Source(source.origin()));
    ResolvedModifier::new(mode, provenance)
}

/// Applies the variance stage to `value`.
///
/// The amplitude is `floor(|value| * variance / 100)`. Normal mode adds
/// `r1 + r2 - amp` with `r1, r2` in `[0, amp]`, drawn from `seeds`. The
/// offset is mirrored for negative values.
pub fn apply_variance<R: RngOracle + ?Sized>(
    value: f64,
    variance: u32,
    mode: VarianceMode,
    rng: &R,
    seeds: [u64; 2],
) -> f64 {
    let amp = (value.abs() * f64::from(variance) / 100.0).max(0.0).floor();
    let offset = match mode {
        VarianceMode::Unchanged => return value,
        VarianceMode::Minimum => -amp,
        VarianceMode::Maximum => amp,
        VarianceMode::Normal => {
            let bound = amp.min(f64::from(u32::MAX - 1)) as u32 + 1;
            let r1 = rng.random_int(seeds[0], bound);
            let r2 = rng.random_int(seeds[1], bound);
            f64::from(r1) + f64::from(r2) - amp
        }
    };
    if value >= 0.0 { value + offset } else { value - offset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;

    const BOTH: VarianceFlags = VarianceFlags {
        min: true,
        max: true,
        none: false,
    };

    #[test]
    fn conflicting_flags_follow_force_ruling() {
        let none = NoVarianceRuling::OverrideBoth;
        assert_eq!(
            decide_variance(BOTH, ForceVarianceRuling::Cancel, none),
            VarianceMode::Normal
        );
        assert_eq!(
            decide_variance(BOTH, ForceVarianceRuling::ForceMin, none),
            VarianceMode::Minimum
        );
        assert_eq!(
            decide_variance(BOTH, ForceVarianceRuling::ForceMax, none),
            VarianceMode::Maximum
        );
    }

    #[test]
    fn single_flag_forces_its_side() {
        let min = VarianceFlags {
            min: true,
            ..VarianceFlags::default()
        };
        for ruling in [
            ForceVarianceRuling::Cancel,
            ForceVarianceRuling::ForceMin,
            ForceVarianceRuling::ForceMax,
        ] {
            assert_eq!(
                decide_variance(min, ruling, NoVarianceRuling::OverrideBoth),
                VarianceMode::Minimum
            );
        }
    }

    #[test]
    fn no_variance_rulings() {
        let force = ForceVarianceRuling::Cancel;
        let none_and_max = VarianceFlags {
            max: true,
            none: true,
            ..VarianceFlags::default()
        };
        let only_none = VarianceFlags {
            none: true,
            ..VarianceFlags::default()
        };

        assert_eq!(
            decide_variance(only_none, force, NoVarianceRuling::NoOverride),
            VarianceMode::Unchanged
        );
        assert_eq!(
            decide_variance(none_and_max, force, NoVarianceRuling::NoOverride),
            VarianceMode::Maximum
        );
        assert_eq!(
            decide_variance(none_and_max, force, NoVarianceRuling::OverrideBoth),
            VarianceMode::Unchanged
        );
        assert_eq!(
            decide_variance(none_and_max, force, NoVarianceRuling::OverrideMinOnly),
            VarianceMode::Maximum
        );
        assert_eq!(
            decide_variance(none_and_max, force, NoVarianceRuling::OverrideMaxOnly),
            VarianceMode::Unchanged
        );

        let all = VarianceFlags {
            min: true,
            max: true,
            none: true,
        };
        assert_eq!(
            decide_variance(all, force, NoVarianceRuling::OverrideMinOnly),
            VarianceMode::Maximum
        );
        assert_eq!(
            decide_variance(all, force, NoVarianceRuling::OverrideMaxOnly),
            VarianceMode::Minimum
        );
    }

    #[test]
    fn forced_bounds_use_the_amplitude() {
        let rng = PcgRng;
        assert_eq!(apply_variance(100.0, 20, VarianceMode::Minimum, &rng, [0, 1]), 80.0);
        assert_eq!(apply_variance(100.0, 20, VarianceMode::Maximum, &rng, [0, 1]), 120.0);
        assert_eq!(apply_variance(-50.0, 20, VarianceMode::Maximum, &rng, [0, 1]), -60.0);
        assert_eq!(apply_variance(57.5, 20, VarianceMode::Unchanged, &rng, [0, 1]), 57.5);
    }

    #[test]
    fn normal_spread_stays_within_amplitude() {
        let rng = PcgRng;
        for seed in 0..100 {
            let value = apply_variance(100.0, 20, VarianceMode::Normal, &rng, [seed, seed + 1000]);
            assert!((80.0..=120.0).contains(&value), "{value}");
        }
        assert_eq!(apply_variance(3.0, 20, VarianceMode::Normal, &rng, [1, 2]), 3.0);
    }
}
