use std::collections::BTreeSet;

/// Outcome when a subject carries both force-min and force-max variance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum ForceVarianceRuling {
    /// The flags cancel out and normal variance is rolled.
    #[default]
    Cancel,
    ForceMin,
    ForceMax,
}

/// How force-none interacts with force-min / force-max.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum NoVarianceRuling {
    /// Force-none only applies when neither min nor max is forced.
    NoOverride,
    /// Force-none always wins.
    #[default]
    OverrideBoth,
    /// Force-none cancels force-min; force-max still applies.
    OverrideMinOnly,
    /// Force-none cancels force-max; force-min still applies.
    OverrideMaxOnly,
}

/// Grade of equipment without a `<grade>` tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum UngradedPolicy {
    #[default]
    UseDefault,
    UseStatTotal,
    UsePrice,
}

/// Engine configuration. Built once and never mutated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub force_variance_ruling: ForceVarianceRuling,
    pub no_variance_ruling: NoVarianceRuling,
    /// Skills exempt from type seals (and from `<sealeval>` when
    /// `exclude_from_eval` is set).
    pub excluded_skill_ids: BTreeSet<u32>,
    pub exclude_from_eval: bool,
    pub default_ungraded_policy: UngradedPolicy,
    pub default_grade: f64,
    /// Base action speed formula; binds `agi` and `a`.
    pub base_speed: String,
    /// Carry cap formula used when an item has no cap tag.
    pub default_max_items: String,
    /// Host stock carry cap, used when `default_max_items` yields nothing.
    pub host_max_items: u32,
    pub critical_multiplier: f64,
}

impl EngineConfig {
    pub const DEFAULT_EXCLUDED_SKILLS: [u32; 2] = [1, 2];
    pub const DEFAULT_BASE_SPEED: &'static str = "agi";
    pub const DEFAULT_MAX_ITEMS: &'static str = "99";
    pub const HOST_MAX_ITEMS: u32 = 99;
    pub const CRITICAL_MULTIPLIER: f64 = 3.0;

    pub fn new() -> Self {
        Self {
            force_variance_ruling: ForceVarianceRuling::default(),
            no_variance_ruling: NoVarianceRuling::default(),
            excluded_skill_ids: Self::DEFAULT_EXCLUDED_SKILLS.into_iter().collect(),
            exclude_from_eval: true,
            default_ungraded_policy: UngradedPolicy::default(),
            default_grade: 0.0,
            base_speed: Self::DEFAULT_BASE_SPEED.to_string(),
            default_max_items: Self::DEFAULT_MAX_ITEMS.to_string(),
            host_max_items: Self::HOST_MAX_ITEMS,
            critical_multiplier: Self::CRITICAL_MULTIPLIER,
        }
    }

    pub fn with_force_variance_ruling(mut self, ruling: ForceVarianceRuling) -> Self {
        self.force_variance_ruling = ruling;
        self
    }

    pub fn with_no_variance_ruling(mut self, ruling: NoVarianceRuling) -> Self {
        self.no_variance_ruling = ruling;
        self
    }

    pub fn with_excluded_skills(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.excluded_skill_ids = ids.into_iter().collect();
        self
    }

    pub fn with_ungraded_policy(mut self, policy: UngradedPolicy) -> Self {
        self.default_ungraded_policy = policy;
        self
    }

    pub fn with_base_speed(mut self, formula: impl Into<String>) -> Self {
        self.base_speed = formula.into();
        self
    }

    pub fn with_default_max_items(mut self, formula: impl Into<String>) -> Self {
        self.default_max_items = formula.into();
        self
    }

    pub fn is_excluded(&self, skill_id: u32) -> bool {
        self.excluded_skill_ids.contains(&skill_id)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
