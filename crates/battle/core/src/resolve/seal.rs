//! Skill seal and unseal.
//!
//! A skill is sealed by `<sealed>` on itself, by a host seal trait, or by
//! any source on the user's chain:
//!
//! - `<sealp>` / `<sealm>` / `<sealc>` seal by hit type, except for skills in
//!   the exclusion list
//! - `<sealtag:a,b>` seals skills carrying any listed tag
//! - `<sealeval>` seals when truthy; skipped for excluded skills when
//!   `exclude_from_eval` is set
//!
//! Unsealing wins over sealing: `<nullseal>` on the skill or the chain,
//! `<unsealp/m/c>`, `<unseal:ids>`, `<unsealtype:stypes>`,
//! `<unsealtag:a,b>` and `<unsealeval>`.

use super::{Chain, Provenance, ResolvedModifier};
use crate::battler::Battler;
use crate::config::EngineConfig;
use crate::data::{HitType, RuleSource, UsableDefinition};
use crate::error::Result;
use crate::formula::{IdList, Scope};

fn hit_type_tag(prefix: &str, hit_type: HitType) -> String {
    let suffix = match hit_type {
        HitType::Physical => 'p',
        HitType::Magical => 'm',
        HitType::Certain => 'c',
    };
    format!("{prefix}{suffix}")
}

fn tag_listed(source: &RuleSource, list: &str, skill: &UsableDefinition) -> bool {
    source
        .list(list)
        .iter()
        .any(|tag| skill.source.has(&tag.to_lowercase()))
}

fn id_listed(source: &RuleSource, list: &str, id: u32) -> bool {
    source.ids(list).is_some_and(|ids| ids.contains(&id))
}

fn evaluates_truthy<'s>(
    source: &RuleSource,
    tag: &str,
    scope: &dyn Fn() -> Scope<'s>,
) -> Result<bool> {
    if source.formula(tag).is_none() {
        return Ok(false);
    }
    Ok(source
        .evaluate(tag, &mut scope())?
        .is_some_and(|value| value.is_truthy()))
}

fn seals<'s>(
    config: &EngineConfig,
    source: &RuleSource,
    skill: &UsableDefinition,
    scope: &dyn Fn() -> Scope<'s>,
) -> Result<bool> {
    let excluded = config.is_excluded(skill.id);
    if !excluded && source.flag(&hit_type_tag("seal", skill.hit_type)) {
        return Ok(true);
    }
    if tag_listed(source, "sealtag", skill) {
        return Ok(true);
    }
    if excluded && config.exclude_from_eval {
        return Ok(false);
    }
    evaluates_truthy(source, "sealeval", scope)
}

fn unseals<'s>(
    source: &RuleSource,
    skill: &UsableDefinition,
    scope: &dyn Fn() -> Scope<'s>,
) -> Result<bool> {
    Ok(source.flag("nullseal")
        || source.flag(&hit_type_tag("unseal", skill.hit_type))
        || id_listed(source, "unseal", skill.id)
        || id_listed(source, "unsealtype", skill.stype_id)
        || tag_listed(source, "unsealtag", skill)
        || evaluates_truthy(source, "unsealeval", scope)?)
}

/// Resolves whether `skill` is sealed for `subject`.
///
/// `host_sealed` reports the host's own seal-skill and seal-skill-type
/// traits; unseal tags lift those too. Formulas bind `skill`, `a` and
/// `excludelist`.
pub fn resolve_seal(
    config: &EngineConfig,
    chain: &Chain<'_>,
    subject: &Battler,
    skill: &UsableDefinition,
    host_sealed: bool,
) -> Result<ResolvedModifier<bool>> {
    let excludelist = IdList(&config.excluded_skill_ids);
    let scope = || {
        Scope::new()
            .with_object("skill", skill)
            .with_object("a", subject)
            .with_object("excludelist", &excludelist)
    };

    let mut sealed = ResolvedModifier::stock(false);
    if skill.source.flag("sealed") {
        sealed.set_by(true, skill.source.origin());
    } else if host_sealed {
        sealed = ResolvedModifier::new(true, Provenance::Host);
    }
    for source in chain.iter() {
        if sealed.value {
            break;
        }
        if seals(config, source, skill, &scope)? {
            sealed.set_by(true, source.origin());
        }
    }

    if !sealed.value {
        return Ok(sealed);
    }

    let lifted_by = if skill.source.flag("nullseal") {
        Some(skill.source.origin())
    } else {
        let mut found = None;
        for source in chain.iter() {
            if unseals(source, skill, &scope)? {
                found = Some(source.origin());
                break;
            }
        }
        found
    };

    match lifted_by {
        Some(origin) => {
            tracing::debug!(
                "skill {} sealed by {} and unsealed by {origin}",
                skill.id,
                sealed.provenance
            );
            Ok(ResolvedModifier::new(false, Provenance::Nulled(origin)))
        }
        None => {
            tracing::debug!("skill {} sealed by {}", skill.id, sealed.provenance);
            Ok(sealed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SourceKind, SourceRef};

    fn source(kind: SourceKind, id: u32, note: &str) -> RuleSource {
        RuleSource::new(SourceRef::new(kind, id), "", note).unwrap()
    }

    fn skill(id: u32, note: &str) -> UsableDefinition {
        UsableDefinition::skill(id, "", note)
            .unwrap()
            .with_hit_type(HitType::Physical)
            .with_stype(1)
    }

    fn sealed(chain: &[&RuleSource], skill: &UsableDefinition) -> bool {
        let config = EngineConfig::default();
        let subject = Battler::enemy(1);
        let chain = Chain::from_sources(chain.to_vec());
        resolve_seal(&config, &chain, &subject, skill, false)
            .unwrap()
            .value
    }

    #[test]
    fn hit_type_seal_respects_exclusion() {
        let enemy = source(SourceKind::Enemy, 1, "<sealp>");
        assert!(sealed(&[&enemy], &skill(10, "")));
        assert!(!sealed(&[&enemy], &skill(1, "")));
        let magic = skill(10, "").with_hit_type(HitType::Magical);
        assert!(!sealed(&[&enemy], &magic));
    }

    #[test]
    fn tag_seal_ignores_exclusion() {
        let state = source(SourceKind::State, 4, "<sealtag: Fire,ice>");
        assert!(sealed(&[&state], &skill(1, "<fire>")));
        assert!(sealed(&[&state], &skill(12, "<ice>")));
        assert!(!sealed(&[&state], &skill(12, "<wind>")));
    }

    #[test]
    fn seal_eval_binds_skill_subject_and_list() {
        let state = source(
            SourceKind::State,
            4,
            "<sealeval>\nskill.stypeId == 1 && !a.isActor()\n</sealeval>",
        );
        assert!(sealed(&[&state], &skill(12, "")));
        // Excluded skills skip the formula entirely.
        assert!(!sealed(&[&state], &skill(2, "")));
    }

    #[test]
    fn seal_eval_can_read_the_exclusion_list() {
        let state = source(
            SourceKind::State,
            4,
            "<sealeval>\n!excludelist.includes(skill.id)\n</sealeval>",
        );
        let config = EngineConfig {
            exclude_from_eval: false,
            ..EngineConfig::default()
        };
        let chain = Chain::from_sources(vec![&state]);
        let subject = Battler::actor(1, 1);
        let sealed_for = |id| {
            resolve_seal(&config, &chain, &subject, &skill(id, ""), false)
                .unwrap()
                .value
        };
        assert!(sealed_for(7));
        assert!(!sealed_for(1));
    }

    #[test]
    fn unseal_beats_seal() {
        let enemy = source(SourceKind::Enemy, 1, "<sealp>");
        let state = source(SourceKind::State, 2, "<unseal:3, 10>");
        assert!(!sealed(&[&enemy, &state], &skill(10, "")));
        assert!(sealed(&[&enemy, &state], &skill(11, "")));

        let by_type = source(SourceKind::State, 3, "<unsealtype:1>");
        assert!(!sealed(&[&enemy, &by_type], &skill(11, "")));

        let by_tag = source(SourceKind::State, 5, "<unsealtag:holy>");
        assert!(!sealed(&[&enemy, &by_tag], &skill(11, "<holy>")));
    }

    #[test]
    fn skill_level_tags() {
        assert!(sealed(&[], &skill(5, "<sealed>")));
        assert!(!sealed(&[], &skill(5, "<sealed>\n<nullseal>")));
    }

    #[test]
    fn host_seal_can_be_lifted() {
        let config = EngineConfig::default();
        let subject = Battler::enemy(1);
        let none = Chain::default();
        let resolved = resolve_seal(&config, &none, &subject, &skill(5, ""), true).unwrap();
        assert_eq!(resolved, ResolvedModifier::new(true, Provenance::Host));

        let state = source(SourceKind::State, 2, "<nullseal>");
        let chain = Chain::from_sources(vec![&state]);
        let resolved = resolve_seal(&config, &chain, &subject, &skill(5, ""), true).unwrap();
        assert!(!resolved.value);
    }

    #[test]
    fn unseal_type_matches_skill_type() {
        let enemy = source(SourceKind::Enemy, 1, "<sealp>");
        let state = source(SourceKind::State, 2, "<unsealtype:1>");
        assert!(!sealed(&[&enemy, &state], &skill(9, "")));
        assert!(sealed(&[&enemy, &state], &skill(9, "").with_stype(4)));
    }
}
