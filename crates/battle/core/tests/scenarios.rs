use battle_core::env::{RngOracle, compute_seed};
use battle_core::formula::round_half_up;
use battle_core::{
    Battler, CombatRulesProvider, DamageRequest, DatabaseSnapshot, EngineConfig, HitType, PcgRng,
    Provenance, RuleEngine, SourceKind, SourceRef, SpeedRequest, Stats, UsableDefinition,
    VarianceMode,
};

fn database() -> DatabaseSnapshot {
    let mut db = DatabaseSnapshot::new();
    db.add(SourceKind::Actor, 1, "Harold", "").unwrap();
    db.add(SourceKind::Actor, 2, "Therese", "<ppiercingplus:0.1>\n<piercingplus:0.2>")
        .unwrap();
    db.add(SourceKind::Actor, 3, "Marsha", "<ppiercingmult:2>\n<piercingmult:1.5>")
        .unwrap();
    db.add(SourceKind::Class, 1, "Knight", "").unwrap();
    db.add(SourceKind::Enemy, 1, "Slime", "").unwrap();
    db.add(SourceKind::Enemy, 2, "Golem", "<nullpiercing>").unwrap();
    db.add(SourceKind::Enemy, 3, "Salamander", "<sealtag:fire>").unwrap();
    db.add(SourceKind::State, 10, "Fury", "<forcemaxvariance>").unwrap();
    db.add(SourceKind::State, 11, "Doubt", "<forceminvariance>").unwrap();
    db
}

fn engine() -> RuleEngine<DatabaseSnapshot> {
    RuleEngine::new(EngineConfig::default(), database()).unwrap()
}

fn physical(note: &str) -> UsableDefinition {
    UsableDefinition::skill(20, "Strike", note)
        .unwrap()
        .with_hit_type(HitType::Physical)
        .with_variance(0)
}

#[test]
fn piercing_scales_the_damage_reduction() {
    let engine = engine();
    let subject = Battler::actor(1, 1);
    let target = Battler::enemy(1).with_rates(0.8, 1.0);
    let skill = physical("<piercing:0.4>");

    let request = DamageRequest::new(&subject, &target, &skill, 100.0);
    let breakdown = engine.explain_damage(&request).unwrap();
    assert!((breakdown.rated - 88.0).abs() < 1e-9);
    assert_eq!(breakdown.value, 88);
}

#[test]
fn specific_and_combined_piercing_bonuses_stack() {
    let engine = engine();
    let subject = Battler::actor(2, 1);
    let target = Battler::enemy(1);
    let skill = physical("<piercing:0.1>");

    let request = DamageRequest::new(&subject, &target, &skill, 10.0);
    let piercing = engine.explain_damage(&request).unwrap().modifiers.piercing;
    assert!((piercing.physical.value - 0.4).abs() < 1e-9);
    assert!((piercing.magical.value - 0.3).abs() < 1e-9);
}

#[test]
fn specific_and_combined_piercing_factors_stack() {
    let engine = engine();
    let subject = Battler::actor(3, 1);
    let target = Battler::enemy(1);
    let skill = physical("<piercing:0.2>");

    let request = DamageRequest::new(&subject, &target, &skill, 10.0);
    let piercing = engine.explain_damage(&request).unwrap().modifiers.piercing;
    assert!((piercing.physical.value - 0.6).abs() < 1e-9);
    assert!((piercing.magical.value - 0.3).abs() < 1e-9);
}

#[test]
fn speed_program_adds_attack() {
    let engine = engine();
    let subject = Battler::actor(1, 1).with_stats(Stats {
        agi: 50,
        atk: 30,
        ..Stats::default()
    });
    let skill = UsableDefinition::skill(5, "Quick Jab", "<speed>speed += a.atk;</speed>").unwrap();
    let request = SpeedRequest::new(&subject).with_item(&skill);
    assert_eq!(engine.resolve_speed(&request).unwrap(), 80.0);
}

#[test]
fn tag_seal_ignores_the_exclusion_list() {
    let engine = engine();
    let subject = Battler::enemy(3);
    // Skill 1 is excluded by default, which only gates hit-type seals.
    let attack = UsableDefinition::skill(1, "Fire Attack", "<fire>")
        .unwrap()
        .with_hit_type(HitType::Physical);
    assert!(engine.is_sealed(&subject, &attack, false).unwrap());

    let resolved = engine.explain_seal(&subject, &attack, false).unwrap();
    assert_eq!(
        resolved.provenance,
        Provenance::Source(SourceRef::new(SourceKind::Enemy, 3))
    );
}

#[test]
fn null_piercing_applies_to_its_defender_only() {
    let engine = engine();
    let subject = Battler::actor(1, 1);
    let golem = Battler::enemy(2).with_rates(0.5, 1.0);
    let slime = Battler::enemy(1).with_rates(0.5, 1.0);
    let skill = physical("<piercing:1>");

    let against_golem = DamageRequest::new(&subject, &golem, &skill, 100.0);
    let against_slime = DamageRequest::new(&subject, &slime, &skill, 100.0);
    assert_eq!(engine.resolve_damage(&against_golem).unwrap(), 50);
    assert_eq!(engine.resolve_damage(&against_slime).unwrap(), 100);
}

#[test]
fn cancel_ruling_rolls_normal_variance() {
    let engine = engine();
    let conflicted = Battler::actor(1, 1).with_states([10, 11]);
    let calm = Battler::actor(1, 1);
    let target = Battler::enemy(1);
    let skill = physical("").with_variance(20);

    let conflicted_hit = DamageRequest::new(&conflicted, &target, &skill, 100.0).with_seed(7, 3);
    let calm_hit = DamageRequest::new(&calm, &target, &skill, 100.0).with_seed(7, 3);
    let breakdown = engine.explain_damage(&conflicted_hit).unwrap();
    assert_eq!(breakdown.modifiers.variance.value, VarianceMode::Normal);
    assert_eq!(breakdown.value, engine.resolve_damage(&calm_hit).unwrap());

    let forced = Battler::actor(1, 1).with_states([10]);
    let forced_hit = DamageRequest::new(&forced, &target, &skill, 100.0);
    assert_eq!(engine.resolve_damage(&forced_hit).unwrap(), 120);
}

#[test]
fn specific_piercing_axis_wins() {
    let engine = engine();
    let subject = Battler::actor(1, 1);
    let target = Battler::enemy(1);
    let skill = physical("<piercing:0.3>\n<ppiercing:0.6>");

    let request = DamageRequest::new(&subject, &target, &skill, 10.0);
    let piercing = engine.explain_damage(&request).unwrap().modifiers.piercing;
    assert_eq!(piercing.physical.value, 0.6);
    assert_eq!(piercing.magical.value, 0.3);
}

#[test]
fn untagged_notes_reproduce_the_host_formula() {
    let engine = engine();
    let subject = Battler::actor(1, 1);
    let target = Battler::enemy(1).with_rates(0.9, 1.0).guarding(2.0);
    let skill = physical("").with_variance(20);

    let request = DamageRequest::new(&subject, &target, &skill, 57.0)
        .with_element_rate(1.5)
        .with_critical(true)
        .with_seed(99, 4);
    let breakdown = engine.explain_damage(&request).unwrap();
    assert!(breakdown.modifiers.is_stock());

    // 57 * 1.5 * 0.9 * 3 = 230.85, amplitude floor(46.17) = 46.
    let rng = PcgRng;
    let r1 = rng.random_int(compute_seed(99, 4, 1, 0), 47);
    let r2 = rng.random_int(compute_seed(99, 4, 1, 1), 47);
    let varied = 230.85 + f64::from(r1) + f64::from(r2) - 46.0;
    let expected = round_half_up(varied / 4.0) as i64;
    assert_eq!(breakdown.value, expected);
}

#[test]
fn dangling_state_is_a_host_error() {
    let engine = engine();
    let subject = Battler::actor(1, 1).with_states([404]);
    let target = Battler::enemy(1);
    let skill = physical("");
    let err = engine
        .resolve_damage(&DamageRequest::new(&subject, &target, &skill, 1.0))
        .unwrap_err();
    assert_eq!(err.to_string(), "state #404 not found in database");
}
