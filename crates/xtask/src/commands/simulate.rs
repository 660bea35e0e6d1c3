//! Run engine queries described by a RON scenario file.
//!
//! ```text
//! (
//!     queries: [
//!         damage(
//!             subject: (kind: actor(actor_id: 1, class_id: 1), stats: (atk: 30)),
//!             target: (kind: enemy(enemy_id: 1)),
//!             usable: skill(3),
//!             base: 100.0,
//!         ),
//!         seal(subject: (kind: enemy(enemy_id: 4)), skill: 5),
//!     ],
//! )
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use battle_content::ContentFactory;
use battle_core::{
    Battler, DamageRequest, DatabaseOracle, DatabaseSnapshot, GoodsKind, RuleEngine,
    SpeedRequest, UsableDefinition,
};
use clap::Parser;
use console::style;
use serde::Deserialize;

use crate::utils;

/// Run queries from a RON scenario file
#[derive(Parser)]
pub struct Simulate {
    /// Scenario file
    #[arg(value_name = "FILE")]
    scenario: PathBuf,

    /// Data directory (defaults to the bundled sample data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    queries: Vec<Query>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum UsableRef {
    Skill(u32),
    Item(u32),
}

fn unit_rate() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Query {
    Damage {
        subject: Battler,
        target: Battler,
        usable: UsableRef,
        base: f64,
        #[serde(default = "unit_rate")]
        element_rate: f64,
        #[serde(default)]
        critical: bool,
        #[serde(default)]
        seed: u64,
        #[serde(default)]
        action: u64,
    },
    Speed {
        subject: Battler,
        #[serde(default)]
        usable: Option<UsableRef>,
        #[serde(default)]
        attack: bool,
    },
    Seal {
        subject: Battler,
        skill: u32,
        #[serde(default)]
        host_sealed: bool,
    },
    Carry {
        item: u32,
        #[serde(default)]
        current: Option<u32>,
        #[serde(default)]
        gain: i64,
    },
    Grade {
        kind: GoodsKind,
        id: u32,
        #[serde(default)]
        equipped: bool,
    },
}

fn usable(db: &DatabaseSnapshot, usable: UsableRef) -> Result<&UsableDefinition> {
    match usable {
        UsableRef::Skill(id) => db.skill(id).ok_or_else(|| anyhow!("skill #{id} not found")),
        UsableRef::Item(id) => db.item(id).ok_or_else(|| anyhow!("item #{id} not found")),
    }
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let data_dir = utils::data_dir(self.data_dir)?;
        let engine = ContentFactory::new(&data_dir).load_engine()?;

        let content = std::fs::read_to_string(&self.scenario)
            .with_context(|| format!("Failed to read scenario: {}", self.scenario.display()))?;
        let scenario: Scenario = ron::from_str(&content)
            .with_context(|| format!("Failed to parse scenario: {}", self.scenario.display()))?;

        println!(
            "{} {}",
            style("Scenario:").bold().cyan(),
            self.scenario.display()
        );
        println!();

        for (index, query) in scenario.queries.iter().enumerate() {
            run_query(&engine, index + 1, query)?;
        }
        Ok(())
    }
}

fn run_query(engine: &RuleEngine<DatabaseSnapshot>, index: usize, query: &Query) -> Result<()> {
    let db = engine.database();
    let header = style(format!("[{index}]")).bold().yellow();

    match query {
        Query::Damage {
            subject,
            target,
            usable: used,
            base,
            element_rate,
            critical,
            seed,
            action,
        } => {
            let item = usable(db, *used)?;
            let request = DamageRequest::new(subject, target, item, *base)
                .with_element_rate(*element_rate)
                .with_critical(*critical)
                .with_seed(*seed, *action);
            let breakdown = engine.explain_damage(&request)?;
            let modifiers = breakdown.modifiers;
            println!(
                "{header} damage of {}: {}",
                item.name(),
                style(breakdown.value).bold().green()
            );
            println!("  adaptive: {}", modifiers.adaptive);
            println!(
                "  piercing: physical {}, magical {}",
                modifiers.piercing.physical, modifiers.piercing.magical
            );
            println!("  guard bypass: {}", modifiers.guard_bypass);
            println!("  variance: {}", modifiers.variance);
            println!(
                "  stages: {} -> {} -> {} -> {}",
                breakdown.elemental, breakdown.rated, breakdown.varied, breakdown.guarded
            );
        }
        Query::Speed {
            subject,
            usable: used,
            attack,
        } => {
            let mut request = SpeedRequest::new(subject);
            if let Some(used) = used {
                request = request.with_item(usable(db, *used)?);
            }
            if *attack {
                request = request.attack();
            }
            let speed = engine.explain_speed(&request)?;
            println!("{header} speed: {}", style(speed).bold().green());
        }
        Query::Seal {
            subject,
            skill,
            host_sealed,
        } => {
            let skill = usable(db, UsableRef::Skill(*skill))?;
            let sealed = engine.explain_seal(subject, skill, *host_sealed)?;
            println!(
                "{header} {} sealed: {}",
                skill.name(),
                style(sealed).bold().green()
            );
        }
        Query::Carry { item, current, gain } => {
            let goods = db
                .goods(GoodsKind::Item, *item)
                .ok_or_else(|| anyhow!("item #{item} not found"))?;
            let max = engine.explain_max_carry(goods)?;
            println!(
                "{header} {} carry cap: {}",
                goods.source.name(),
                style(max).bold().green()
            );
            if let Some(current) = current {
                let after = battle_core::resolve::gain_quantity(*current, *gain, max.value);
                println!("  {current} {gain:+} -> {after}");
            }
        }
        Query::Grade { kind, id, equipped } => {
            let goods = db
                .goods(*kind, *id)
                .ok_or_else(|| anyhow!("{kind} #{id} not found"))?;
            let grade =
                battle_core::resolve::equip_performance(engine.config(), goods, *equipped)?;
            println!(
                "{header} {} performance: {}",
                goods.source.name(),
                style(grade).bold().green()
            );
        }
    }
    Ok(())
}
