//! Load a data directory and report what it contains.
//!
//! Loading compiles every formula tag, so a clean run means every note in
//! the directory is usable by the engine.

use std::path::PathBuf;

use anyhow::Result;
use battle_content::ContentFactory;
use clap::Parser;
use console::style;

use crate::utils;

/// Load and validate a data directory
#[derive(Parser)]
pub struct Check {
    /// Data directory (defaults to the bundled sample data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// List every source that carries formula tags
    #[arg(short, long)]
    verbose: bool,
}

impl Check {
    pub fn execute(self) -> Result<()> {
        let data_dir = utils::data_dir(self.data_dir)?;
        let engine = ContentFactory::new(&data_dir).load_engine()?;
        let db = engine.database();

        println!("{} {}", style("Data:").bold().cyan(), data_dir.display());
        println!();

        println!("{}", style("Tables:").bold().yellow());
        for (kind, count) in db.counts() {
            println!("  {:<8} {}", kind.as_ref(), count);
        }
        println!();

        let mut tagged = 0;
        let mut formulas = 0;
        for source in db.sources() {
            let compiled: Vec<&str> = battle_core::tags::FORMULA_TAGS
                .iter()
                .copied()
                .filter(|tag| source.formula(tag).is_some())
                .collect();
            if !source.tags().is_empty() {
                tagged += 1;
            }
            formulas += compiled.len();
            if self.verbose && !compiled.is_empty() {
                println!(
                    "  {} {:?}: {}",
                    style(source.origin()).green(),
                    source.name(),
                    compiled.join(", ")
                );
            }
        }

        let config = engine.config();
        println!("{}", style("Summary:").bold().yellow());
        println!("  Tagged sources: {}", tagged);
        println!("  Compiled formulas: {}", formulas);
        println!("  Force variance ruling: {}", config.force_variance_ruling);
        println!("  No variance ruling: {}", config.no_variance_ruling);
        println!();
        println!("{}", style("OK").bold().green());

        Ok(())
    }
}
