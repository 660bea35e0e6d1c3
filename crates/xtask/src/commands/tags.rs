//! Dump the TagSet of one source, or of a raw note, as JSON.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use battle_content::ContentFactory;
use battle_core::{DatabaseOracle, SourceKind, SourceRef, TagSet};
use clap::Parser;

use crate::utils;

/// Dump the parsed tags of one source as JSON
#[derive(Parser)]
pub struct Tags {
    /// Source table (actor, class, enemy, state, skill, item, weapon, armor)
    #[arg(value_name = "KIND", required_unless_present = "note")]
    kind: Option<SourceKind>,

    /// Source id
    #[arg(value_name = "ID", required_unless_present = "note")]
    id: Option<u32>,

    /// Parse this note text instead of looking up a source
    #[arg(long, value_name = "TEXT", conflicts_with_all = ["kind", "id"])]
    note: Option<String>,

    /// Data directory (defaults to the bundled sample data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl Tags {
    pub fn execute(self) -> Result<()> {
        let tags = match (self.note, self.kind, self.id) {
            (Some(note), _, _) => TagSet::from_note(&note),
            (None, Some(kind), Some(id)) => {
                let data_dir = utils::data_dir(self.data_dir)?;
                let db = ContentFactory::new(data_dir).load_database()?;
                let origin = SourceRef::new(kind, id);
                db.source(origin)
                    .ok_or_else(|| anyhow!("{} not found", origin))?
                    .tags()
                    .clone()
            }
            _ => return Err(anyhow!("either KIND ID or --note is required")),
        };

        println!("{}", serde_json::to_string_pretty(&tags)?);
        Ok(())
    }
}
