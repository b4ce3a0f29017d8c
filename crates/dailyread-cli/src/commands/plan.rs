use std::path::PathBuf;

use clap::Subcommand;
use dailyread_core::{render, PlanEntry, Position, Store};
use serde_json::json;

use crate::context::{print_json, Context};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Upsert plan entries from a JSON array file
    Load {
        file: PathBuf,
    },
    /// Show the entry at a position
    Show {
        month: u32,
        day: u32,
    },
}

pub fn run(ctx: &Context, action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ctx.engine()?;
    match action {
        PlanAction::Load { file } => {
            let content = std::fs::read_to_string(&file)?;
            let entries: Vec<PlanEntry> = serde_json::from_str(&content)?;
            let loaded = engine.load_plan(&entries)?;
            let total = engine.store().plan_len()?;
            print_json(&json!({ "loaded": loaded, "total": total }))
        }
        PlanAction::Show { month, day } => {
            let position = engine.bounds().check(Position::new(month, day))?;
            match engine.store().plan_entry(position)? {
                Some(entry) => print_json(&json!({ "entry": entry, "text": render::entry_text(&entry) })),
                None => Err(format!("no plan entry at {position}").into()),
            }
        }
    }
}
