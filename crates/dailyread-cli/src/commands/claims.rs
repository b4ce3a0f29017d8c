use clap::Subcommand;
use serde_json::json;

use crate::context::{print_json, Context};

#[derive(Subcommand)]
pub enum ClaimsAction {
    /// Drop claimed interaction ids older than `interactions.retention_days`
    Prune,
}

pub fn run(ctx: &Context, action: ClaimsAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ctx.engine()?;
    match action {
        ClaimsAction::Prune => {
            let removed = engine.prune_claims()?;
            print_json(&json!({
                "removed": removed,
                "retention_days": ctx.config.interactions.retention_days,
            }))
        }
    }
}
