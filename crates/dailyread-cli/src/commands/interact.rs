use dailyread_core::{render, InteractionOutcome};
use serde_json::json;

use crate::context::{print_json, Context};

fn reply(outcome: &InteractionOutcome) -> Option<String> {
    match outcome {
        InteractionOutcome::Read { stats } => Some(render::celebration(stats.streak)),
        InteractionOutcome::Break { decision } => Some(render::break_decision(decision)),
        InteractionOutcome::Preview { entry: Some(entry) } => Some(render::entry_text(entry)),
        InteractionOutcome::Preview { entry: None } => Some(render::no_reading().to_string()),
        InteractionOutcome::Duplicate => None,
    }
}

pub fn run(
    ctx: &Context,
    user_id: i64,
    interaction_id: &str,
    payload: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ctx.engine()?;
    let outcome = engine.handle_interaction(interaction_id, user_id, payload)?;
    print_json(&json!({ "result": outcome, "reply": reply(&outcome) }))
}
