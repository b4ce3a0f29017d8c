use dailyread_core::render;
use serde_json::json;

use crate::context::{print_json, Context};

pub fn today(ctx: &Context, user_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ctx.engine()?;
    let user = engine.user(user_id)?;
    match engine.daily_card(&user)? {
        Some(card) => print_json(&json!({
            "position": user.pointer,
            "entry": card.entry,
            "stats": card.stats,
            "text": render::daily_card(&card),
        })),
        None => print_json(&json!({
            "position": user.pointer,
            "entry": null,
            "text": render::no_reading(),
        })),
    }
}

pub fn next(ctx: &Context, user_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ctx.engine()?;
    match engine.preview_next(user_id)? {
        Some(entry) => print_json(&json!({ "entry": entry, "text": render::entry_text(&entry) })),
        None => print_json(&json!({ "entry": null, "text": render::no_reading() })),
    }
}

pub fn stats(ctx: &Context, user_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ctx.engine()?;
    let stats = engine.stats(user_id)?;
    print_json(&json!({ "stats": stats, "text": render::stats(&stats) }))
}
