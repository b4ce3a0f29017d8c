use clap::Subcommand;

use crate::context::{print_json, Context};

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a user, or refresh an existing user's profile
    Register {
        user_id: i64,
        #[arg(long)]
        username: Option<String>,
        /// IANA timezone (e.g. "Europe/Berlin")
        #[arg(long)]
        tz: Option<String>,
    },
    /// Change a user's timezone
    SetTz {
        user_id: i64,
        tz: String,
    },
    /// Show a user
    Show {
        user_id: i64,
    },
    /// List all users
    List,
}

pub fn run(ctx: &Context, action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ctx.engine()?;
    match action {
        UserAction::Register {
            user_id,
            username,
            tz,
        } => print_json(&engine.register(user_id, username.as_deref(), tz.as_deref())?),
        UserAction::SetTz { user_id, tz } => print_json(&engine.set_timezone(user_id, &tz)?),
        UserAction::Show { user_id } => print_json(&engine.user(user_id)?),
        UserAction::List => print_json(&engine.users()?),
    }
}
