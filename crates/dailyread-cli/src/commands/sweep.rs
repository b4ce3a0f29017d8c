use clap::Subcommand;
use dailyread_core::{
    Clock, Config, HttpMessenger, LogMessenger, Messenger, ProgressEngine, Store, SweepReport,
    Sweeper,
};

use crate::context::{print_json, Context};

#[derive(Subcommand)]
pub enum SweepAction {
    /// Send the morning card to users inside their daily window
    Daily {
        /// Shared cron secret
        #[arg(long)]
        secret: Option<String>,
    },
    /// Nudge users inside their evening window who have not read today
    Nudge {
        #[arg(long)]
        secret: Option<String>,
    },
}

async fn sweep<S: Store, C: Clock, M: Messenger>(
    engine: &ProgressEngine<S, C>,
    messenger: &M,
    config: &Config,
    action: &SweepAction,
) -> dailyread_core::error::Result<SweepReport> {
    let sweeper = Sweeper::new(engine, messenger, config);
    match action {
        SweepAction::Daily { secret } => sweeper.daily(secret.as_deref()).await,
        SweepAction::Nudge { secret } => sweeper.nudge(secret.as_deref()).await,
    }
}

pub fn run(ctx: &Context, action: SweepAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ctx.engine()?;
    let runtime = tokio::runtime::Runtime::new()?;

    let report = match HttpMessenger::from_config(&ctx.config.delivery)? {
        Some(http) => runtime.block_on(sweep(&engine, &http, &ctx.config, &action))?,
        None => runtime.block_on(sweep(&engine, &LogMessenger, &ctx.config, &action))?,
    };
    print_json(&report)
}
