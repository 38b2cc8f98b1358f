//! Command dispatch: bridges CLI args -> session calls -> output formatting.

pub mod accounts;
pub mod balance;
pub mod bills;
pub mod budgets;
pub mod dashboard;
pub mod lifecycle;
pub mod pending;
pub mod piggy_banks;
pub mod transactions;
pub mod util;

use fireside_config::Config;
use fireside_core::Session;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Settings resolved from global flags and the config file.
pub struct Ctx {
    pub config: Config,
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub offline: bool,
}

impl Ctx {
    pub fn new(config: Config, global: &GlobalOpts) -> Self {
        let format = global.output.unwrap_or(if config.output == "json" {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        });
        Self {
            format,
            color: output::should_color(global.color),
            quiet: global.quiet,
            offline: global.offline,
            config,
        }
    }
}

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, ctx: &Ctx) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => lifecycle::login(session, args, ctx).await,
        Command::Logout => lifecycle::logout(session, ctx),
        Command::Status => lifecycle::status(session, ctx),
        Command::Sync => lifecycle::sync(session, ctx).await,
        Command::Accounts(args) => accounts::handle(session, args, ctx).await,
        Command::Transactions(args) => transactions::handle(session, args, ctx).await,
        Command::Budgets(args) => budgets::handle(session, &args, ctx).await,
        Command::Bills(args) => bills::handle(session, &args, ctx).await,
        Command::PiggyBanks => piggy_banks::handle(session, ctx).await,
        Command::Pending(args) => pending::handle(session, args, ctx),
        Command::Dashboard(args) => dashboard::handle(session, args, ctx),
        Command::Balance(args) => balance::handle(session, &args, ctx),
        // Completions is handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}
