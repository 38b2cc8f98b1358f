//! Balance masking preference.

use fireside_core::Session;

use crate::cli::{BalanceArgs, BalanceCommand};
use crate::error::CliError;
use crate::output;

use super::Ctx;

pub fn handle(session: &Session, args: &BalanceArgs, ctx: &Ctx) -> Result<(), CliError> {
    match args.command {
        BalanceCommand::Toggle => {
            let visible = session.store().toggle_balance_visible();
            let message = if visible {
                "Balances shown"
            } else {
                "Balances hidden"
            };
            output::notice(message, ctx.quiet, ctx.color);
            Ok(())
        }
    }
}
