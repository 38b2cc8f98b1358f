//! Piggy bank listing.

use tabled::Tabled;

use fireside_api::models::PiggyBank;
use fireside_api::resources::piggy_banks;
use fireside_core::Session;

use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

#[derive(Tabled)]
struct PiggyBankRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Target date")]
    target_date: String,
}

impl PiggyBankRow {
    fn new(p: &PiggyBank, amounts_visible: bool) -> Self {
        let attrs = &p.attributes;
        let symbol = attrs.currency_symbol.as_deref();
        Self {
            id: p.id.clone(),
            name: attrs.name.clone(),
            saved: output::money(attrs.current_amount.as_deref(), symbol, amounts_visible),
            target: output::money(attrs.target_amount.as_deref(), symbol, amounts_visible),
            progress: attrs
                .percentage
                .map_or_else(|| "-".into(), |pct| format!("{pct:.0}%")),
            target_date: attrs
                .target_date
                .map_or_else(|| "-".into(), |d| d.to_string()),
        }
    }
}

pub async fn handle(session: &Session, ctx: &Ctx) -> Result<(), CliError> {
    util::require_online(ctx, "piggy-banks")?;
    util::restore_credentials(session)?;

    let client = session.client()?;
    let banks = piggy_banks::get_all_piggy_banks(&client).await?.data;

    let visible = session.store().balance_visible();
    let out = output::render_list(ctx.format, &banks, |p| PiggyBankRow::new(p, visible))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
