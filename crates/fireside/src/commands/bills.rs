//! Bill listing.

use tabled::Tabled;

use fireside_api::models::Bill;
use fireside_api::resources::bills;
use fireside_core::Session;

use crate::cli::PeriodArgs;
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

#[derive(Tabled)]
struct BillRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Repeats")]
    repeat_freq: String,
    #[tabled(rename = "Next due")]
    next_due: String,
    #[tabled(rename = "Paid")]
    paid: String,
}

impl BillRow {
    fn new(b: &Bill, amounts_visible: bool) -> Self {
        let attrs = &b.attributes;
        let symbol = attrs.currency_symbol.as_deref();
        let amount = if attrs.amount_min == attrs.amount_max {
            output::money(Some(&attrs.amount_min), symbol, amounts_visible)
        } else {
            format!(
                "{} - {}",
                output::money(Some(&attrs.amount_min), symbol, amounts_visible),
                output::money(Some(&attrs.amount_max), None, amounts_visible)
            )
        };
        Self {
            id: b.id.clone(),
            name: attrs.name.clone(),
            amount,
            repeat_freq: attrs.repeat_freq.clone(),
            next_due: attrs
                .next_expected_match
                .or_else(|| attrs.pay_dates.first().copied())
                .map_or_else(|| "-".into(), |d| d.format("%Y-%m-%d").to_string()),
            paid: attrs.paid_dates.len().to_string(),
        }
    }
}

pub async fn handle(session: &Session, args: &PeriodArgs, ctx: &Ctx) -> Result<(), CliError> {
    util::require_online(ctx, "bills")?;
    let range = util::period(args)?;
    util::restore_credentials(session)?;

    let client = session.client()?;
    let bills = bills::get_all_bills(&client, &range).await?.data;

    let visible = session.store().balance_visible();
    let out = output::render_list(ctx.format, &bills, |b| BillRow::new(b, visible))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
