//! Budget listing with spending for the period.

use tabled::Tabled;

use fireside_api::models::Budget;
use fireside_api::resources::budgets;
use fireside_core::Session;

use crate::cli::PeriodArgs;
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Auto budget")]
    auto_budget: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

impl BudgetRow {
    fn new(b: &Budget, amounts_visible: bool) -> Self {
        let attrs = &b.attributes;
        let spent = if attrs.spent.is_empty() {
            output::money(Some("0"), None, amounts_visible)
        } else {
            attrs
                .spent
                .iter()
                .map(|s| output::money(Some(&s.sum), s.currency_symbol.as_deref(), amounts_visible))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let auto_budget = match (&attrs.auto_budget_amount, &attrs.auto_budget_period) {
            (Some(amount), Some(period)) => format!(
                "{} / {period}",
                output::money(Some(amount), None, amounts_visible)
            ),
            _ => "-".into(),
        };
        Self {
            id: b.id.clone(),
            name: attrs.name.clone(),
            spent,
            auto_budget,
            active: if attrs.active { "yes" } else { "no" },
        }
    }
}

pub async fn handle(session: &Session, args: &PeriodArgs, ctx: &Ctx) -> Result<(), CliError> {
    util::require_online(ctx, "budgets")?;
    let range = util::period(args)?;
    util::restore_credentials(session)?;

    let client = session.client()?;
    let budgets = budgets::get_all_budgets(&client, &range).await?.data;

    let visible = session.store().balance_visible();
    let out = output::render_list(ctx.format, &budgets, |b| BudgetRow::new(b, visible))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
