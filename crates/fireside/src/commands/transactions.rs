//! Transaction listing, live or from the offline cache.

use tabled::Tabled;

use fireside_api::models::{Transaction, TransactionType};
use fireside_api::TransactionFilter;
use fireside_core::{Session, transaction_matches};

use crate::cli::TransactionsArgs;
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "From")]
    source: String,
    #[tabled(rename = "To")]
    destination: String,
}

impl TransactionRow {
    /// Split groups show their first split plus a count.
    fn new(t: &Transaction, amounts_visible: bool) -> Self {
        let splits = &t.attributes.transactions;
        let Some(first) = splits.first() else {
            return Self {
                id: t.id.clone(),
                date: String::new(),
                kind: String::new(),
                description: t.attributes.group_title.clone().unwrap_or_default(),
                amount: String::new(),
                source: String::new(),
                destination: String::new(),
            };
        };
        let description = match (&t.attributes.group_title, splits.len()) {
            (Some(title), n) if n > 1 => format!("{title} ({n} splits)"),
            _ => first.description.clone(),
        };
        Self {
            id: t.id.clone(),
            date: first.date.format("%Y-%m-%d").to_string(),
            kind: first.transaction_type.to_string(),
            description,
            amount: output::money(
                Some(&first.amount),
                first.currency_symbol.as_deref(),
                amounts_visible,
            ),
            source: first.source_name.clone().unwrap_or_default(),
            destination: first.destination_name.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: TransactionsArgs,
    ctx: &Ctx,
) -> Result<(), CliError> {
    let filter = TransactionFilter {
        range: util::period(&args.period)?,
        transaction_type: args.transaction_type.map(TransactionType::from),
    };

    let transactions: Vec<Transaction> = if ctx.offline {
        let store = session.store();
        let cached = store
            .cached_transactions()
            .ok_or_else(|| CliError::NoCachedData {
                collection: "transactions".into(),
            })?;
        output::notice(
            &format!(
                "Offline: transactions cached {}",
                util::format_synced_ms(store.last_transactions_sync())
            ),
            ctx.quiet,
            ctx.color,
        );
        cached
            .iter()
            .filter(|t| transaction_matches(t, &filter))
            .cloned()
            .collect()
    } else {
        util::restore_credentials(session)?;
        let fetched = session.transactions_offline_first(&filter).await?;
        util::report_source(fetched.source, ctx);
        fetched.data.to_vec()
    };

    let visible = session.store().balance_visible();
    let out = output::render_list(ctx.format, &transactions, |t| TransactionRow::new(t, visible))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
