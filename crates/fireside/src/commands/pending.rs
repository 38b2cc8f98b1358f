//! Offline transaction queue. Entries are stored on this device until
//! removed; nothing submits them automatically.

use chrono::Local;
use tabled::Tabled;

use fireside_api::models::{TransactionSplitStore, TransactionStore, TransactionType};
use fireside_core::{PendingTransaction, Session};

use crate::cli::{PendingAddArgs, PendingArgs, PendingCommand};
use crate::error::CliError;
use crate::output;

use super::Ctx;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Queued")]
    queued: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl PendingRow {
    fn new(p: &PendingTransaction, amounts_visible: bool) -> Self {
        let split = p.payload.transactions.first();
        Self {
            id: p.id.to_string(),
            queued: p
                .queued_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            date: split.map(|s| s.date.clone()).unwrap_or_default(),
            kind: split
                .map(|s| s.transaction_type.to_string())
                .unwrap_or_default(),
            description: split.map(|s| s.description.clone()).unwrap_or_default(),
            amount: output::money(split.map(|s| s.amount.as_str()), None, amounts_visible),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(session: &Session, args: PendingArgs, ctx: &Ctx) -> Result<(), CliError> {
    let store = session.store();
    match args.command {
        PendingCommand::Add(add) => {
            let payload = build_payload(add)?;
            let id = session.queue_transaction(payload);
            output::notice(&format!("Queued transaction {id}"), ctx.quiet, ctx.color);
            Ok(())
        }

        PendingCommand::List => {
            let pending = store.pending_transactions();
            let visible = store.balance_visible();
            let out = output::render_list(ctx.format, &pending, |p| PendingRow::new(p, visible))?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        PendingCommand::Remove { id } => {
            if !store.remove_pending_transaction(id) {
                return Err(CliError::NotFound {
                    resource_type: "Queued transaction".into(),
                    identifier: id.to_string(),
                    list_command: "pending list".into(),
                });
            }
            output::notice("Queued transaction removed", ctx.quiet, ctx.color);
            Ok(())
        }

        PendingCommand::Clear => {
            let count = store.pending_transactions().len();
            store.clear_pending_transactions();
            output::notice(
                &format!("Removed {count} queued transactions"),
                ctx.quiet,
                ctx.color,
            );
            Ok(())
        }
    }
}

/// One-split create body from the flags.
fn build_payload(args: PendingAddArgs) -> Result<TransactionStore, CliError> {
    let amount = args.amount.trim().to_owned();
    let valid = amount
        .parse::<f64>()
        .is_ok_and(|value| value.is_finite() && value > 0.0);
    if !valid {
        return Err(CliError::Validation {
            field: "amount".into(),
            reason: format!("'{amount}' is not a positive decimal"),
        });
    }
    if args.description.trim().is_empty() {
        return Err(CliError::Validation {
            field: "description".into(),
            reason: "must not be empty".into(),
        });
    }

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    Ok(TransactionStore {
        error_if_duplicate_hash: true,
        apply_rules: true,
        group_title: None,
        transactions: vec![TransactionSplitStore {
            transaction_type: TransactionType::from(args.transaction_type),
            date: date.format("%Y-%m-%d").to_string(),
            amount,
            description: args.description,
            currency_code: None,
            source_id: None,
            source_name: args.source,
            destination_id: None,
            destination_name: args.destination,
            category_name: args.category,
            budget_id: None,
            notes: args.notes,
            tags: Vec::new(),
        }],
    })
}
