//! Account listing, live or from the offline cache.

use std::sync::Arc;

use tabled::Tabled;

use fireside_api::AccountFilter;
use fireside_api::models::{Account, AccountType};
use fireside_core::Session;

use crate::cli::AccountsArgs;
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

impl AccountRow {
    fn new(a: &Account, balances_visible: bool) -> Self {
        let attrs = &a.attributes;
        Self {
            id: a.id.clone(),
            name: attrs.name.clone(),
            kind: attrs.account_type.to_string(),
            balance: output::money(
                attrs.current_balance.as_deref(),
                attrs.currency_symbol.as_deref(),
                balances_visible,
            ),
            active: if attrs.active { "yes" } else { "no" },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: AccountsArgs, ctx: &Ctx) -> Result<(), CliError> {
    let account_type = args.account_type.map(AccountType::from);

    let accounts = if ctx.offline {
        cached(session, account_type.as_ref(), ctx)?
    } else {
        util::restore_credentials(session)?;
        let filter = AccountFilter {
            account_type,
            date: None,
        };
        let fetched = session.accounts_offline_first(&filter).await?;
        util::report_source(fetched.source, ctx);
        fetched.data
    };

    let visible = session.store().balance_visible();
    let out = output::render_list(ctx.format, accounts.as_slice(), |a| AccountRow::new(a, visible))?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

/// The mirror, narrowed to one type when asked.
fn cached(
    session: &Session,
    account_type: Option<&AccountType>,
    ctx: &Ctx,
) -> Result<Arc<Vec<Account>>, CliError> {
    let store = session.store();
    let all = store.cached_accounts().ok_or_else(|| CliError::NoCachedData {
        collection: "accounts".into(),
    })?;
    output::notice(
        &format!(
            "Offline: accounts cached {}",
            util::format_synced_ms(store.last_accounts_sync())
        ),
        ctx.quiet,
        ctx.color,
    );
    Ok(match account_type {
        Some(kind) => Arc::new(
            all.iter()
                .filter(|a| &a.attributes.account_type == kind)
                .cloned()
                .collect(),
        ),
        None => all,
    })
}
