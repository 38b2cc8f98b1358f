//! Sign-in lifecycle, status and sync.

use serde::Serialize;
use tabled::Tabled;

use fireside_api::{AccountFilter, Credentials, TransactionFilter};
use fireside_core::{CollectionStatus, Session};

use crate::cli::LoginArgs;
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

// ── Login / logout ───────────────────────────────────────────────────

pub async fn login(session: &Session, args: LoginArgs, ctx: &Ctx) -> Result<(), CliError> {
    util::require_online(ctx, "login")?;

    let url = args
        .url
        .or_else(|| ctx.config.endpoint_url.clone())
        .ok_or_else(|| CliError::NoEndpoint {
            path: fireside_config::config_path().display().to_string(),
        })?;
    let token = match args.token {
        Some(token) => token,
        None => rpassword::prompt_password("Personal access token: ")?,
    };
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "must not be empty".into(),
        });
    }

    let about = session
        .sign_in(Credentials::new(url.clone(), token.trim()))
        .await?;

    if ctx.config.endpoint_url.is_none() {
        let mut config = ctx.config.clone();
        config.endpoint_url = Some(url.clone());
        if let Err(e) = fireside_config::save_config(&config) {
            tracing::warn!(error = %e, "could not remember the server URL");
        }
    }

    output::notice(
        &format!(
            "Signed in to {url} (Firefly III {}, API {})",
            about.version, about.api_version
        ),
        ctx.quiet,
        ctx.color,
    );
    Ok(())
}

pub fn logout(session: &Session, ctx: &Ctx) -> Result<(), CliError> {
    session.clear_credentials()?;
    output::notice(
        "Signed out; cached data and queued transactions removed",
        ctx.quiet,
        ctx.color,
    );
    Ok(())
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusReport {
    signed_in: bool,
    endpoint_url: Option<String>,
    balance_visible: bool,
    pending_transactions: usize,
    accounts: CollectionReport,
    transactions: CollectionReport,
}

#[derive(Serialize)]
struct CollectionReport {
    items: Option<usize>,
    last_synced: Option<String>,
    stale: bool,
}

impl From<CollectionStatus> for CollectionReport {
    fn from(status: CollectionStatus) -> Self {
        Self {
            items: status.items,
            last_synced: status.last_synced.map(|t| t.to_rfc3339()),
            stale: status.stale,
        }
    }
}

#[derive(Tabled)]
struct CacheRow {
    #[tabled(rename = "Collection")]
    collection: &'static str,
    #[tabled(rename = "Items")]
    items: String,
    #[tabled(rename = "Last synced")]
    last_synced: String,
    #[tabled(rename = "Fresh")]
    fresh: &'static str,
}

impl CacheRow {
    fn new(collection: &'static str, status: &CollectionStatus) -> Self {
        Self {
            collection,
            items: status.items.map_or_else(|| "-".into(), |n| n.to_string()),
            last_synced: util::format_synced(status.last_synced),
            fresh: if status.stale { "stale" } else { "yes" },
        }
    }
}

pub fn status(session: &Session, ctx: &Ctx) -> Result<(), CliError> {
    session.load_credentials()?;
    let store = session.store();
    let cache = session.cache_status(ctx.config.cache_max_age_hours);

    let credentials = store.credentials();
    let report = StatusReport {
        signed_in: store.is_authenticated(),
        endpoint_url: credentials.map(|c| c.endpoint_url),
        balance_visible: store.balance_visible(),
        pending_transactions: store.pending_transactions().len(),
        accounts: cache.accounts.clone().into(),
        transactions: cache.transactions.clone().into(),
    };

    let out = output::render_single(ctx.format, &report, |r| {
        let session_line = match r.endpoint_url {
            Some(ref url) => format!("Signed in to {url}"),
            None => "Not signed in".into(),
        };
        let rows = [
            CacheRow::new("accounts", &cache.accounts),
            CacheRow::new("transactions", &cache.transactions),
        ];
        let table = tabled::Table::new(rows)
            .with(tabled::settings::Style::rounded())
            .to_string();
        format!(
            "{session_line}\nBalances: {}\nQueued transactions: {}\n\n{table}",
            if r.balance_visible { "shown" } else { "hidden" },
            r.pending_transactions,
        )
    })?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Sync ─────────────────────────────────────────────────────────────

pub async fn sync(session: &Session, ctx: &Ctx) -> Result<(), CliError> {
    util::require_online(ctx, "sync")?;
    util::restore_credentials(session)?;

    let account_filter = AccountFilter::default();
    let transaction_filter = TransactionFilter::default();
    let (accounts, transactions) = tokio::try_join!(
        session.refresh_accounts(&account_filter),
        session.refresh_transactions(&transaction_filter),
    )?;
    tracing::info!(
        accounts = accounts.len(),
        transactions = transactions.len(),
        "sync complete"
    );

    output::notice(
        &format!(
            "Synced {} accounts and {} transactions",
            accounts.len(),
            transactions.len()
        ),
        ctx.quiet,
        ctx.color,
    );
    Ok(())
}
