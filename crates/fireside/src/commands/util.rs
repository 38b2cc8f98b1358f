//! Shared helpers for command handlers.

use chrono::{DateTime, Local, Utc};

use fireside_api::DateRange;
use fireside_core::{DataSource, Session};

use crate::cli::PeriodArgs;
use crate::error::CliError;
use crate::output;

use super::Ctx;

/// Fail early for commands that have no cached fallback.
pub fn require_online(ctx: &Ctx, command: &str) -> Result<(), CliError> {
    if ctx.offline {
        return Err(CliError::OfflineUnsupported {
            command: command.into(),
        });
    }
    Ok(())
}

/// Restore stored credentials into the session, or fail with `NotSignedIn`.
pub fn restore_credentials(session: &Session) -> Result<(), CliError> {
    if session.load_credentials()? {
        Ok(())
    } else {
        Err(CliError::NotSignedIn)
    }
}

/// `--start`/`--end` as a query window; the start may not follow the end.
pub fn period(args: &PeriodArgs) -> Result<DateRange, CliError> {
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            return Err(CliError::Validation {
                field: "start".into(),
                reason: format!("{start} is after the end date {end}"),
            });
        }
    }
    Ok(DateRange {
        start: args.start,
        end: args.end,
    })
}

/// Sync time in local time, or "never".
pub fn format_synced(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "never".into(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Same as [`format_synced`] for raw epoch milliseconds.
pub fn format_synced_ms(ms: Option<i64>) -> String {
    format_synced(ms.and_then(DateTime::<Utc>::from_timestamp_millis))
}

/// Tell the user when a listing came from the offline cache.
pub fn report_source(source: DataSource, ctx: &Ctx) {
    if let DataSource::Cached { last_synced } = source {
        output::warning(
            &format!(
                "server unreachable, showing data cached {}",
                format_synced_ms(last_synced)
            ),
            ctx.color,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn period_rejects_inverted_range() {
        let args = PeriodArgs {
            start: NaiveDate::from_ymd_opt(2026, 3, 1),
            end: NaiveDate::from_ymd_opt(2026, 2, 1),
        };
        assert!(matches!(period(&args), Err(CliError::Validation { .. })));

        let open = PeriodArgs {
            start: NaiveDate::from_ymd_opt(2026, 3, 1),
            end: None,
        };
        assert_eq!(period(&open).unwrap().start, open.start);
    }

    #[test]
    fn unsynced_reads_never() {
        assert_eq!(format_synced_ms(None), "never");
    }
}
