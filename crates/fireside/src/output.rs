//! Output formatting: table or JSON.
//!
//! Table uses `tabled`, JSON serializes the original records via serde.
//! Notices go to stderr so stdout stays parseable.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Shown in place of amounts while balances are hidden.
pub const MASK: &str = "••••";

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Informational notice on stderr.
pub fn notice(message: &str, quiet: bool, color: bool) {
    if quiet {
        return;
    }
    if color {
        eprintln!("{}", message.green());
    } else {
        eprintln!("{message}");
    }
}

/// Warning on stderr; printed even in quiet mode.
pub fn warning(message: &str, color: bool) {
    if color {
        eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
    } else {
        eprintln!("warning: {message}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data),
    }
}

/// Render a single item; table mode uses `detail_fn`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// `amount` with its currency symbol, or the mask.
pub fn money(amount: Option<&str>, symbol: Option<&str>, visible: bool) -> String {
    match (visible, amount) {
        (false, _) => MASK.into(),
        (true, None) => "-".into(),
        (true, Some(a)) => match symbol {
            Some(s) => format!("{s} {a}"),
            None => a.to_owned(),
        },
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        name: String,
    }

    #[test]
    fn json_keeps_records_and_table_has_headers() {
        let data = vec![Row { name: "Checking".into() }];
        let json = render_list(OutputFormat::Json, &data, |r| Row { name: r.name.clone() }).unwrap();
        assert!(json.contains("\"name\": \"Checking\""));

        let table = render_list(OutputFormat::Table, &data, |r| Row { name: r.name.clone() }).unwrap();
        assert!(table.contains("name"));
        assert!(table.contains("Checking"));
    }

    #[test]
    fn money_masks_when_hidden() {
        assert_eq!(money(Some("12.50"), Some("€"), true), "€ 12.50");
        assert_eq!(money(Some("12.50"), Some("€"), false), MASK);
        assert_eq!(money(None, None, true), "-");
    }
}
