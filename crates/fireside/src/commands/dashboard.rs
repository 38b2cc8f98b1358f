//! Dashboard layout: which sections show, and in what order.

use serde::Serialize;
use tabled::Tabled;

use fireside_core::{DashboardLayout, DashboardSection, Session};

use crate::cli::{DashboardArgs, DashboardCommand};
use crate::error::CliError;
use crate::output;

use super::Ctx;

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "#")]
    position: String,
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Title")]
    title: &'static str,
    #[tabled(rename = "State")]
    state: &'static str,
}

#[derive(Serialize)]
struct SectionEntry {
    section: DashboardSection,
    position: Option<usize>,
    visible: bool,
}

/// Visible sections numbered from 1, then hidden ones.
fn entries(layout: &DashboardLayout) -> Vec<SectionEntry> {
    let visible = layout
        .visible()
        .iter()
        .enumerate()
        .map(|(i, &section)| SectionEntry {
            section,
            position: Some(i + 1),
            visible: true,
        });
    let hidden = layout.hidden().iter().map(|&section| SectionEntry {
        section,
        position: None,
        visible: false,
    });
    visible.chain(hidden).collect()
}

pub fn handle(session: &Session, args: DashboardArgs, ctx: &Ctx) -> Result<(), CliError> {
    let store = session.store();
    match args.command {
        DashboardCommand::Show => {
            let layout = store.dashboard_layout();
            let out = output::render_list(ctx.format, &entries(&layout), |e| SectionRow {
                position: e.position.map_or_else(|| "-".into(), |p| p.to_string()),
                section: e.section.to_string(),
                title: e.section.title(),
                state: if e.visible { "visible" } else { "hidden" },
            })?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        DashboardCommand::Hide { section } => {
            let message = if store.move_dashboard_section_to_hidden(section) {
                format!("{section} hidden")
            } else {
                format!("{section} was already hidden")
            };
            output::notice(&message, ctx.quiet, ctx.color);
            Ok(())
        }

        DashboardCommand::Reveal { section } => {
            let message = if store.move_dashboard_section_to_visible(section) {
                format!("{section} shown at the end of the dashboard")
            } else {
                format!("{section} is already visible")
            };
            output::notice(&message, ctx.quiet, ctx.color);
            Ok(())
        }

        DashboardCommand::Move { from, to } => {
            let len = store.visible_sections().len();
            let (f, t) = move_indices(from, to, len)?;
            if store.reorder_dashboard_visible(f, t) {
                output::notice(&format!("Moved {from} to {to}"), ctx.quiet, ctx.color);
            } else {
                output::notice("Layout unchanged", ctx.quiet, ctx.color);
            }
            Ok(())
        }

        DashboardCommand::Reset => {
            store.reset_dashboard_layout();
            output::notice("Dashboard layout reset", ctx.quiet, ctx.color);
            Ok(())
        }
    }
}

/// Convert 1-based positions to indices into the visible list.
fn move_indices(from: usize, to: usize, len: usize) -> Result<(usize, usize), CliError> {
    let in_range = |p: usize| (1..=len).contains(&p);
    if in_range(from) && in_range(to) {
        Ok((from - 1, to - 1))
    } else {
        Err(CliError::Validation {
            field: "position".into(),
            reason: format!("positions must be between 1 and {len}"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hidden_sections_have_no_position() {
        let mut layout = DashboardLayout::default();
        layout.move_to_hidden(DashboardSection::Bills);
        let list = entries(&layout);

        assert_eq!(list[0].position, Some(1));
        let last = list.last().unwrap();
        assert_eq!(last.section, DashboardSection::Bills);
        assert_eq!(last.position, None);
        assert!(!last.visible);
    }

    #[test]
    fn move_positions_are_one_based() {
        assert_eq!(move_indices(1, 3, 3).unwrap(), (0, 2));
        assert_eq!(move_indices(2, 2, 3).unwrap(), (1, 1));
        assert!(move_indices(0, 1, 3).is_err());
        assert!(move_indices(1, 4, 3).is_err());
        assert!(move_indices(1, 1, 0).is_err());
    }
}
