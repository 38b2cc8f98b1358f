//! Stateless request functions, one module per remote resource.
//!
//! Every function takes the [`ApiClient`](crate::ApiClient) explicitly plus
//! resource parameters and returns the typed envelope or a normalized
//! [`Error`](crate::Error). Write operations return the server's canonical
//! representation; reconciling it into local state is the caller's job.

pub mod about;
pub mod accounts;
pub mod bills;
pub mod budgets;
pub mod currencies;
pub mod insight;
pub mod piggy_banks;
pub mod recurring;
pub mod transactions;

use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Optional `start`/`end` query window (`YYYY-MM-DD`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// No window: the server applies its own default period.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub(crate) fn push_query(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(start) = self.start {
            params.push(("start", start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end {
            params.push(("end", end.format(DATE_FORMAT).to_string()));
        }
    }
}

/// Query list beginning with the page number.
pub(crate) fn page_query(page: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string())]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn date_range_formats_iso_dates() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let mut params = page_query(2);
        range.push_query(&mut params);
        assert_eq!(
            params,
            vec![
                ("page", "2".to_owned()),
                ("start", "2024-01-01".to_owned()),
                ("end", "2024-01-31".to_owned()),
            ]
        );

        let mut params = page_query(1);
        DateRange::unbounded().push_query(&mut params);
        assert_eq!(params.len(), 1);
    }
}
