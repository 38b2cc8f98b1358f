//! Typed resource records for the `/api/v1/` endpoints.
//!
//! Every list element is a [`Resource`] whose `attributes` is one of the
//! records below. Deserialization is the validation step: a 2xx body that
//! does not fit surfaces as [`Error::MalformedResponse`](crate::Error::MalformedResponse).
//! Amounts stay as the server's decimal strings; no float round-tripping.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::envelope::Resource;

// ── Aliases ──────────────────────────────────────────────────────────

pub type Account = Resource<AccountAttributes>;
pub type Transaction = Resource<TransactionGroupAttributes>;
pub type Budget = Resource<BudgetAttributes>;
pub type BudgetLimit = Resource<BudgetLimitAttributes>;
pub type PiggyBank = Resource<PiggyBankAttributes>;
pub type Recurrence = Resource<RecurrenceAttributes>;
pub type Bill = Resource<BillAttributes>;

// ── Open enums ───────────────────────────────────────────────────────

/// Generates a string-backed enum with an `Other` fallback, so a server
/// adding a new value never fails decoding of the whole collection.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(raw) => raw.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Other(raw),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_owned(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_enum! {
    /// Account kind, also used as the `type` filter on `GET accounts`.
    AccountType {
        Asset => "asset",
        Expense => "expense",
        Revenue => "revenue",
        Cash => "cash",
        Liability => "liability",
        Liabilities => "liabilities",
        InitialBalance => "initial-balance",
        Reconciliation => "reconciliation",
    }
}

open_enum! {
    TransactionType {
        Withdrawal => "withdrawal",
        Deposit => "deposit",
        Transfer => "transfer",
        Reconciliation => "reconciliation",
        OpeningBalance => "opening balance",
    }
}

// ── Accounts ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountAttributes {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub order: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub account_role: Option<String>,
    #[serde(default)]
    pub currency_id: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub currency_decimal_places: Option<u8>,
    #[serde(default)]
    pub current_balance: Option<String>,
    #[serde(default)]
    pub current_balance_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub opening_balance: Option<String>,
    #[serde(default)]
    pub opening_balance_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub virtual_balance: Option<String>,
    #[serde(default)]
    pub include_net_worth: Option<bool>,
    #[serde(default)]
    pub liability_type: Option<String>,
    #[serde(default)]
    pub interest: Option<String>,
    #[serde(default)]
    pub interest_period: Option<String>,
}

/// Body of `POST accounts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountStore {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_net_worth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Body of `PUT accounts/{id}`; only the set fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_net_worth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// ── Transactions ─────────────────────────────────────────────────────

/// A transaction group: one or more splits booked together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionGroupAttributes {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub group_title: Option<String>,
    pub transactions: Vec<TransactionSplit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSplit {
    #[serde(default)]
    pub transaction_journal_id: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub date: DateTime<FixedOffset>,
    pub amount: String,
    pub description: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub currency_decimal_places: Option<u8>,
    #[serde(default)]
    pub foreign_amount: Option<String>,
    #[serde(default)]
    pub foreign_currency_code: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub destination_id: Option<String>,
    #[serde(default)]
    pub destination_name: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub budget_id: Option<String>,
    #[serde(default)]
    pub budget_name: Option<String>,
    #[serde(default)]
    pub bill_id: Option<String>,
    #[serde(default)]
    pub bill_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `POST transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStore {
    #[serde(default)]
    pub error_if_duplicate_hash: bool,
    #[serde(default)]
    pub apply_rules: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_title: Option<String>,
    pub transactions: Vec<TransactionSplitStore>,
}

/// One split of a new transaction. `date` accepts `YYYY-MM-DD` or a full
/// ISO 8601 timestamp, so it stays a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSplitStore {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub date: String,
    pub amount: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body of `PUT transactions/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_rules: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_title: Option<String>,
    pub transactions: Vec<TransactionSplitUpdate>,
}

/// A split change; `transaction_journal_id` selects which split of the group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionSplitUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_journal_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ── Budgets ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAttributes {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub auto_budget_type: Option<String>,
    #[serde(default)]
    pub auto_budget_amount: Option<String>,
    #[serde(default)]
    pub auto_budget_period: Option<String>,
    #[serde(default)]
    pub auto_budget_currency_code: Option<String>,
    /// Amount spent per currency within the requested range.
    #[serde(default)]
    pub spent: Vec<SpentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpentEntry {
    pub sum: String,
    #[serde(default)]
    pub currency_id: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub currency_decimal_places: Option<u8>,
}

/// Body of `POST budgets` and `PUT budgets/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetStore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_budget_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_budget_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_budget_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_budget_currency_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLimitAttributes {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub budget_id: String,
    pub amount: String,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub currency_id: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    /// A decimal string on older servers, a per-currency list on newer ones.
    #[serde(default)]
    pub spent: Option<Value>,
}

// ── Piggy banks ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiggyBankAttributes {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub name: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub target_amount: Option<String>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub current_amount: Option<String>,
    #[serde(default)]
    pub left_to_save: Option<String>,
    #[serde(default)]
    pub save_per_month: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub object_group_title: Option<String>,
}

// ── Recurring transactions ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceAttributes {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub first_date: NaiveDate,
    #[serde(default)]
    pub latest_date: Option<NaiveDate>,
    #[serde(default)]
    pub repeat_until: Option<NaiveDate>,
    #[serde(default)]
    pub nr_of_repetitions: Option<u32>,
    #[serde(default)]
    pub apply_rules: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub repetitions: Vec<RecurrenceRepetition>,
    #[serde(default)]
    pub transactions: Vec<RecurrenceTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRepetition {
    /// `daily`, `weekly`, `ndom`, `monthly` or `yearly`.
    #[serde(rename = "type")]
    pub repetition_type: String,
    pub moment: String,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub weekend: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub occurrences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceTransaction {
    pub description: String,
    pub amount: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub destination_id: Option<String>,
    #[serde(default)]
    pub destination_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub budget_name: Option<String>,
}

// ── Bills ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillAttributes {
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub name: String,
    pub amount_min: String,
    pub amount_max: String,
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub end_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub extension_date: Option<DateTime<FixedOffset>>,
    /// `weekly`, `monthly`, `quarterly`, `half-year` or `yearly`.
    pub repeat_freq: String,
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub next_expected_match: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub pay_dates: Vec<DateTime<FixedOffset>>,
    #[serde(default)]
    pub paid_dates: Vec<PaidDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaidDate {
    #[serde(default)]
    pub transaction_group_id: Option<String>,
    #[serde(default)]
    pub transaction_journal_id: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<FixedOffset>>,
}

// ── Non-envelope payloads ────────────────────────────────────────────

/// One row of `GET autocomplete/currencies` (plain JSON array).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyAutocomplete {
    pub id: String,
    pub name: String,
    pub code: String,
    pub symbol: String,
    #[serde(default)]
    pub decimal_places: Option<u8>,
}

/// One row of `GET insight/expense/expense`: spending grouped by expense account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub difference: String,
    #[serde(default)]
    pub difference_float: Option<f64>,
    #[serde(default)]
    pub currency_id: Option<String>,
    pub currency_code: String,
}

/// `GET about`: server and API versions, used to validate a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutInfo {
    pub version: String,
    pub api_version: String,
    #[serde(default)]
    pub php_version: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub driver: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn account_type_keeps_unknown_values() {
        let known: AccountType = serde_json::from_value(json!("asset")).unwrap();
        assert_eq!(known, AccountType::Asset);

        let unknown: AccountType = serde_json::from_value(json!("mortgage-ish")).unwrap();
        assert_eq!(unknown, AccountType::Other("mortgage-ish".into()));
        assert_eq!(serde_json::to_value(&unknown).unwrap(), json!("mortgage-ish"));
    }

    #[test]
    fn transaction_type_with_space_round_trips() {
        let t: TransactionType = serde_json::from_value(json!("opening balance")).unwrap();
        assert_eq!(t, TransactionType::OpeningBalance);
        assert_eq!(t.to_string(), "opening balance");
    }

    #[test]
    fn account_resource_decodes() {
        let account: Account = serde_json::from_value(json!({
            "type": "accounts",
            "id": "3",
            "attributes": {
                "created_at": "2024-01-05T10:20:30+01:00",
                "active": true,
                "name": "Checking",
                "type": "asset",
                "account_role": "defaultAsset",
                "currency_code": "EUR",
                "current_balance": "1234.56",
                "include_net_worth": true
            }
        }))
        .unwrap();

        assert_eq!(account.id, "3");
        assert_eq!(account.kind, "accounts");
        assert_eq!(account.attributes.account_type, AccountType::Asset);
        assert_eq!(account.attributes.current_balance.as_deref(), Some("1234.56"));
    }

    #[test]
    fn transaction_missing_required_split_field_is_rejected() {
        let result: Result<Transaction, _> = serde_json::from_value(json!({
            "type": "transactions",
            "id": "9",
            "attributes": {
                "transactions": [{ "type": "withdrawal", "amount": "3.00" }]
            }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn store_payload_skips_unset_fields() {
        let body = TransactionStore {
            error_if_duplicate_hash: true,
            apply_rules: true,
            group_title: None,
            transactions: vec![TransactionSplitStore {
                transaction_type: TransactionType::Withdrawal,
                date: "2024-03-01".into(),
                amount: "12.50".into(),
                description: "Lunch".into(),
                currency_code: None,
                source_id: Some("1".into()),
                source_name: None,
                destination_id: None,
                destination_name: Some("Cafe".into()),
                category_name: None,
                budget_id: None,
                notes: None,
                tags: Vec::new(),
            }],
        };

        let value = serde_json::to_value(&body).unwrap();
        let split = &value["transactions"][0];
        assert_eq!(split["type"], "withdrawal");
        assert!(split.get("budget_id").is_none());
        assert!(split.get("tags").is_none());
        assert!(value.get("group_title").is_none());
    }
}
