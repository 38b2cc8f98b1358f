use chrono::NaiveDate;

use super::page_query;
use crate::client::ApiClient;
use crate::envelope::{Envelope, Single};
use crate::error::Error;
use crate::models::{Account, AccountStore, AccountType, AccountUpdate};
use crate::paginate::fetch_all_pages;

/// Filters for `GET accounts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub account_type: Option<AccountType>,
    /// Balance reference date; the server defaults to today.
    pub date: Option<NaiveDate>,
}

impl AccountFilter {
    pub fn of_type(account_type: AccountType) -> Self {
        Self {
            account_type: Some(account_type),
            date: None,
        }
    }

    fn query(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = page_query(page);
        if let Some(ref t) = self.account_type {
            params.push(("type", t.as_str().to_owned()));
        }
        if let Some(date) = self.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

/// One page of `GET accounts`.
pub async fn get_accounts(
    client: &ApiClient,
    page: u32,
    filter: &AccountFilter,
) -> Result<Envelope<Account>, Error> {
    client.get("accounts", &filter.query(page)).await
}

/// Every page of `GET accounts`, in order.
pub async fn get_all_accounts(
    client: &ApiClient,
    filter: &AccountFilter,
) -> Result<Envelope<Account>, Error> {
    fetch_all_pages(|page| get_accounts(client, page, filter)).await
}

pub async fn get_account(client: &ApiClient, id: &str) -> Result<Single<Account>, Error> {
    client.get(&format!("accounts/{id}"), &[]).await
}

pub async fn create_account(
    client: &ApiClient,
    body: &AccountStore,
) -> Result<Single<Account>, Error> {
    client.post("accounts", body).await
}

pub async fn update_account(
    client: &ApiClient,
    id: &str,
    body: &AccountUpdate,
) -> Result<Single<Account>, Error> {
    client.put(&format!("accounts/{id}"), body).await
}

pub async fn delete_account(client: &ApiClient, id: &str) -> Result<(), Error> {
    client.delete(&format!("accounts/{id}")).await
}
