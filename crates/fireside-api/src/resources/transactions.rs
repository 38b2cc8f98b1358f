use super::{DateRange, page_query};
use crate::client::ApiClient;
use crate::envelope::{Envelope, Single};
use crate::error::Error;
use crate::models::{Transaction, TransactionStore, TransactionType, TransactionUpdate};
use crate::paginate::fetch_all_pages;

/// Filters for `GET transactions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub range: DateRange,
    pub transaction_type: Option<TransactionType>,
}

impl TransactionFilter {
    fn query(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = page_query(page);
        self.range.push_query(&mut params);
        if let Some(ref t) = self.transaction_type {
            params.push(("type", t.as_str().to_owned()));
        }
        params
    }
}

/// One page of `GET transactions`.
pub async fn get_transactions(
    client: &ApiClient,
    page: u32,
    filter: &TransactionFilter,
) -> Result<Envelope<Transaction>, Error> {
    client.get("transactions", &filter.query(page)).await
}

/// Every page of `GET transactions` for the filter's window.
pub async fn get_all_transactions(
    client: &ApiClient,
    filter: &TransactionFilter,
) -> Result<Envelope<Transaction>, Error> {
    fetch_all_pages(|page| get_transactions(client, page, filter)).await
}

pub async fn get_transaction(client: &ApiClient, id: &str) -> Result<Single<Transaction>, Error> {
    client.get(&format!("transactions/{id}"), &[]).await
}

pub async fn create_transaction(
    client: &ApiClient,
    body: &TransactionStore,
) -> Result<Single<Transaction>, Error> {
    client.post("transactions", body).await
}

pub async fn update_transaction(
    client: &ApiClient,
    id: &str,
    body: &TransactionUpdate,
) -> Result<Single<Transaction>, Error> {
    client.put(&format!("transactions/{id}"), body).await
}

pub async fn delete_transaction(client: &ApiClient, id: &str) -> Result<(), Error> {
    client.delete(&format!("transactions/{id}")).await
}
