use super::{DateRange, page_query};
use crate::client::ApiClient;
use crate::envelope::{Envelope, Single};
use crate::error::Error;
use crate::models::{Budget, BudgetLimit, BudgetStore};
use crate::paginate::fetch_all_pages;

// ── Budgets ──────────────────────────────────────────────────────────

/// One page of `GET budgets`; the range scopes each budget's `spent`.
pub async fn get_budgets(
    client: &ApiClient,
    page: u32,
    range: &DateRange,
) -> Result<Envelope<Budget>, Error> {
    let mut params = page_query(page);
    range.push_query(&mut params);
    client.get("budgets", &params).await
}

pub async fn get_all_budgets(client: &ApiClient, range: &DateRange) -> Result<Envelope<Budget>, Error> {
    fetch_all_pages(|page| get_budgets(client, page, range)).await
}

pub async fn get_budget(client: &ApiClient, id: &str) -> Result<Single<Budget>, Error> {
    client.get(&format!("budgets/{id}"), &[]).await
}

pub async fn create_budget(client: &ApiClient, body: &BudgetStore) -> Result<Single<Budget>, Error> {
    client.post("budgets", body).await
}

pub async fn update_budget(
    client: &ApiClient,
    id: &str,
    body: &BudgetStore,
) -> Result<Single<Budget>, Error> {
    client.put(&format!("budgets/{id}"), body).await
}

pub async fn delete_budget(client: &ApiClient, id: &str) -> Result<(), Error> {
    client.delete(&format!("budgets/{id}")).await
}

// ── Budget limits ────────────────────────────────────────────────────

/// One page of `GET budget-limits` across all budgets.
pub async fn get_budget_limits(
    client: &ApiClient,
    page: u32,
    range: &DateRange,
) -> Result<Envelope<BudgetLimit>, Error> {
    let mut params = page_query(page);
    range.push_query(&mut params);
    client.get("budget-limits", &params).await
}

pub async fn get_all_budget_limits(
    client: &ApiClient,
    range: &DateRange,
) -> Result<Envelope<BudgetLimit>, Error> {
    fetch_all_pages(|page| get_budget_limits(client, page, range)).await
}

/// Every limit of one budget (`GET budgets/{id}/limits`), all pages.
pub async fn get_limits_for_budget(
    client: &ApiClient,
    budget_id: &str,
    range: &DateRange,
) -> Result<Envelope<BudgetLimit>, Error> {
    let path = format!("budgets/{budget_id}/limits");
    fetch_all_pages(|page| {
        let mut params = page_query(page);
        range.push_query(&mut params);
        let path = path.as_str();
        async move { client.get(path, &params).await }
    })
    .await
}
