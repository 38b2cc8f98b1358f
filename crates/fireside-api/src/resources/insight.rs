use super::DateRange;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::InsightEntry;

/// `GET insight/expense/expense`: spending per expense account in the range.
pub async fn get_expense_summary(
    client: &ApiClient,
    range: &DateRange,
) -> Result<Vec<InsightEntry>, Error> {
    let mut params = Vec::new();
    range.push_query(&mut params);
    client.get("insight/expense/expense", &params).await
}
