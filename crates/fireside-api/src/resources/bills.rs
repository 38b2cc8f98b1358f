use super::{DateRange, page_query};
use crate::client::ApiClient;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::models::Bill;
use crate::paginate::fetch_all_pages;

/// One page of `GET bills`; the range drives `pay_dates` / `paid_dates`.
pub async fn get_bills(
    client: &ApiClient,
    page: u32,
    range: &DateRange,
) -> Result<Envelope<Bill>, Error> {
    let mut params = page_query(page);
    range.push_query(&mut params);
    client.get("bills", &params).await
}

pub async fn get_all_bills(client: &ApiClient, range: &DateRange) -> Result<Envelope<Bill>, Error> {
    fetch_all_pages(|page| get_bills(client, page, range)).await
}
