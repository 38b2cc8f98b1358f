use super::page_query;
use crate::client::ApiClient;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::models::Recurrence;
use crate::paginate::fetch_all_pages;

/// One page of recurring transaction definitions.
pub async fn get_recurrences(client: &ApiClient, page: u32) -> Result<Envelope<Recurrence>, Error> {
    client.get("recurrences", &page_query(page)).await
}

pub async fn get_all_recurrences(client: &ApiClient) -> Result<Envelope<Recurrence>, Error> {
    fetch_all_pages(|page| get_recurrences(client, page)).await
}
