use super::page_query;
use crate::client::ApiClient;
use crate::envelope::{Envelope, Single};
use crate::error::Error;
use crate::models::PiggyBank;
use crate::paginate::fetch_all_pages;

pub async fn get_piggy_banks(client: &ApiClient, page: u32) -> Result<Envelope<PiggyBank>, Error> {
    client.get("piggy-banks", &page_query(page)).await
}

pub async fn get_all_piggy_banks(client: &ApiClient) -> Result<Envelope<PiggyBank>, Error> {
    fetch_all_pages(|page| get_piggy_banks(client, page)).await
}

pub async fn get_piggy_bank(client: &ApiClient, id: &str) -> Result<Single<PiggyBank>, Error> {
    client.get(&format!("piggy-banks/{id}"), &[]).await
}
