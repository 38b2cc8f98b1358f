use crate::client::ApiClient;
use crate::error::Error;
use crate::models::CurrencyAutocomplete;

/// `GET autocomplete/currencies`. Returns a plain array, not an envelope.
pub async fn get_currencies(
    client: &ApiClient,
    query: Option<&str>,
    limit: Option<u32>,
) -> Result<Vec<CurrencyAutocomplete>, Error> {
    let mut params = Vec::new();
    if let Some(q) = query {
        params.push(("query", q.to_owned()));
    }
    if let Some(limit) = limit {
        params.push(("limit", limit.to_string()));
    }
    client.get("autocomplete/currencies", &params).await
}
