use crate::client::ApiClient;
use crate::envelope::Single;
use crate::error::Error;
use crate::models::AboutInfo;

/// `GET about`. The cheapest authenticated call, used to validate a
/// connection before credentials are saved.
pub async fn get_about(client: &ApiClient) -> Result<AboutInfo, Error> {
    let about: Single<AboutInfo> = client.get("about", &[]).await?;
    Ok(about.data)
}
