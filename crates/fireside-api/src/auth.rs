use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Credentials for one remote bookkeeping server.
///
/// The token never appears in `Debug` output; `secrecy` redacts it.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Server root, e.g. `https://firefly.example.com/`. The client appends `api/v1/`.
    pub endpoint_url: String,
    /// Personal access token sent as `Authorization: Bearer <token>`.
    pub access_token: SecretString,
}

impl Credentials {
    pub fn new(endpoint_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            access_token: SecretString::from(access_token.into()),
        }
    }

    /// Encode as the single JSON record kept in the secure store.
    pub fn to_record_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&StoredCredentials {
            endpoint_url: self.endpoint_url.clone(),
            access_token: self.access_token.expose_secret().to_owned(),
        })
    }

    /// Decode the secure-store record written by [`to_record_json`](Self::to_record_json).
    pub fn from_record_json(raw: &str) -> Result<Self, serde_json::Error> {
        let stored: StoredCredentials = serde_json::from_str(raw)?;
        Ok(Self::new(stored.endpoint_url, stored.access_token))
    }
}

/// Wire shape of the secure-store record.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    endpoint_url: String,
    access_token: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trip_keeps_token() {
        let creds = Credentials::new("https://ff.example.com/", "tok-123");
        let raw = creds.to_record_json().unwrap();
        assert!(raw.contains("\"endpointUrl\""));
        assert!(raw.contains("\"accessToken\""));

        let back = Credentials::from_record_json(&raw).unwrap();
        assert_eq!(back.endpoint_url, "https://ff.example.com/");
        assert_eq!(back.access_token.expose_secret(), "tok-123");
    }

    #[test]
    fn debug_output_redacts_token() {
        let creds = Credentials::new("https://ff.example.com/", "super-secret");
        assert!(!format!("{creds:?}").contains("super-secret"));
    }
}
