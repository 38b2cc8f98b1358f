// Async HTTP client for the bookkeeping server's REST API.
//
// Base path: {endpoint}/api/v1/
// Auth: Authorization: Bearer <personal access token>

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

const API_PREFIX: &str = "api/v1/";

// ── Client ───────────────────────────────────────────────────────────

/// Credentialed client bound to one server.
///
/// Cheap to share behind an `Arc`: the header configuration is immutable
/// after construction, so concurrent requests only read it. Resource
/// functions in [`crate::resources`] take `&ApiClient` explicitly.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from credentials: injects the bearer token and JSON headers as
    /// defaults on every request and applies the transport timeout.
    pub fn new(credentials: &Credentials, transport: &TransportConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            credentials.access_token.expose_secret()
        ))
        .map_err(|e| Error::ClientFault {
            message: format!("invalid access token header value: {e}"),
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.api+json, application/json"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(&credentials.endpoint_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(endpoint_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(endpoint_url)?;
        Ok(Self { http, base_url })
    }

    /// `https://host/firefly` and `https://host/firefly/` both become
    /// `https://host/firefly/api/v1/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim())?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/{API_PREFIX}"));
        }
        Ok(url)
    }

    /// The resolved API base, always ending in `/api/v1/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        handle_empty(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

/// The single normalization point: every response of every resource
/// passes through here (or [`handle_empty`]).
async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::MalformedResponse {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    let err = Error::from_status(status, &raw);
    debug!(status = status.as_u16(), error = %err, "request failed");
    err
}

// ── Handle ───────────────────────────────────────────────────────────

/// Swappable slot holding the live client.
///
/// Empty until [`initialize`](Self::initialize). Re-initialization swaps
/// the whole `Arc` atomically; requests already in flight keep the
/// instance they started with.
#[derive(Debug, Default)]
pub struct ClientHandle {
    current: ArcSwapOption<ApiClient>,
}

impl ClientHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client from `credentials` and install it, replacing any previous one.
    pub fn initialize(
        &self,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Arc<ApiClient>, Error> {
        let client = Arc::new(ApiClient::new(credentials, transport)?);
        self.current.store(Some(Arc::clone(&client)));
        debug!(base_url = %client.base_url(), "API client initialized");
        Ok(client)
    }

    /// Install a pre-built client.
    pub fn install(&self, client: ApiClient) -> Arc<ApiClient> {
        let client = Arc::new(client);
        self.current.store(Some(Arc::clone(&client)));
        client
    }

    /// The live client, or [`Error::NotInitialized`]. Never touches the network.
    pub fn ensure_initialized(&self) -> Result<Arc<ApiClient>, Error> {
        self.current.load_full().ok_or(Error::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.current.load().is_some()
    }

    /// Drop the live client (sign-out).
    pub fn reset(&self) {
        self.current.store(None);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_api_prefix() {
        let c = ApiClient::from_reqwest("https://ff.example.com", reqwest::Client::new()).unwrap();
        assert_eq!(c.base_url().as_str(), "https://ff.example.com/api/v1/");

        let c = ApiClient::from_reqwest("https://ex.com/firefly/", reqwest::Client::new()).unwrap();
        assert_eq!(c.base_url().as_str(), "https://ex.com/firefly/api/v1/");

        let c = ApiClient::from_reqwest("https://ex.com/api/v1", reqwest::Client::new()).unwrap();
        assert_eq!(c.base_url().as_str(), "https://ex.com/api/v1/");
    }

    #[test]
    fn invalid_endpoint_is_a_client_fault() {
        let err = ApiClient::from_reqwest("not a url", reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, Error::ClientFault { .. }));
    }

    #[test]
    fn empty_handle_is_not_initialized() {
        let handle = ClientHandle::new();
        assert!(!handle.is_initialized());
        assert!(matches!(
            handle.ensure_initialized(),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn reinitialize_swaps_but_keeps_old_arc_alive() {
        let handle = ClientHandle::new();
        let transport = TransportConfig::default();

        let first = handle
            .initialize(&Credentials::new("https://one.example/", "a"), &transport)
            .unwrap();
        let second = handle
            .initialize(&Credentials::new("https://two.example/", "b"), &transport)
            .unwrap();

        assert_eq!(first.base_url().host_str(), Some("one.example"));
        assert_eq!(
            handle.ensure_initialized().unwrap().base_url().host_str(),
            Some("two.example")
        );
        assert!(Arc::ptr_eq(&second, &handle.ensure_initialized().unwrap()));

        handle.reset();
        assert!(matches!(
            handle.ensure_initialized(),
            Err(Error::NotInitialized)
        ));
    }
}
