use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message used when the server supplies none.
pub(crate) const GENERIC_SERVER_MESSAGE: &str = "The server returned an unexpected error";

/// Top-level error type for the `fireside-api` crate.
///
/// A closed taxonomy: every transport and HTTP failure is normalized into one
/// of these variants by the client's response handler, regardless of which
/// resource was requested. Resource functions and the pagination aggregator
/// propagate them unwrapped.
#[derive(Debug, Error)]
pub enum Error {
    // ── Local preconditions ─────────────────────────────────────────
    /// The client handle was read before `initialize` was called.
    /// Produced locally, never after a network round trip.
    #[error("API client is not initialized -- sign in first")]
    NotInitialized,

    // ── HTTP status ─────────────────────────────────────────────────
    /// HTTP 401: bad or expired access token.
    #[error("Unauthorized -- the access token was rejected")]
    Unauthorized,

    /// HTTP 403.
    #[error("Forbidden")]
    Forbidden,

    /// HTTP 404.
    #[error("Not found")]
    NotFound,

    /// HTTP 422. `payload` is the server's response body, unmodified, so
    /// forms can surface field-level messages.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String, payload: Value },

    /// HTTP 429.
    #[error("Rate limited by the server")]
    RateLimited,

    /// HTTP 500.
    #[error("Server error: {message}")]
    ServerError { message: String },

    /// Any other 4xx/5xx status.
    #[error("Unexpected HTTP {status}: {message}")]
    UnknownStatus { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// The request was sent but no response arrived (DNS, connect, timeout, offline).
    #[error("Server unreachable: {message}")]
    Unreachable { message: String },

    /// The request failed before it was sent (bad URL, header, serialization).
    #[error("Request could not be built: {message}")]
    ClientFault { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// A successful response whose body did not match the expected record.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },
}

impl Error {
    /// Build the normalized error for a non-success status and its raw body.
    pub(crate) fn from_status(status: StatusCode, raw: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(raw).ok();
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map_or_else(|| GENERIC_SERVER_MESSAGE.to_owned(), str::to_owned);

        match status.as_u16() {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            422 => Self::ValidationFailed {
                message,
                payload: parsed.unwrap_or_else(|| Value::String(raw.to_owned())),
            },
            429 => Self::RateLimited,
            500 => Self::ServerError { message },
            other => Self::UnknownStatus {
                status: other,
                message,
            },
        }
    }

    /// `true` when the server could not be reached at all. Callers fall back
    /// to cached data on this signal rather than showing an error dialog.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// `true` for 401/403: the stored credentials need attention.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }

    /// The structured field errors of a 422, if this is one.
    pub fn validation_payload(&self) -> Option<&Value> {
        match self {
            Self::ValidationFailed { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// The HTTP status this error was produced from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::ValidationFailed { .. } => Some(422),
            Self::RateLimited => Some(429),
            Self::ServerError { .. } => Some(500),
            Self::UnknownStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::ClientFault {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::from_status(status, "")
        } else if err.is_decode() {
            Self::MalformedResponse {
                message: err.to_string(),
                body: String::new(),
            }
        } else {
            // timeout, connect, request and body errors all mean no usable
            // response arrived
            Self::Unreachable {
                message: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::ClientFault {
            message: format!("invalid URL: {err}"),
        }
    }
}
