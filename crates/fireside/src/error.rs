//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use fireside_config::ConfigError;
use fireside_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the server: {message}")]
    #[diagnostic(
        code(fireside::unreachable),
        help(
            "Check your network connection and that the server is running.\n\
             Cached accounts and transactions are still readable with --offline."
        )
    )]
    Unreachable { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not signed in")]
    #[diagnostic(
        code(fireside::not_signed_in),
        help("Run: fireside login --url https://your-firefly-server")
    )]
    NotSignedIn,

    #[error("The server rejected the access token")]
    #[diagnostic(
        code(fireside::auth_failed),
        help(
            "Create a new personal access token under Options > Profile > OAuth,\n\
             then run: fireside login"
        )
    )]
    AuthFailed,

    #[error("No server URL given")]
    #[diagnostic(
        code(fireside::no_endpoint),
        help("Pass --url, or set endpoint_url in {path}")
    )]
    NoEndpoint { path: String },

    #[error("Secure credential storage failed: {message}")]
    #[diagnostic(
        code(fireside::keychain),
        help("Make sure the system keychain (Secret Service, Keychain, Credential Manager) is unlocked.")
    )]
    Keychain { message: String },

    // ── Offline ──────────────────────────────────────────────────────
    #[error("No cached {collection} on this device")]
    #[diagnostic(
        code(fireside::no_cached_data),
        help("Run: fireside sync (while online) to fill the offline cache")
    )]
    NoCachedData { collection: String },

    #[error("'{command}' needs the server and is not available offline")]
    #[diagnostic(
        code(fireside::offline_unsupported),
        help("Only accounts, transactions, status and local settings work with --offline.")
    )]
    OfflineUnsupported { command: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fireside::not_found),
        help("Run: fireside {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("The server refused the request: {message}")]
    #[diagnostic(code(fireside::validation_failed), help("{fields}"))]
    ValidationFailed { message: String, fields: String },

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(fireside::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fireside::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(fireside::config),
        help("Fix or remove the config file; FIRESIDE_* variables also override it.")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON: {0}")]
    #[diagnostic(code(fireside::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::NotSignedIn | Self::AuthFailed | Self::Keychain { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoCachedData { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::NoEndpoint { .. }
            | Self::OfflineUnsupported { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(api) => api.into(),
            CoreError::SecureStore(e) => Self::Keychain {
                message: e.to_string(),
            },
        }
    }
}

impl From<fireside_api::Error> for CliError {
    fn from(err: fireside_api::Error) -> Self {
        use fireside_api::Error as Api;

        match err {
            Api::NotInitialized => Self::NotSignedIn,
            Api::Unauthorized | Api::Forbidden => Self::AuthFailed,
            Api::Unreachable { message } => Self::Unreachable { message },
            Api::ValidationFailed { message, payload } => Self::ValidationFailed {
                fields: field_errors(&payload),
                message,
            },
            Api::NotFound => Self::ApiError {
                code: "404".into(),
                message: "the requested record does not exist".into(),
            },
            Api::RateLimited => Self::ApiError {
                code: "429".into(),
                message: "rate limited, try again shortly".into(),
            },
            Api::ServerError { message } => Self::ApiError {
                code: "500".into(),
                message,
            },
            Api::UnknownStatus { status, message } => Self::ApiError {
                code: status.to_string(),
                message,
            },
            Api::ClientFault { message } => Self::ApiError {
                code: "request".into(),
                message,
            },
            Api::MalformedResponse { message, .. } => Self::ApiError {
                code: "response".into(),
                message,
            },
        }
    }
}

/// One line per field from a 422 body's `errors` object
/// (`{"errors": {"field": ["message", ...]}}`).
fn field_errors(payload: &Value) -> String {
    let Some(errors) = payload.get("errors").and_then(Value::as_object) else {
        return "The server did not list individual fields.".into();
    };
    errors
        .iter()
        .flat_map(|(field, messages)| {
            let messages: Vec<String> = match messages {
                Value::Array(items) => items
                    .iter()
                    .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_owned))
                    .collect(),
                Value::String(s) => vec![s.clone()],
                other => vec![other.to_string()],
            };
            messages
                .into_iter()
                .map(move |m| format!("{field}: {m}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
