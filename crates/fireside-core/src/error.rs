// ── Core error types ──
//
// Remote failures pass through untouched: callers branch on the transport
// taxonomy (`fireside_api::Error`), so it is wrapped, never re-mapped.
// Secure-store failures surface as-is too. Cache and persistence failures
// never reach this type; they are absorbed and logged where they happen.

use thiserror::Error;

use crate::secure::SecureStoreError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Api(#[from] fireside_api::Error),

    #[error("Secure storage failed: {0}")]
    SecureStore(#[from] SecureStoreError),
}

impl CoreError {
    /// The wrapped transport error, if this is one.
    pub fn api(&self) -> Option<&fireside_api::Error> {
        match self {
            Self::Api(e) => Some(e),
            Self::SecureStore(_) => None,
        }
    }

    /// No response was received; offline fallbacks apply.
    pub fn is_offline(&self) -> bool {
        self.api().is_some_and(fireside_api::Error::is_offline)
    }

    pub fn is_auth_failure(&self) -> bool {
        self.api().is_some_and(fireside_api::Error::is_auth_failure)
    }

    /// Structured field errors from a 422 response.
    pub fn validation_payload(&self) -> Option<&serde_json::Value> {
        self.api().and_then(fireside_api::Error::validation_payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_variant() {
        let err = CoreError::from(fireside_api::Error::Unreachable {
            message: "connection refused".into(),
        });
        assert!(err.is_offline());
        assert!(matches!(
            err.api(),
            Some(fireside_api::Error::Unreachable { .. })
        ));
        assert_eq!(err.to_string(), "Server unreachable: connection refused");
    }

    #[test]
    fn secure_store_errors_are_not_offline() {
        let err = CoreError::from(SecureStoreError::Backend("locked".into()));
        assert!(!err.is_offline());
        assert!(!err.is_auth_failure());
        assert!(err.validation_payload().is_none());
    }
}
