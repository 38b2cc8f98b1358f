// ── Secure credential storage ──
//
// The only place the access token is persisted. Platform backends live
// outside this crate (the keychain store is in `fireside-config`); this
// module defines the seam and an in-memory implementation.

use std::sync::{Mutex, PoisonError};

use fireside_api::Credentials;
use thiserror::Error;

/// Fixed key of the single credentials record.
pub const CREDENTIALS_KEY: &str = "credentials";

#[derive(Debug, Error)]
pub enum SecureStoreError {
    /// The platform store refused or failed the operation.
    #[error("secure storage backend failed: {0}")]
    Backend(String),

    #[error("stored credentials are unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Encrypted storage for one credentials record.
pub trait SecureStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved.
    fn load(&self) -> Result<Option<Credentials>, SecureStoreError>;
    fn save(&self, credentials: &Credentials) -> Result<(), SecureStoreError>;
    /// Removing an absent record is not an error.
    fn clear(&self) -> Result<(), SecureStoreError>;
}

/// Keeps the record in process memory, encoded exactly as a platform
/// backend would store it.
#[derive(Debug, Default)]
pub struct MemorySecureStore {
    record: Mutex<Option<String>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw stored record, for inspection.
    pub fn raw_record(&self) -> Option<String> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SecureStore for MemorySecureStore {
    fn load(&self) -> Result<Option<Credentials>, SecureStoreError> {
        let record = self.raw_record();
        record
            .map(|raw| Credentials::from_record_json(&raw).map_err(SecureStoreError::from))
            .transpose()
    }

    fn save(&self, credentials: &Credentials) -> Result<(), SecureStoreError> {
        let raw = credentials.to_record_json()?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), SecureStoreError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
