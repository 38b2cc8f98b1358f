// OS keychain backend for the credentials record.

use fireside_api::Credentials;
use fireside_core::secure::CREDENTIALS_KEY;
use fireside_core::{SecureStore, SecureStoreError};

/// Keyring service name for every fireside entry.
pub const KEYRING_SERVICE: &str = "fireside";

/// Stores the credentials record as one keyring entry
/// (service [`KEYRING_SERVICE`], user `credentials`).
#[derive(Debug, Clone)]
pub struct KeyringSecureStore {
    service: String,
    user: String,
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringSecureStore {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    /// Separate namespace, e.g. one per server profile.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: CREDENTIALS_KEY.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, SecureStoreError> {
        keyring::Entry::new(&self.service, &self.user).map_err(backend)
    }
}

fn backend(err: keyring::Error) -> SecureStoreError {
    SecureStoreError::Backend(err.to_string())
}

impl SecureStore for KeyringSecureStore {
    fn load(&self) -> Result<Option<Credentials>, SecureStoreError> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(Credentials::from_record_json(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(backend(e)),
        }
    }

    fn save(&self, credentials: &Credentials) -> Result<(), SecureStoreError> {
        let raw = credentials.to_record_json()?;
        self.entry()?.set_password(&raw).map_err(backend)
    }

    fn clear(&self) -> Result<(), SecureStoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(backend(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn absent_entry_reads_as_none_and_clears_cleanly() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let store = KeyringSecureStore::with_service("fireside-test");

        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }
}
