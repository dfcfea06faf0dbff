use anyhow::{Context, Result};
use keyring::Entry;

use super::store::{StoredTokens, TokenStore};

const SERVICE_NAME: &str = "cashbook";

const ACCESS_ENTRY: &str = "access_token";
const REFRESH_ENTRY: &str = "refresh_token";

/// Keeps both tokens in the OS keychain, one entry each.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a distinct keychain service name, e.g. one per API origin.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, name: &str) -> Result<Entry> {
        Entry::new(&self.service, name).context("Failed to create keyring entry")
    }

    fn read(&self, name: &str) -> Result<Option<String>> {
        match self.entry(name)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn write(&self, name: &str, value: Option<&str>) -> Result<()> {
        let entry = self.entry(name)?;
        match value {
            Some(value) => entry
                .set_password(value)
                .context("Failed to store token in keychain"),
            None => match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(e).context("Failed to delete token from keychain"),
            },
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<StoredTokens> {
        Ok(StoredTokens {
            access: self.read(ACCESS_ENTRY)?,
            refresh: self.read(REFRESH_ENTRY)?,
        })
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        self.write(ACCESS_ENTRY, tokens.access.as_deref())?;
        self.write(REFRESH_ENTRY, tokens.refresh.as_deref())
    }

    fn clear(&self) -> Result<()> {
        self.write(ACCESS_ENTRY, None)?;
        self.write(REFRESH_ENTRY, None)
    }
}
