// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config service and storage port for RoomSync documents.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Key for [`crate::prefs::EditorPrefs`].
pub const EDITOR_PREFS_KEY: &str = "editor_prefs";
/// Key for [`crate::prefs::HubPrefs`].
pub const HUB_PREFS_KEY: &str = "session_hub";
/// Key for the layout tuning document owned by `roomsync-core`.
pub const LAYOUT_TUNING_KEY: &str = "layout_tuning";

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("config key not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    /// Document did not parse as the expected type.
    #[error("config serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Store-specific failure (no config dir, invalid key, ...).
    #[error("config store: {0}")]
    Other(String),
}

/// Serializes config documents as pretty JSON and delegates storage to a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the inner store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize the document under `key`. Returns `Ok(None)` if missing or empty.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load `key`, falling back to `T::default()` when the document is missing.
    ///
    /// Parse and I/O errors still surface; a corrupt document is not silently
    /// replaced.
    pub fn load_or_default<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Serialize and persist a config document for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }
}
