// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake for testing without filesystem I/O.

use roomsync_app_core::config::{ConfigError, ConfigStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory implementation of [`ConfigStore`].
///
/// Clones share the same backing map, so a test can hand one clone to a
/// [`ConfigService`](roomsync_app_core::config::ConfigService) and inspect the
/// other.
///
/// # Example
///
/// ```
/// use roomsync_app_core::config::ConfigService;
/// use roomsync_app_core::prefs::EditorPrefs;
/// use roomsync_dry_tests::InMemoryConfigStore;
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
/// service.save("editor_prefs", &EditorPrefs::default()).unwrap();
/// assert_eq!(store.saved_keys(), vec!["editor_prefs".to_string()]);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    docs: BTreeMap<String, Vec<u8>>,
    loads: usize,
    saved: Vec<String>,
    fail_loads: bool,
    fail_saves: bool,
}

impl InMemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one raw document.
    pub fn with_doc(key: &str, raw: &str) -> Self {
        let store = Self::new();
        store.lock().docs.insert(key.to_owned(), raw.as_bytes().to_vec());
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every subsequent `load_raw` fail.
    pub fn fail_loads(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    /// Make every subsequent `save_raw` fail.
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// Number of `load_raw` attempts, failed ones included.
    pub fn load_count(&self) -> usize {
        self.lock().loads
    }

    /// Keys passed to successful `save_raw` calls, in call order.
    pub fn saved_keys(&self) -> Vec<String> {
        self.lock().saved.clone()
    }

    /// Raw document under `key` as UTF-8, if present.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock()
            .docs
            .get(key)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut inner = self.lock();
        inner.loads += 1;
        if inner.fail_loads {
            return Err(ConfigError::Other("simulated load failure".into()));
        }
        inner.docs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        if inner.fail_saves {
            return Err(ConfigError::Other("simulated save failure".into()));
        }
        inner.docs.insert(key.to_owned(), data.to_vec());
        inner.saved.push(key.to_owned());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use roomsync_app_core::config::ConfigService;
    use roomsync_app_core::prefs::EditorPrefs;

    #[test]
    fn clones_share_documents() {
        let store = InMemoryConfigStore::new();
        let other = store.clone();
        store.save_raw("k", b"{}").unwrap();
        assert_eq!(other.raw("k").as_deref(), Some("{}"));
    }

    #[test]
    fn missing_key_is_not_found_and_counted() {
        let store = InMemoryConfigStore::new();
        assert!(matches!(store.load_raw("nope"), Err(ConfigError::NotFound)));
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn simulated_failures_surface_through_the_service() {
        let store = InMemoryConfigStore::new();
        store.fail_loads(true);
        let service = ConfigService::new(store.clone());
        let res: Result<EditorPrefs, _> = service.load_or_default("editor_prefs");
        assert!(matches!(res, Err(ConfigError::Other(_))));
        store.fail_saves(true);
        assert!(service.save("editor_prefs", &EditorPrefs::default()).is_err());
        assert!(store.saved_keys().is_empty());
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let store = InMemoryConfigStore::with_doc("editor_prefs", r#"{"snap_to_walls":false}"#);
        let prefs: EditorPrefs = ConfigService::new(store)
            .load_or_default("editor_prefs")
            .unwrap();
        assert!(!prefs.snap_to_walls);
        assert!(prefs.snap_to_edges);
        let _ = serde_json::to_string(&prefs).unwrap();
    }
}
