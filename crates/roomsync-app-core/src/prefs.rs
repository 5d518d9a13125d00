// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Editor and hub preferences persisted through the config service.

use serde::{Deserialize, Serialize};

/// Per-user editor toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPrefs {
    /// Snap wall-mounted objects flush against the nearest wall while dragging.
    pub snap_to_walls: bool,
    /// Snap floor objects edge-to-edge with their neighbours while dragging.
    pub snap_to_edges: bool,
    /// Lifetime of transient notifications, in milliseconds.
    pub toast_ttl_ms: u64,
    /// Maximum number of notifications kept at once.
    pub toast_capacity: usize,
}

impl Default for EditorPrefs {
    fn default() -> Self {
        Self {
            snap_to_walls: true,
            snap_to_edges: true,
            toast_ttl_ms: 3_000,
            toast_capacity: 8,
        }
    }
}

impl EditorPrefs {
    /// Notification lifetime as a [`std::time::Duration`].
    pub fn toast_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.toast_ttl_ms)
    }
}

/// Session hub settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HubPrefs {
    /// Explicit Unix socket path; `None` uses the platform default.
    pub socket_path: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_fills_defaults() {
        let prefs: EditorPrefs =
            serde_json::from_str(r#"{"snap_to_edges": false}"#).unwrap_or_default();
        assert!(prefs.snap_to_walls);
        assert!(!prefs.snap_to_edges);
        assert_eq!(prefs.toast_ttl_ms, 3_000);
    }
}
