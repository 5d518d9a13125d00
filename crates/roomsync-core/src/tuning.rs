// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tunable constants of the layout engine.
//!
//! Persisted through the config service under
//! [`roomsync_app_core::config::LAYOUT_TUNING_KEY`]; missing fields fall back
//! to the defaults below.

use roomsync_app_core::config::{ConfigError, ConfigService, ConfigStore, LAYOUT_TUNING_KEY};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thresholds, margins and capacities used by validation, snapping and sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTuning {
    /// Overlap (m) both axes must exceed before two objects collide.
    pub penetration_threshold: f32,
    /// Clearance (m) kept between committed objects and the walls.
    pub wall_margin: f32,
    /// Center limit (m) on X and Z when the room is boundless.
    pub boundless_limit: f32,
    /// Wall-mounted objects closer than this (m) to a wall snap onto it.
    pub wall_snap_threshold: f32,
    /// Distance (m) from the wall plane to a snapped object's center.
    pub wall_snap_offset: f32,
    /// Floor objects whose edges are closer than this (m) snap together.
    pub edge_snap_threshold: f32,
    /// Maximum number of history snapshots.
    pub history_capacity: usize,
    /// Minimum spacing (ms) between in-progress move broadcasts.
    pub move_throttle_ms: u64,
    /// X/Z offset (m) applied to pasted copies.
    pub paste_offset: f32,
    /// Initial height (m) of wall objects placed from the catalog.
    pub wall_drop_height: f32,
    /// Initial height (m) of surface objects placed from the catalog.
    pub surface_drop_height: f32,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            penetration_threshold: 0.02,
            wall_margin: 0.05,
            boundless_limit: 50.0,
            wall_snap_threshold: 0.5,
            wall_snap_offset: 0.05,
            edge_snap_threshold: 0.2,
            history_capacity: 30,
            move_throttle_ms: 200,
            paste_offset: 0.5,
            wall_drop_height: 1.5,
            surface_drop_height: 0.5,
        }
    }
}

impl LayoutTuning {
    /// Move broadcast interval.
    pub fn move_interval(&self) -> Duration {
        Duration::from_millis(self.move_throttle_ms)
    }

    /// Loads persisted tuning, falling back to defaults when none is stored.
    pub fn load<S: ConfigStore>(config: &ConfigService<S>) -> Result<Self, ConfigError> {
        config.load_or_default(LAYOUT_TUNING_KEY)
    }
}
