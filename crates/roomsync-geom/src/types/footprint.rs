// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};

use crate::rotation::rotated_footprint;

/// Width/height/depth of an object, axis-aligned at zero yaw.
///
/// Invariants:
/// - All components are finite and non-negative for a usable footprint
///   (see [`Footprint::is_valid`]); constructors do not enforce this so that
///   untrusted input can be inspected before it is rejected.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Footprint {
    /// Extent along X at zero yaw.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
    /// Extent along Z at zero yaw.
    pub depth: f32,
}

impl Footprint {
    /// Creates a footprint from components.
    #[must_use]
    pub const fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Half of the X extent.
    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    /// Half of the vertical extent.
    #[must_use]
    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }

    /// Half of the Z extent.
    #[must_use]
    pub fn half_depth(&self) -> f32 {
        self.depth / 2.0
    }

    /// Returns `true` if every component is finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.width, self.height, self.depth]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Footprint of the axis-aligned box bounding this one after `rotation_y_deg` of yaw.
    #[must_use]
    pub fn rotated(&self, rotation_y_deg: f32) -> Self {
        rotated_footprint(*self, rotation_y_deg)
    }
}
