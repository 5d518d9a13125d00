// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};

/// World-space point in meters.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// East/west axis; positive is east.
    pub x: f32,
    /// Height above the floor.
    pub y: f32,
    /// North/south axis; positive is south.
    pub z: f32,
}

impl Position {
    /// The room center at floor level.
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a position from components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns `true` when every component is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Copy with `x` replaced.
    #[must_use]
    pub const fn with_x(self, x: f32) -> Self {
        Self { x, ..self }
    }

    /// Copy with `y` replaced.
    #[must_use]
    pub const fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }

    /// Copy with `z` replaced.
    #[must_use]
    pub const fn with_z(self, z: f32) -> Self {
        Self { z, ..self }
    }

    /// Copy shifted on the floor plane.
    #[must_use]
    pub fn offset_xz(self, dx: f32, dz: f32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
            ..self
        }
    }
}
