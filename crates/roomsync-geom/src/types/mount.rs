// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};

/// How an object is mounted in the room.
///
/// The mount type decides the vertical placement rule and the collision
/// domain: floor-standing and wall-hung objects never see each other, while
/// surface objects live in both domains.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    /// Stands on the floor.
    #[default]
    Floor,
    /// Hangs on a wall at an arbitrary height.
    Wall,
    /// Rests on top of another object.
    Surface,
}

impl MountType {
    /// Returns `true` if objects with these mount types can collide.
    #[must_use]
    pub const fn shares_domain(self, other: Self) -> bool {
        match (self, other) {
            (Self::Floor, Self::Wall) | (Self::Wall, Self::Floor) => false,
            (Self::Floor | Self::Wall | Self::Surface, Self::Surface)
            | (Self::Surface, Self::Floor | Self::Wall)
            | (Self::Floor, Self::Floor)
            | (Self::Wall, Self::Wall) => true,
        }
    }
}

/// Where an object's local origin sits vertically.
///
/// Pre-aligned models put the origin at their base; procedural primitives are
/// centered on their origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Origin on the bottom face.
    Base,
    /// Origin at the geometric center.
    #[default]
    Center,
}

impl Origin {
    /// Stored `y` that puts an object of `height` on the floor.
    #[must_use]
    pub fn ground_y(self, height: f32) -> f32 {
        match self {
            Self::Base => 0.0,
            Self::Center => height / 2.0,
        }
    }

    /// Bottom of an object whose origin is at `y`.
    #[must_use]
    pub fn bottom(self, y: f32, height: f32) -> f32 {
        match self {
            Self::Base => y,
            Self::Center => y - height / 2.0,
        }
    }
}
