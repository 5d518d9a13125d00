// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Room and placed-object model.

use roomsync_geom::{normalize_degrees, Body, Footprint, MountType, Origin, Position, Rect};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

string_id!(
    /// Stable identifier of a placed object.
    ObjectId
);
string_id!(
    /// Identifier of a collaborating participant.
    PeerId
);

/// Room volume in meters, centered on the origin at floor level.
///
/// All-zero dimensions mean the room was inferred from a background scan
/// ("boundless"): only the fallback boundary applies.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Room {
    /// Extent along X.
    pub width: f32,
    /// Extent along Z.
    pub depth: f32,
    /// Ceiling height.
    pub height: f32,
}

impl Room {
    /// Creates a room from its dimensions.
    pub const fn new(width: f32, depth: f32, height: f32) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    /// Returns `true` when all three dimensions are exactly zero.
    #[allow(clippy::float_cmp)]
    pub fn is_boundless(&self) -> bool {
        self.width == 0.0 && self.depth == 0.0 && self.height == 0.0
    }

    /// Returns `true` when every dimension is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.width, self.depth, self.height]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Floor rectangle shrunk by `margin` on every side.
    pub fn floor_rect(&self, margin: f32) -> Rect {
        Rect::from_half_extents(self.width / 2.0 - margin, self.depth / 2.0 - margin)
    }
}

/// Yaw-only pose of an object.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Origin position.
    pub position: Position,
    /// Yaw in degrees, `[0, 360)`.
    pub rotation_y: f32,
}

impl Pose {
    /// Creates a pose, normalizing the yaw.
    pub fn new(position: Position, rotation_y: f32) -> Self {
        Self {
            position,
            rotation_y: normalize_degrees(rotation_y),
        }
    }

    /// Returns `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation_y.is_finite()
    }
}

/// Euler rotation in degrees as produced by a 3D gizmo.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    /// Pitch.
    pub x: f32,
    /// Yaw.
    pub y: f32,
    /// Roll.
    pub z: f32,
}

impl Euler {
    /// Pure yaw rotation.
    pub const fn yaw(y: f32) -> Self {
        Self { x: 0.0, y, z: 0.0 }
    }

    /// Returns `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// A furniture object placed in the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Catalog type label (`bed`, `wall-tv`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Origin position.
    pub position: Position,
    /// Yaw in degrees.
    #[serde(default)]
    pub rotation_y: f32,
    /// Extents at zero yaw.
    #[serde(rename = "dimensions")]
    pub footprint: Footprint,
    /// Mount type.
    #[serde(default, rename = "mountType")]
    pub mount: MountType,
    /// Vertical origin convention of the geometry.
    #[serde(default)]
    pub origin: Origin,
    /// Derived: overlaps another object in its collision domain.
    #[serde(default, rename = "isColliding")]
    pub colliding: bool,
}

impl PlacedObject {
    /// Creates an object at zero yaw with the default center origin.
    pub fn new(
        id: impl Into<ObjectId>,
        kind: impl Into<String>,
        position: Position,
        footprint: Footprint,
        mount: MountType,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            position,
            rotation_y: 0.0,
            footprint,
            mount,
            origin: Origin::default(),
            colliding: false,
        }
    }

    /// Current pose.
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            rotation_y: self.rotation_y,
        }
    }

    /// Replace the pose, normalizing the yaw.
    pub fn set_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.rotation_y = normalize_degrees(pose.rotation_y);
    }

    /// Kernel view at the current pose.
    pub fn body(&self) -> Body {
        self.body_at(self.pose())
    }

    /// Kernel view at a proposed pose.
    pub fn body_at(&self, pose: Pose) -> Body {
        Body {
            position: pose.position,
            rotation_y: pose.rotation_y,
            footprint: self.footprint,
            mount: self.mount,
            origin: self.origin,
        }
    }

    /// Checks the numeric fields of an object arriving from outside.
    pub fn check_numbers(&self) -> Result<(), &'static str> {
        if self.id.as_str().is_empty() {
            return Err("empty object id");
        }
        if !self.position.is_finite() {
            return Err("non-finite position");
        }
        if !self.rotation_y.is_finite() {
            return Err("non-finite rotation");
        }
        if !self.footprint.is_valid() {
            return Err("footprint must be finite and non-negative");
        }
        Ok(())
    }
}
