// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::types::{footprint::Footprint, position::Position};

/// Horizontal axis of the floor plane.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    /// East/west.
    X,
    /// North/south.
    Z,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Z => f.write_str("z"),
        }
    }
}

/// Axis-aligned rectangle on the XZ plane.
///
/// Invariants:
/// - `min_x <= max_x` and `min_z <= max_z` for footprints built from valid
///   (non-negative) extents.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    /// Western edge.
    pub min_x: f32,
    /// Eastern edge.
    pub max_x: f32,
    /// Northern edge.
    pub min_z: f32,
    /// Southern edge.
    pub max_z: f32,
}

impl Rect {
    /// Rectangle of `footprint` (already rotated) centered on `center`.
    #[must_use]
    pub fn centered(center: Position, footprint: Footprint) -> Self {
        let hw = footprint.half_width();
        let hd = footprint.half_depth();
        Self {
            min_x: center.x - hw,
            max_x: center.x + hw,
            min_z: center.z - hd,
            max_z: center.z + hd,
        }
    }

    /// Rectangle spanning `[-half_x, half_x] × [-half_z, half_z]`.
    #[must_use]
    pub fn from_half_extents(half_x: f32, half_z: f32) -> Self {
        Self {
            min_x: -half_x,
            max_x: half_x,
            min_z: -half_z,
            max_z: half_z,
        }
    }

    /// Signed overlap with `other`; see [`aabb_overlap`].
    #[must_use]
    pub fn overlap(&self, other: &Self) -> Overlap {
        aabb_overlap(self, other)
    }

    /// How far this rectangle sticks out of `bounds` on `axis` (0 when inside).
    ///
    /// Returns a signed shift that moves the rectangle back inside: positive
    /// pushes toward `+axis`, negative toward `-axis`. The low side wins when a
    /// rectangle is wider than the bounds.
    #[must_use]
    pub fn correction_into(&self, bounds: &Self, axis: Axis) -> f32 {
        let (lo, hi, b_lo, b_hi) = match axis {
            Axis::X => (self.min_x, self.max_x, bounds.min_x, bounds.max_x),
            Axis::Z => (self.min_z, self.max_z, bounds.min_z, bounds.max_z),
        };
        if lo < b_lo {
            b_lo - lo
        } else if hi > b_hi {
            b_hi - hi
        } else {
            0.0
        }
    }
}

/// Signed penetration depth of two rectangles on each floor axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Overlap {
    /// Overlap along X (≤ 0 means separated on X).
    pub x: f32,
    /// Overlap along Z (≤ 0 means separated on Z).
    pub z: f32,
}

impl Overlap {
    /// Returns `true` if both axes penetrate deeper than `threshold`.
    #[must_use]
    pub fn exceeds(&self, threshold: f32) -> bool {
        self.x > threshold && self.z > threshold
    }
}

/// Signed 1-D overlap of two rectangles on X and Z.
#[must_use]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> Overlap {
    Overlap {
        x: a.max_x.min(b.max_x) - a.min_x.max(b.min_x),
        z: a.max_z.min(b.max_z) - a.min_z.max(b.min_z),
    }
}
