// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry kernel for RoomSync.

This crate provides:
- Rotated footprints (`Footprint::rotated`, `rotated_footprint`).
- Centered XZ rectangles and signed per-axis overlap (`Rect`, `aabb_overlap`).
- Mount-type aware vertical ranges (`Body`, `vertical_overlap`).

Design notes:
- Pure functions only; nothing here owns state or allocates.
- Only yaw is modeled. A footprint rotated by an arbitrary angle is replaced by
  the axis-aligned box that bounds it, so every test downstream stays an AABB
  test.
- Angles within one degree of a right angle snap to that right angle so float
  noise never inflates a box that should merely swap its sides.
"]

/// Yaw normalization and right-angle detection.
pub mod rotation;
/// Foundational geometric types.
pub mod types;

pub use rotation::{normalize_degrees, quarter_turn, rotated_footprint, QuarterTurn};
pub use types::body::{vertical_overlap, Body, Span};
pub use types::footprint::Footprint;
pub use types::mount::{MountType, Origin};
pub use types::position::Position;
pub use types::rect::{aabb_overlap, Axis, Overlap, Rect};
