// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used by the layout engine.
//!
//! Conventions:
//! - Meters, `f32`, Y up. The room floor is `y = 0` and the room is centered
//!   on the XZ origin.
//! - Overlap is signed: a positive value on an axis is a penetration depth,
//!   zero means touching faces, negative means a gap.

#[doc = "Objects placed in the room with their vertical conventions."]
pub mod body;
#[doc = "Object extents before and after yaw."]
pub mod footprint;
#[doc = "Mount classification and vertical origin conventions."]
pub mod mount;
#[doc = "World-space positions."]
pub mod position;
#[doc = "Centered XZ rectangles and per-axis overlap."]
pub mod rect;
