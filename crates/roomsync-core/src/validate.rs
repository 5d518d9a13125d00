// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Constraint validator.
//!
//! Checks run in order and short-circuit:
//! 1. boundary containment (rotated half-extents inside the margin-inset room,
//!    or the center inside the fallback square when the room is boundless);
//! 2. pairwise collision against every other object sharing a mount domain.
//!
//! A rejection is an ordinary value and costs no allocation beyond the
//! colliding id.

use roomsync_geom::{aabb_overlap, vertical_overlap, Axis, Body};

use crate::error::LayoutError;
use crate::model::{ObjectId, PlacedObject, Room};
use crate::tuning::LayoutTuning;

/// Overshoot (m) below which a footprint counts as inside; absorbs f32 noise
/// from push-corrections that land exactly on a boundary.
pub const BOUNDARY_EPSILON: f32 = 1e-4;

/// Why a proposed pose was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The footprint leaves the allowed area.
    Boundary {
        /// First axis found outside.
        axis: Axis,
        /// Distance past the boundary.
        overshoot: f32,
    },
    /// The footprint overlaps another object.
    Collision {
        /// First colliding object in layout order.
        other: ObjectId,
    },
}

impl Rejection {
    /// Converts into the error taxonomy for `id`.
    pub fn into_error(self, id: ObjectId) -> LayoutError {
        match self {
            Self::Boundary { axis, overshoot } => LayoutError::BoundaryViolation {
                id,
                axis,
                overshoot,
            },
            Self::Collision { other } => LayoutError::CollisionViolation { id, other },
        }
    }
}

/// Result of validating a proposed pose.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The pose is legal.
    Accepted,
    /// The pose is refused.
    Rejected(Rejection),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Validates `body` as the new pose of `id` against the rest of `objects`.
///
/// The entry for `id` inside `objects` (if any) is ignored.
pub fn validate(
    id: &ObjectId,
    body: &Body,
    objects: &[PlacedObject],
    room: &Room,
    tuning: &LayoutTuning,
) -> Verdict {
    if let Some((axis, overshoot)) = check_boundary(body, room, tuning) {
        return Verdict::Rejected(Rejection::Boundary { axis, overshoot });
    }
    match find_collision(id, body, objects, tuning) {
        Some(other) => Verdict::Rejected(Rejection::Collision { other }),
        None => Verdict::Accepted,
    }
}

/// First axis on which `body` leaves the allowed area, with the overshoot.
pub fn check_boundary(body: &Body, room: &Room, tuning: &LayoutTuning) -> Option<(Axis, f32)> {
    if room.is_boundless() {
        let limit = tuning.boundless_limit;
        let over_x = body.position.x.abs() - limit;
        if over_x > BOUNDARY_EPSILON {
            return Some((Axis::X, over_x));
        }
        let over_z = body.position.z.abs() - limit;
        if over_z > BOUNDARY_EPSILON {
            return Some((Axis::Z, over_z));
        }
        return None;
    }
    let bounds = room.floor_rect(tuning.wall_margin);
    let rect = body.rect();
    [Axis::X, Axis::Z].into_iter().find_map(|axis| {
        let overshoot = rect.correction_into(&bounds, axis).abs();
        (overshoot > BOUNDARY_EPSILON).then_some((axis, overshoot))
    })
}

/// Returns `true` if `a` and `b` collide: same domain, XZ overlap beyond the
/// threshold on both axes, and intersecting vertical ranges.
pub fn collides(a: &Body, b: &Body, tuning: &LayoutTuning) -> bool {
    a.mount.shares_domain(b.mount)
        && aabb_overlap(&a.rect(), &b.rect()).exceeds(tuning.penetration_threshold)
        && vertical_overlap(a, b)
}

/// First object (in layout order, skipping `id`) that collides with `body`.
pub fn find_collision(
    id: &ObjectId,
    body: &Body,
    objects: &[PlacedObject],
    tuning: &LayoutTuning,
) -> Option<ObjectId> {
    objects
        .iter()
        .filter(|o| &o.id != id)
        .find(|o| collides(body, &o.body(), tuning))
        .map(|o| o.id.clone())
}

/// Recomputes every object's derived `colliding` flag.
///
/// Returns `true` if any flag changed.
pub fn recompute_collisions(objects: &mut [PlacedObject], tuning: &LayoutTuning) -> bool {
    let bodies: Vec<Body> = objects.iter().map(PlacedObject::body).collect();
    let mut changed = false;
    for (i, obj) in objects.iter_mut().enumerate() {
        let colliding = bodies
            .iter()
            .enumerate()
            .any(|(j, other)| i != j && collides(&bodies[i], other, tuning));
        changed |= obj.colliding != colliding;
        obj.colliding = colliding;
    }
    changed
}

/// Full-layout audit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutReport {
    /// Colliding pairs, each reported once in layout order.
    pub collisions: Vec<(ObjectId, ObjectId)>,
    /// Objects outside the allowed area.
    pub out_of_bounds: Vec<ObjectId>,
}

impl LayoutReport {
    /// Returns `true` when the layout has no violations.
    pub fn is_clean(&self) -> bool {
        self.collisions.is_empty() && self.out_of_bounds.is_empty()
    }

    /// Returns `true` if `id` appears in any colliding pair.
    pub fn is_colliding(&self, id: &ObjectId) -> bool {
        self.collisions.iter().any(|(a, b)| a == id || b == id)
    }
}

/// Checks every object and every pair of the layout.
pub fn audit_layout(objects: &[PlacedObject], room: &Room, tuning: &LayoutTuning) -> LayoutReport {
    let bodies: Vec<Body> = objects.iter().map(PlacedObject::body).collect();
    let mut report = LayoutReport::default();
    for (i, obj) in objects.iter().enumerate() {
        if check_boundary(&bodies[i], room, tuning).is_some() {
            report.out_of_bounds.push(obj.id.clone());
        }
        for (j, other) in objects.iter().enumerate().skip(i + 1) {
            if collides(&bodies[i], &bodies[j], tuning) {
                report.collisions.push((obj.id.clone(), other.id.clone()));
            }
        }
    }
    report
}
