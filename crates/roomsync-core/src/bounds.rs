// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Boundary corrections and mount-type height rules.

use roomsync_geom::{Axis, Body, MountType, Position, Rect};

use crate::model::Room;
use crate::tuning::LayoutTuning;

fn push_into(body: &Body, bounds: &Rect) -> Position {
    let rect = body.rect();
    let dx = rect.correction_into(bounds, Axis::X);
    let dz = rect.correction_into(bounds, Axis::Z);
    body.position.offset_xz(dx, dz)
}

fn clamp_to_limit(position: Position, limit: f32) -> Position {
    position
        .with_x(position.x.clamp(-limit, limit))
        .with_z(position.z.clamp(-limit, limit))
}

/// Shifts `body` by exactly its penetration so it sits flush against the
/// room walls it crossed.
///
/// Boundless rooms clamp the center to the fallback square instead.
pub fn push_correct(body: &Body, room: &Room, tuning: &LayoutTuning) -> Position {
    if room.is_boundless() {
        return clamp_to_limit(body.position, tuning.boundless_limit);
    }
    push_into(body, &room.floor_rect(0.0))
}

/// Moves `body` inside the margin-inset room, the position every committed
/// object must satisfy.
pub fn settle(body: &Body, room: &Room, tuning: &LayoutTuning) -> Position {
    if room.is_boundless() {
        return clamp_to_limit(body.position, tuning.boundless_limit);
    }
    push_into(body, &room.floor_rect(tuning.wall_margin))
}

/// Applies the vertical rule for the body's mount type to a proposed `y`.
///
/// Floor objects rest on the ground; wall objects stay between floor and
/// ceiling; surface objects keep the proposed height.
pub fn clamp_height(body: &Body, y: f32, room: &Room) -> f32 {
    let h = body.footprint.height;
    let ground = body.origin.ground_y(h);
    match body.mount {
        MountType::Floor => ground,
        MountType::Wall => {
            if room.height > 0.0 {
                let ceiling = (ground + room.height - h).max(ground);
                y.clamp(ground, ceiling)
            } else {
                y.max(ground)
            }
        }
        MountType::Surface => y,
    }
}
