// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Snapping engine: adjusts a proposed translation before validation.

use roomsync_geom::{Body, MountType, Position};

use crate::model::{ObjectId, PlacedObject, Room};
use crate::tuning::LayoutTuning;

/// Room wall, listed in tie-break order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Wall {
    /// `z = -depth/2`.
    North,
    /// `z = +depth/2`.
    South,
    /// `x = -width/2`.
    West,
    /// `x = +width/2`.
    East,
}

impl Wall {
    /// All walls in tie-break order.
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::West, Self::East];

    fn distance(self, p: Position, room: &Room) -> f32 {
        let hw = room.width / 2.0;
        let hd = room.depth / 2.0;
        match self {
            Self::North => (p.z + hd).abs(),
            Self::South => (p.z - hd).abs(),
            Self::West => (p.x + hw).abs(),
            Self::East => (p.x - hw).abs(),
        }
    }

    fn flush(self, p: Position, room: &Room, offset: f32) -> Position {
        let hw = room.width / 2.0;
        let hd = room.depth / 2.0;
        match self {
            Self::North => p.with_z(-hd + offset),
            Self::South => p.with_z(hd - offset),
            Self::West => p.with_x(-hw + offset),
            Self::East => p.with_x(hw - offset),
        }
    }
}

/// Which adjustments a snap pass applied.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct SnapOutcome {
    /// Adjusted position.
    pub position: Position,
    /// Wall the object was pulled onto.
    pub wall: Option<Wall>,
    /// An X edge snap fired.
    pub snapped_x: bool,
    /// A Z edge snap fired.
    pub snapped_z: bool,
}

/// Pulls `position` flush onto the nearest wall if it is close enough.
///
/// Only the axis perpendicular to that wall changes; `y` is untouched.
pub fn wall_snap(
    position: Position,
    room: &Room,
    tuning: &LayoutTuning,
) -> Option<(Wall, Position)> {
    let mut best: Option<(Wall, f32)> = None;
    for wall in Wall::ALL {
        let d = wall.distance(position, room);
        if best.is_none_or(|(_, b)| d < b) {
            best = Some((wall, d));
        }
    }
    let (wall, dist) = best?;
    (dist < tuning.wall_snap_threshold)
        .then(|| (wall, wall.flush(position, room, tuning.wall_snap_offset)))
}

/// Aligns the edges of a floor `body` with nearby floor objects.
///
/// Per neighbour, X tries right-edge-to-left-edge then left-to-right, and Z
/// tries front-to-back then back-to-front. The first match on an axis wins;
/// axes snap independently.
pub fn edge_snap(
    id: &ObjectId,
    body: &Body,
    objects: &[PlacedObject],
    tuning: &LayoutTuning,
) -> SnapOutcome {
    let threshold = tuning.edge_snap_threshold;
    let me = body.rotated_footprint();
    let (hw, hd) = (me.half_width(), me.half_depth());
    let mut out = SnapOutcome {
        position: body.position,
        ..SnapOutcome::default()
    };

    for other in objects
        .iter()
        .filter(|o| &o.id != id && o.mount == MountType::Floor)
    {
        let r = other.body().rect();
        let p = &mut out.position;
        if !out.snapped_x {
            if (p.x + hw - r.min_x).abs() < threshold {
                p.x = r.min_x - hw;
                out.snapped_x = true;
            } else if (p.x - hw - r.max_x).abs() < threshold {
                p.x = r.max_x + hw;
                out.snapped_x = true;
            }
        }
        if !out.snapped_z {
            if (p.z + hd - r.min_z).abs() < threshold {
                p.z = r.min_z - hd;
                out.snapped_z = true;
            } else if (p.z - hd - r.max_z).abs() < threshold {
                p.z = r.max_z + hd;
                out.snapped_z = true;
            }
        }
        if out.snapped_x && out.snapped_z {
            break;
        }
    }
    out
}

/// Runs the snap rules that apply to `body`'s mount type.
///
/// Wall objects snap to walls (never in a boundless room); floor objects snap
/// edge-to-edge; surface objects are left alone.
pub fn snap(
    id: &ObjectId,
    body: &Body,
    objects: &[PlacedObject],
    room: &Room,
    tuning: &LayoutTuning,
) -> SnapOutcome {
    match body.mount {
        MountType::Wall if !room.is_boundless() => match wall_snap(body.position, room, tuning) {
            Some((wall, position)) => SnapOutcome {
                position,
                wall: Some(wall),
                ..SnapOutcome::default()
            },
            None => SnapOutcome {
                position: body.position,
                ..SnapOutcome::default()
            },
        },
        MountType::Floor => edge_snap(id, body, objects, tuning),
        MountType::Wall | MountType::Surface => SnapOutcome {
            position: body.position,
            ..SnapOutcome::default()
        },
    }
}
