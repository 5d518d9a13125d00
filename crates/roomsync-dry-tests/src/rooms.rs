// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canned rooms and layouts.

use roomsync_core::{PlacedObject, Room};
use roomsync_geom::MountType;

use crate::object::ObjectBuilder;

/// 10 m × 8 m × 3 m room: walls at x = ±5 and z = ±4.
pub const STANDARD_ROOM: Room = Room::new(10.0, 8.0, 3.0);

/// The standard room.
pub fn standard_room() -> Room {
    STANDARD_ROOM
}

/// Room whose dimensions are unknown; only the fallback limit applies.
pub fn boundless_room() -> Room {
    Room::default()
}

/// A small furnished bedroom inside [`STANDARD_ROOM`], free of collisions.
///
/// - `bed` 2 × 0.5 × 1.6 at (-2, 0)
/// - `desk` 1.2 × 0.75 × 0.6 at (3, -3)
/// - `tv` wall-mounted 1.2 × 0.7 × 0.1 on the north wall
/// - `lamp` on the desk
pub fn furnished_layout() -> Vec<PlacedObject> {
    vec![
        ObjectBuilder::new("bed")
            .kind("bed")
            .size(2.0, 0.5, 1.6)
            .on_floor(-2.0, 0.0)
            .build(),
        ObjectBuilder::new("desk")
            .kind("desk")
            .size(1.2, 0.75, 0.6)
            .on_floor(3.0, -3.0)
            .build(),
        ObjectBuilder::new("tv")
            .kind("wall-tv")
            .size(1.2, 0.7, 0.1)
            .mount(MountType::Wall)
            .at(0.0, 1.5, -3.9)
            .build(),
        ObjectBuilder::new("lamp")
            .kind("lamp")
            .size(0.2, 0.4, 0.2)
            .mount(MountType::Surface)
            .at(3.0, 0.96, -3.0)
            .build(),
    ]
}
