// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Property checks for pairwise collision and the layout audit.

use proptest::prelude::*;
use roomsync_core::validate::{audit_layout, collides, recompute_collisions};
use roomsync_core::{LayoutTuning, PlacedObject, Room};
use roomsync_geom::{Footprint, MountType, Position};

fn mount_from(tag: u8) -> MountType {
    match tag % 3 {
        0 => MountType::Floor,
        1 => MountType::Wall,
        _ => MountType::Surface,
    }
}

fn object_strategy(idx: usize) -> impl Strategy<Value = PlacedObject> {
    (
        -4.0f32..4.0,
        0.0f32..2.5,
        -3.0f32..3.0,
        0.1f32..2.0,
        0.1f32..1.5,
        0.1f32..2.0,
        0u8..4,
        any::<u8>(),
    )
        .prop_map(move |(x, y, z, w, h, d, quarter, mount)| {
            let mut obj = PlacedObject::new(
                format!("o{idx}"),
                "box",
                Position::new(x, y, z),
                Footprint::new(w, h, d),
                mount_from(mount),
            );
            obj.rotation_y = f32::from(quarter) * 90.0;
            obj
        })
}

fn layout_strategy() -> impl Strategy<Value = Vec<PlacedObject>> {
    (object_strategy(0), object_strategy(1), object_strategy(2), object_strategy(3))
        .prop_map(|(a, b, c, d)| vec![a, b, c, d])
}

proptest! {
    #[test]
    fn collision_is_symmetric(a in object_strategy(0), b in object_strategy(1)) {
        let tuning = LayoutTuning::default();
        prop_assert_eq!(
            collides(&a.body(), &b.body(), &tuning),
            collides(&b.body(), &a.body(), &tuning)
        );
    }

    #[test]
    fn colliding_flags_agree_with_the_audit(mut objects in layout_strategy()) {
        let tuning = LayoutTuning::default();
        recompute_collisions(&mut objects, &tuning);
        let report = audit_layout(&objects, &Room::new(10.0, 8.0, 3.0), &tuning);
        for obj in &objects {
            prop_assert_eq!(obj.colliding, report.is_colliding(&obj.id));
        }
    }
}
