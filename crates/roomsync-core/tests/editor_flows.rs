// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::{Duration, Instant};

use roomsync_app_core::config::{ConfigError, ConfigService};
use roomsync_app_core::prefs::EditorPrefs;
use roomsync_core::{
    CatalogItem, Editor, GestureInput, GestureOutcome, LayoutState, LayoutTuning, ObjectId,
    ObjectRef, Outbound, TickOutcome, TransformMode,
};
use roomsync_dry_tests::{furnished_layout, standard_room, InMemoryConfigStore};
use roomsync_geom::{Footprint, MountType, Origin, Position};

const MS: Duration = Duration::from_millis(1);

fn editor() -> Editor {
    Editor::new("me".into(), standard_room(), furnished_layout())
}

fn moves(out: &[Outbound]) -> Vec<f32> {
    out.iter()
        .filter_map(|o| match o {
            Outbound::FurnitureMove(m) => Some(m.position.z),
            _ => None,
        })
        .collect()
}

#[test]
fn drag_broadcasts_are_throttled_and_the_final_pose_is_flushed() {
    let mut ed = editor();
    let bed = ObjectId::from("bed");
    let t0 = Instant::now();
    ed.begin_gesture(&bed, TransformMode::Translate, t0).unwrap();

    ed.drag(GestureInput::new(Position::new(-2.0, 0.0, 0.5), 0.0), t0).unwrap();
    ed.drag(GestureInput::new(Position::new(-2.0, 0.0, 0.6), 0.0), t0 + 50 * MS).unwrap();
    ed.drag(GestureInput::new(Position::new(-2.0, 0.0, 0.7), 0.0), t0 + 100 * MS).unwrap();
    assert_eq!(moves(ed.outbox()), vec![0.5]);

    ed.poll(t0 + 150 * MS);
    assert_eq!(moves(ed.outbox()), vec![0.5]);
    assert_eq!(ed.next_deadline(), Some(t0 + 200 * MS));
    ed.poll(t0 + 200 * MS);
    assert_eq!(moves(ed.outbox()), vec![0.5, 0.7]);

    let outcome = ed.end_gesture(t0 + 250 * MS).unwrap();
    assert!(matches!(outcome, GestureOutcome::Committed { .. }));
    let out = ed.drain_outbox();
    assert_eq!(moves(&out), vec![0.5, 0.7, 0.7]);
    assert_eq!(
        out.first(),
        Some(&Outbound::RequestLock(ObjectRef {
            object_id: bed.clone()
        }))
    );
    assert_eq!(
        out.last(),
        Some(&Outbound::ReleaseLock(ObjectRef { object_id: bed }))
    );
}

#[test]
fn undo_and_redo_walk_committed_moves_without_broadcasting() {
    let mut ed = editor();
    let bed = ObjectId::from("bed");
    let now = Instant::now();
    ed.begin_gesture(&bed, TransformMode::Translate, now).unwrap();
    ed.drag(GestureInput::new(Position::new(-2.0, 0.0, 1.0), 0.0), now).unwrap();
    ed.end_gesture(now).unwrap();
    assert_eq!(ed.history().len(), 2);
    ed.drain_outbox();

    assert!(ed.undo(now));
    assert_eq!(ed.layout().get(&bed).unwrap().position.z, 0.0);
    assert!(ed.redo(now));
    assert_eq!(ed.layout().get(&bed).unwrap().position.z, 1.0);
    assert!(!ed.redo(now));
    assert!(ed.drain_outbox().is_empty());
    assert_eq!(ed.toasts().latest().map(|t| t.title.as_str()), Some("Redo"));
}

#[test]
fn colliding_drag_never_reaches_the_committed_layout() {
    let mut ed = editor();
    let desk = ObjectId::from("desk");
    let before = ed.layout().get(&desk).unwrap().pose();
    let now = Instant::now();
    ed.begin_gesture(&desk, TransformMode::Translate, now).unwrap();

    let hit = ed.drag(GestureInput::new(Position::new(-2.0, 0.0, 0.0), 0.0), now).unwrap();
    assert_eq!(
        hit,
        TickOutcome::Reverted {
            pose: before,
            other: ObjectId::from("bed")
        }
    );
    let outcome = ed.end_gesture(now).unwrap();
    assert_eq!(
        outcome,
        GestureOutcome::Committed {
            id: desk.clone(),
            pose: before
        }
    );
    assert_eq!(ed.layout().get(&desk).unwrap().pose(), before);
    assert_eq!(ed.history().len(), 1);
    assert!(moves(ed.outbox()).is_empty());
}

#[test]
fn catalog_placement_uses_mount_drop_heights_and_fresh_ids() {
    let mut ed = Editor::new("alice".into(), standard_room(), vec![]);
    let tv = ed
        .place_from_catalog(&CatalogItem {
            kind: "wall-tv".into(),
            footprint: Footprint::new(1.2, 0.7, 0.1),
            mount: MountType::Wall,
            origin: Origin::Center,
        })
        .unwrap();
    assert_eq!(tv, ObjectId::from("wall-tv-alice-1"));
    assert_eq!(ed.layout().get(&tv).unwrap().position.y, 1.5);

    let rug = ed
        .place_from_catalog(&CatalogItem {
            kind: "rug".into(),
            footprint: Footprint::new(2.0, 0.02, 3.0),
            mount: MountType::Floor,
            origin: Origin::Base,
        })
        .unwrap();
    assert_eq!(ed.layout().get(&rug).unwrap().position.y, 0.0);
    assert_eq!(ed.history().len(), 3);
    assert!(matches!(ed.outbox().first(), Some(Outbound::FurnitureAdd(o)) if o.id == tv));
}

#[test]
fn paste_offsets_copies_and_flags_the_overlap() {
    let mut ed = editor();
    let desk = ObjectId::from("desk");
    let now = Instant::now();
    ed.select(&desk, false, now).unwrap();
    assert_eq!(ed.copy_selected(now), 1);

    let pasted = ed.paste(now);
    assert_eq!(pasted, vec![ObjectId::from("desk-me-1")]);
    let copy = ed.layout().get(&pasted[0]).unwrap();
    assert!((copy.position.x - 3.5).abs() < 1e-5);
    assert!((copy.position.z + 2.5).abs() < 1e-5);
    assert!(copy.colliding);
    assert!(ed.layout().get(&desk).unwrap().colliding);
    assert!(ed.audit().is_colliding(&desk));
}

#[test]
fn rotate_selected_turns_a_quarter_and_swaps_the_footprint() {
    let mut ed = editor();
    let bed = ObjectId::from("bed");
    let now = Instant::now();
    ed.select(&bed, false, now).unwrap();
    let outcome = ed.rotate_selected(now).unwrap();
    assert!(matches!(outcome, GestureOutcome::Committed { .. }));
    let obj = ed.layout().get(&bed).unwrap();
    assert_eq!(obj.rotation_y, 90.0);
    let fp = obj.body().rotated_footprint();
    assert!((fp.width - 1.6).abs() < 1e-5);
    assert!((fp.depth - 2.0).abs() < 1e-5);
    assert!(ed.locks().is_empty());
}

#[test]
fn delete_selected_broadcasts_deletions() {
    let mut ed = editor();
    let now = Instant::now();
    ed.select(&"desk".into(), false, now).unwrap();
    ed.select(&"lamp".into(), true, now).unwrap();
    let deleted = ed.delete_selected(now);
    assert_eq!(deleted, vec![ObjectId::from("desk"), ObjectId::from("lamp")]);
    assert!(ed.selection().is_empty());
    assert_eq!(ed.layout().objects().len(), 2);
    let deletes = ed
        .drain_outbox()
        .into_iter()
        .filter(|o| matches!(o, Outbound::FurnitureDelete(_)))
        .count();
    assert_eq!(deletes, 2);
}

#[test]
fn additive_select_toggles() {
    let mut ed = editor();
    let now = Instant::now();
    let bed = ObjectId::from("bed");
    ed.select(&bed, true, now).unwrap();
    ed.select(&bed, true, now).unwrap();
    assert!(ed.selection().is_empty());
    assert!(ed.locks().is_empty());
}

#[test]
fn persisted_tuning_and_prefs_shape_the_editor() {
    let store = InMemoryConfigStore::with_doc(
        "layout_tuning",
        r#"{"history_capacity": 2, "paste_offset": 1.0}"#,
    );
    let config = ConfigService::new(store);
    let tuning = LayoutTuning::load(&config).unwrap();
    assert_eq!(tuning.history_capacity, 2);
    assert_eq!(tuning.penetration_threshold, 0.02);

    let prefs = EditorPrefs {
        snap_to_edges: false,
        ..EditorPrefs::default()
    };
    let mut ed = Editor::with_settings(
        "me".into(),
        LayoutState::new(standard_room(), furnished_layout()),
        tuning,
        prefs,
    );
    let bed = ObjectId::from("bed");
    let now = Instant::now();
    for z in [0.5_f32, 1.0, 1.5] {
        ed.begin_gesture(&bed, TransformMode::Translate, now).unwrap();
        ed.drag(GestureInput::new(Position::new(-2.0, 0.0, z), 0.0), now).unwrap();
        ed.end_gesture(now).unwrap();
    }
    assert_eq!(ed.history().len(), 2);
    assert!(ed.undo(now));
    assert!(!ed.undo(now));
    assert_eq!(ed.layout().get(&bed).unwrap().position.z, 1.0);
}

#[test]
fn tuning_load_surfaces_store_failures_and_defaults_only_when_missing() {
    let store = InMemoryConfigStore::new();
    let config = ConfigService::new(store.clone());

    store.fail_loads(true);
    assert!(matches!(LayoutTuning::load(&config), Err(ConfigError::Other(_))));
    assert_eq!(store.load_count(), 1);

    store.fail_loads(false);
    assert_eq!(LayoutTuning::load(&config).unwrap(), LayoutTuning::default());
    assert_eq!(store.load_count(), 2);

    let corrupt = ConfigService::new(InMemoryConfigStore::with_doc("layout_tuning", "{nope"));
    assert!(matches!(LayoutTuning::load(&corrupt), Err(ConfigError::Serde(_))));
}

#[test]
fn late_room_dimensions_apply_to_later_gestures() {
    let mut ed = Editor::new("me".into(), roomsync_dry_tests::boundless_room(), furnished_layout());
    let bed = ObjectId::from("bed");
    let now = Instant::now();
    ed.set_room(standard_room()).unwrap();
    ed.begin_gesture(&bed, TransformMode::Translate, now).unwrap();
    let out = ed.drag(GestureInput::new(Position::new(-20.0, 0.0, 0.0), 0.0), now).unwrap();
    assert!(matches!(out, TickOutcome::Corrected(p) if (p.position.x + 4.0).abs() < 1e-5));
    assert!(ed
        .set_room(roomsync_core::Room::new(f32::NAN, 1.0, 1.0))
        .is_err());
}
