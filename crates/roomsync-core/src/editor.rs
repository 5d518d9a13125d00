// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Editor orchestrator.
//!
//! Owns the layout, the transform session, history, the local lock mirror,
//! selection and clipboard. Every mutation goes through here; outbound
//! collaboration events queue in an outbox the transport drains.

use std::collections::BTreeSet;
use std::time::Instant;

use roomsync_app_core::prefs::EditorPrefs;
use roomsync_app_core::toast::{ToastKind, ToastScope, ToastService};
use roomsync_geom::{normalize_degrees, Footprint, MountType, Origin, Position};
use tracing::{debug, info, warn};

use crate::bounds::{clamp_height, settle};
use crate::error::LayoutError;
use crate::events::{Inbound, MoveEvent, ObjectRef, Outbound};
use crate::history::History;
use crate::locks::{LockDecision, LockTable};
use crate::model::{Euler, ObjectId, PeerId, PlacedObject, Room};
use crate::session::{
    Gesture, GestureInput, GestureOutcome, SnapToggles, TickOutcome, TransformMode,
    TransformSession,
};
use crate::state::{LayoutDocument, LayoutState};
use crate::throttle::Throttle;
use crate::tuning::LayoutTuning;
use crate::validate::{audit_layout, LayoutReport};

/// Catalog entry that can be placed into the room.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    /// Type label given to placed copies.
    pub kind: String,
    /// Extents at zero yaw.
    pub footprint: Footprint,
    /// Mount type.
    pub mount: MountType,
    /// Vertical origin convention of the model.
    pub origin: Origin,
}

/// One participant's editing state.
#[derive(Debug)]
pub struct Editor {
    me: PeerId,
    layout: LayoutState,
    tuning: LayoutTuning,
    prefs: EditorPrefs,
    session: TransformSession,
    history: History,
    locks: LockTable,
    selection: Vec<ObjectId>,
    clipboard: Vec<PlacedObject>,
    moves: Throttle<MoveEvent>,
    previewed: bool,
    outbox: Vec<Outbound>,
    toasts: ToastService,
    peers: BTreeSet<PeerId>,
    next_local_id: u64,
}

impl Editor {
    /// Creates an editor with default tuning and preferences.
    pub fn new(me: PeerId, room: Room, objects: Vec<PlacedObject>) -> Self {
        Self::with_settings(
            me,
            LayoutState::new(room, objects),
            LayoutTuning::default(),
            EditorPrefs::default(),
        )
    }

    /// Creates an editor over an initial layout.
    ///
    /// Collision flags are recomputed and the result becomes the history base.
    pub fn with_settings(
        me: PeerId,
        mut layout: LayoutState,
        tuning: LayoutTuning,
        prefs: EditorPrefs,
    ) -> Self {
        layout.recompute_collisions(&tuning);
        let mut history = History::new(tuning.history_capacity);
        history.reset(layout.snapshot());
        Self {
            me,
            moves: Throttle::new(tuning.move_interval()),
            toasts: ToastService::new(prefs.toast_capacity),
            layout,
            tuning,
            prefs,
            session: TransformSession::Idle,
            history,
            locks: LockTable::new(),
            selection: Vec::new(),
            clipboard: Vec::new(),
            previewed: false,
            outbox: Vec::new(),
            peers: BTreeSet::new(),
            next_local_id: 1,
        }
    }

    // --- Accessors ----------------------------------------------------------

    /// This participant.
    pub fn me(&self) -> &PeerId {
        &self.me
    }

    /// Committed layout.
    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    /// Active tuning.
    pub fn tuning(&self) -> &LayoutTuning {
        &self.tuning
    }

    /// Selected objects, oldest first.
    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    /// Local mirror of the project's locks.
    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    /// Undo/redo history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Transient notifications.
    pub fn toasts(&self) -> &ToastService {
        &self.toasts
    }

    /// Other participants currently in the project.
    pub fn peers(&self) -> &BTreeSet<PeerId> {
        &self.peers
    }

    /// Active gesture, if any.
    pub fn gesture(&self) -> Option<&Gesture> {
        self.session.gesture()
    }

    /// Copied objects awaiting paste.
    pub fn clipboard(&self) -> &[PlacedObject] {
        &self.clipboard
    }

    /// Events queued for the hub.
    pub fn outbox(&self) -> &[Outbound] {
        &self.outbox
    }

    /// Takes every queued outbound event.
    pub fn drain_outbox(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    /// When [`Editor::poll`] next has a throttled move to release.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.moves.next_deadline()
    }

    // --- Selection ----------------------------------------------------------

    /// Selects `id`, acquiring its lock.
    ///
    /// Without `additive` the previous selection is cleared first; with it,
    /// selecting an already selected object toggles it off.
    pub fn select(
        &mut self,
        id: &ObjectId,
        additive: bool,
        now: Instant,
    ) -> Result<(), LayoutError> {
        if !self.layout.contains(id) {
            return Err(LayoutError::UnknownObject(id.clone()));
        }
        self.ensure_not_locked_by_other(id, now)?;
        if additive && self.selection.contains(id) {
            self.deselect(id);
            return Ok(());
        }
        if !additive {
            let others: Vec<ObjectId> = self
                .selection
                .iter()
                .filter(|s| *s != id)
                .cloned()
                .collect();
            for other in &others {
                self.deselect(other);
            }
        }
        if !self.selection.contains(id) {
            self.selection.push(id.clone());
        }
        self.acquire(id);
        Ok(())
    }

    /// Deselects `id`, releasing its lock and abandoning any gesture on it.
    pub fn deselect(&mut self, id: &ObjectId) {
        if self.session.targets(id) {
            self.cancel_gesture();
        }
        self.selection.retain(|s| s != id);
        self.release_own(id);
    }

    /// Deselects everything.
    pub fn clear_selection(&mut self) {
        for id in std::mem::take(&mut self.selection) {
            if self.session.targets(&id) {
                self.cancel_gesture();
            }
            self.release_own(&id);
        }
    }

    // --- Transform gestures -------------------------------------------------

    /// Starts dragging or rotating `id`.
    pub fn begin_gesture(
        &mut self,
        id: &ObjectId,
        mode: TransformMode,
        now: Instant,
    ) -> Result<(), LayoutError> {
        self.ensure_not_locked_by_other(id, now)?;
        self.session.begin(id, mode, &self.layout)?;
        if !self.selection.contains(id) {
            self.selection.push(id.clone());
        }
        self.acquire(id);
        self.moves.reset();
        self.previewed = false;
        debug!(object = %id, ?mode, "gesture started");
        Ok(())
    }

    /// Feeds one pointer event to the active gesture.
    ///
    /// Preview moves are broadcast through the move throttle.
    pub fn drag(&mut self, input: GestureInput, now: Instant) -> Result<TickOutcome, LayoutError> {
        let before = self.session.gesture().map(|g| g.preview);
        let toggles = SnapToggles {
            walls: self.prefs.snap_to_walls,
            edges: self.prefs.snap_to_edges,
        };
        let outcome = self
            .session
            .tick(input, &self.layout, &self.tuning, toggles)?;
        let pose = outcome.pose();
        if before != Some(pose) {
            if let Some(g) = self.session.gesture() {
                let event = MoveEvent::new(g.object_id.clone(), pose);
                if let Some(event) = self.moves.offer(event, now) {
                    self.outbox.push(Outbound::FurnitureMove(event));
                }
                self.previewed = true;
            }
        }
        if let TickOutcome::Reverted { other, .. } = &outcome {
            debug!(%other, "preview reverted on collision");
        }
        Ok(outcome)
    }

    /// Ends the active gesture, committing or reverting it.
    pub fn end_gesture(&mut self, now: Instant) -> Result<GestureOutcome, LayoutError> {
        let outcome = self.session.end(&self.layout, &self.tuning)?;
        match &outcome {
            GestureOutcome::Committed { id, pose } => {
                let changed = self.layout.get(id).is_some_and(|o| o.pose() != *pose);
                if changed {
                    if let Some(obj) = self.layout.get_mut(id) {
                        obj.set_pose(*pose);
                    }
                    self.commit_layout();
                }
                if changed || self.previewed {
                    let last = self.moves.flush(MoveEvent::new(id.clone(), *pose));
                    self.outbox.push(Outbound::FurnitureMove(last));
                } else {
                    self.moves.reset();
                }
                info!(object = %id, changed, "transform committed");
            }
            GestureOutcome::Reverted {
                id,
                restored,
                reason,
            } => {
                let current = self.layout.get(id).map_or(*restored, PlacedObject::pose);
                let last = self.moves.flush(MoveEvent::new(id.clone(), current));
                if self.previewed {
                    self.outbox.push(Outbound::FurnitureMove(last));
                }
                warn!(object = %id, ?reason, "transform reverted");
                self.notify(
                    ToastKind::Warn,
                    ToastScope::Local,
                    "Move reverted",
                    Some(reason.clone().into_error(id.clone()).to_string()),
                    now,
                );
            }
        }
        let id = match &outcome {
            GestureOutcome::Committed { id, .. } | GestureOutcome::Reverted { id, .. } => {
                id.clone()
            }
        };
        self.release_own(&id);
        self.previewed = false;
        Ok(outcome)
    }

    /// Abandons the active gesture; the layout was never touched.
    ///
    /// Peers that saw previews receive the committed pose again.
    pub fn cancel_gesture(&mut self) -> Option<Gesture> {
        let gesture = self.session.cancel()?;
        self.moves.reset();
        if self.previewed {
            if let Some(obj) = self.layout.get(&gesture.object_id) {
                self.outbox
                    .push(Outbound::FurnitureMove(MoveEvent::new(obj.id.clone(), obj.pose())));
            }
        }
        self.previewed = false;
        self.release_own(&gesture.object_id);
        debug!(object = %gesture.object_id, "gesture cancelled");
        Some(gesture)
    }

    /// Turns the most recently selected object by +90° as a one-step rotate gesture.
    pub fn rotate_selected(&mut self, now: Instant) -> Result<GestureOutcome, LayoutError> {
        let id = self
            .selection
            .last()
            .cloned()
            .ok_or(LayoutError::NothingSelected)?;
        let pose = self
            .layout
            .get(&id)
            .map(PlacedObject::pose)
            .ok_or_else(|| LayoutError::UnknownObject(id.clone()))?;
        self.begin_gesture(&id, TransformMode::Rotate, now)?;
        let input = GestureInput {
            position: pose.position,
            rotation: Euler::yaw(pose.rotation_y + 90.0),
        };
        if let Err(err) = self.drag(input, now) {
            self.cancel_gesture();
            return Err(err);
        }
        self.end_gesture(now)
    }

    // --- Object set ---------------------------------------------------------

    /// Adds an object, settling it inside the room first.
    ///
    /// Adds are never refused for overlapping: the object is flagged as
    /// colliding instead.
    pub fn add_object(&mut self, obj: PlacedObject) -> Result<ObjectId, LayoutError> {
        obj.check_numbers().map_err(LayoutError::invalid)?;
        if self.layout.contains(&obj.id) {
            return Err(LayoutError::DuplicateObject(obj.id));
        }
        let mut obj = obj;
        obj.rotation_y = normalize_degrees(obj.rotation_y);
        let room = *self.layout.room();
        let y = clamp_height(&obj.body(), obj.position.y, &room);
        obj.position = obj.position.with_y(y);
        obj.position = settle(&obj.body(), &room, &self.tuning);
        let id = obj.id.clone();
        self.layout.insert(obj)?;
        self.commit_layout();
        if let Some(added) = self.layout.get(&id) {
            self.outbox.push(Outbound::FurnitureAdd(added.clone()));
        }
        info!(object = %id, "object added");
        Ok(id)
    }

    /// Places a new copy of `item` at the room center at its mount's drop height.
    pub fn place_from_catalog(&mut self, item: &CatalogItem) -> Result<ObjectId, LayoutError> {
        let y = match item.mount {
            MountType::Floor => item.origin.ground_y(item.footprint.height),
            MountType::Wall => self.tuning.wall_drop_height,
            MountType::Surface => self.tuning.surface_drop_height,
        };
        let mut obj = PlacedObject::new(
            self.fresh_id(&item.kind),
            item.kind.clone(),
            Position::new(0.0, y, 0.0),
            item.footprint,
            item.mount,
        );
        obj.origin = item.origin;
        self.add_object(obj)
    }

    /// Removes `id` from the layout.
    pub fn delete_object(
        &mut self,
        id: &ObjectId,
        now: Instant,
    ) -> Result<PlacedObject, LayoutError> {
        if !self.layout.contains(id) {
            return Err(LayoutError::UnknownObject(id.clone()));
        }
        self.ensure_not_locked_by_other(id, now)?;
        self.forget(id);
        let removed = self
            .layout
            .remove(id)
            .ok_or_else(|| LayoutError::UnknownObject(id.clone()))?;
        self.commit_layout();
        self.outbox.push(Outbound::FurnitureDelete(ObjectRef {
            object_id: id.clone(),
        }));
        info!(object = %id, "object deleted");
        Ok(removed)
    }

    /// Removes every selected object that is not locked by someone else.
    pub fn delete_selected(&mut self, now: Instant) -> Vec<ObjectId> {
        let targets = self.selection.clone();
        let mut deleted = Vec::with_capacity(targets.len());
        for id in targets {
            match self.delete_object(&id, now) {
                Ok(_) => deleted.push(id),
                Err(err) => debug!(object = %id, %err, "delete skipped"),
            }
        }
        deleted
    }

    /// Copies the selected objects to the clipboard.
    pub fn copy_selected(&mut self, now: Instant) -> usize {
        self.clipboard = self
            .selection
            .iter()
            .filter_map(|id| self.layout.get(id).cloned())
            .collect();
        let n = self.clipboard.len();
        if n > 0 {
            self.notify(
                ToastKind::Info,
                ToastScope::Local,
                format!("Copied {n} object(s)"),
                None,
                now,
            );
        }
        n
    }

    /// Adds clipboard copies under new ids, offset on X and Z.
    pub fn paste(&mut self, now: Instant) -> Vec<ObjectId> {
        let offset = self.tuning.paste_offset;
        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for source in self.clipboard.clone() {
            let copy = PlacedObject {
                id: self.fresh_id(&source.kind),
                position: source.position.offset_xz(offset, offset),
                colliding: false,
                ..source
            };
            match self.add_object(copy) {
                Ok(id) => pasted.push(id),
                Err(err) => warn!(%err, "paste skipped an object"),
            }
        }
        if pasted.is_empty() {
            self.notify(ToastKind::Info, ToastScope::Local, "Clipboard is empty", None, now);
        } else {
            self.notify(
                ToastKind::Success,
                ToastScope::Local,
                format!("Pasted {} object(s)", pasted.len()),
                None,
                now,
            );
        }
        pasted
    }

    // --- History ------------------------------------------------------------

    /// Restores the previous snapshot. Not broadcast.
    pub fn undo(&mut self, now: Instant) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.layout.restore(&snapshot);
        self.prune_selection();
        self.notify(ToastKind::Info, ToastScope::Local, "Undo", None, now);
        true
    }

    /// Re-applies the next snapshot. Not broadcast.
    pub fn redo(&mut self, now: Instant) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.layout.restore(&snapshot);
        self.prune_selection();
        self.notify(ToastKind::Info, ToastScope::Local, "Redo", None, now);
        true
    }

    // --- Room and reports ---------------------------------------------------

    /// Accepts late room dimensions; only future validations see them.
    pub fn set_room(&mut self, room: Room) -> Result<(), LayoutError> {
        if !room.is_valid() {
            return Err(LayoutError::invalid("room dimensions must be finite and non-negative"));
        }
        self.layout.set_room(room);
        Ok(())
    }

    /// Full-layout audit.
    pub fn audit(&self) -> LayoutReport {
        audit_layout(self.layout.objects(), self.layout.room(), &self.tuning)
    }

    /// Persistence document of the committed layout.
    pub fn export_layout(&self) -> LayoutDocument {
        self.layout.to_document()
    }

    // --- Collaboration ------------------------------------------------------

    /// Applies one event from the hub.
    ///
    /// Invalid events are dropped without touching state and reported as
    /// [`LayoutError::InvalidPose`].
    pub fn apply_inbound(&mut self, msg: Inbound, now: Instant) -> Result<(), LayoutError> {
        if let Err(err) = msg.validate() {
            warn!(op = msg.op_name(), %err, "dropping inbound event");
            return Err(err);
        }
        debug!(op = msg.op_name(), "inbound event");
        match msg {
            Inbound::FurnitureAdded(mut obj) => {
                if self.layout.contains(&obj.id) {
                    debug!(object = %obj.id, "duplicate add ignored");
                    return Ok(());
                }
                obj.rotation_y = normalize_degrees(obj.rotation_y);
                self.layout.insert(obj)?;
                self.commit_layout();
            }
            Inbound::FurnitureDeleted(r) => {
                if !self.layout.contains(&r.object_id) {
                    return Ok(());
                }
                self.forget(&r.object_id);
                self.layout.remove(&r.object_id);
                self.commit_layout();
            }
            Inbound::FurnitureUpdated(m) => {
                let Some(obj) = self.layout.get_mut(&m.object_id) else {
                    debug!(object = %m.object_id, "update for unknown object ignored");
                    return Ok(());
                };
                obj.set_pose(m.pose());
                self.commit_layout();
            }
            Inbound::ObjectLocked(entry) => {
                let foreign = entry.holder_id != self.me;
                self.locks
                    .insert(entry.object_id.clone(), entry.holder_id.clone());
                if foreign && self.selection.contains(&entry.object_id) {
                    self.lose_lock(&entry.object_id, &entry.holder_id, now);
                }
            }
            Inbound::ObjectUnlocked(r) => {
                self.locks.release(&r.object_id);
            }
            Inbound::LockRejected(entry) => {
                self.locks
                    .insert(entry.object_id.clone(), entry.holder_id.clone());
                self.lose_lock(&entry.object_id, &entry.holder_id, now);
            }
            Inbound::CurrentLocks(entries) => {
                self.locks.replace_all(entries);
                let lost: Vec<(ObjectId, PeerId)> = self
                    .selection
                    .iter()
                    .filter_map(|id| {
                        self.locks
                            .held_by_other(id, &self.me)
                            .map(|h| (id.clone(), h.clone()))
                    })
                    .collect();
                for (id, holder) in lost {
                    self.lose_lock(&id, &holder, now);
                }
            }
            Inbound::PeerJoined(p) => {
                if p.peer_id != self.me && self.peers.insert(p.peer_id.clone()) {
                    self.notify(
                        ToastKind::Info,
                        ToastScope::Peer,
                        format!("{} joined", p.peer_id),
                        None,
                        now,
                    );
                }
            }
            Inbound::PeerLeft(p) => {
                self.peers.remove(&p.peer_id);
                let freed = self.locks.release_all_held_by(&p.peer_id);
                debug!(peer = %p.peer_id, freed = freed.len(), "peer left");
                self.notify(
                    ToastKind::Info,
                    ToastScope::Peer,
                    format!("{} left", p.peer_id),
                    None,
                    now,
                );
            }
        }
        Ok(())
    }

    /// Releases a throttled move if due and expires old notifications.
    pub fn poll(&mut self, now: Instant) {
        if let Some(event) = self.moves.poll(now) {
            self.outbox.push(Outbound::FurnitureMove(event));
        }
        self.toasts.retain_visible(now);
    }

    // --- Internals ----------------------------------------------------------

    fn commit_layout(&mut self) {
        self.layout.recompute_collisions(&self.tuning);
        self.history.commit(self.layout.snapshot());
    }

    fn acquire(&mut self, id: &ObjectId) {
        let already = self.locks.holder(id) == Some(&self.me);
        if self.locks.request(id, &self.me) == LockDecision::Granted && !already {
            self.outbox.push(Outbound::RequestLock(ObjectRef {
                object_id: id.clone(),
            }));
        }
    }

    fn release_own(&mut self, id: &ObjectId) {
        if self.locks.release_if_holder(id, &self.me) {
            self.outbox.push(Outbound::ReleaseLock(ObjectRef {
                object_id: id.clone(),
            }));
        }
    }

    fn ensure_not_locked_by_other(
        &mut self,
        id: &ObjectId,
        now: Instant,
    ) -> Result<(), LayoutError> {
        if let Some(holder) = self.locks.held_by_other(id, &self.me).cloned() {
            self.lose_lock(id, &holder, now);
            return Err(LayoutError::LockDenied {
                id: id.clone(),
                holder,
            });
        }
        Ok(())
    }

    /// Drops local interest in an object someone else holds. Sends nothing.
    fn lose_lock(&mut self, id: &ObjectId, holder: &PeerId, now: Instant) {
        if self.session.targets(id) {
            self.session.cancel();
            self.moves.reset();
            self.previewed = false;
        }
        self.selection.retain(|s| s != id);
        warn!(object = %id, %holder, "lock denied");
        self.notify(
            ToastKind::Warn,
            ToastScope::Peer,
            "Object is being edited",
            Some(format!("{id} is locked by {holder}")),
            now,
        );
    }

    /// Clears every local reference to an object about to disappear.
    fn forget(&mut self, id: &ObjectId) {
        if self.session.targets(id) {
            self.session.cancel();
            self.moves.reset();
            self.previewed = false;
        }
        self.selection.retain(|s| s != id);
        self.locks.release(id);
    }

    fn prune_selection(&mut self) {
        let gone: Vec<ObjectId> = self
            .selection
            .iter()
            .filter(|id| !self.layout.contains(id))
            .cloned()
            .collect();
        for id in gone {
            self.deselect(&id);
        }
    }

    fn fresh_id(&mut self, kind: &str) -> ObjectId {
        loop {
            let id = ObjectId::new(format!("{kind}-{}-{}", self.me, self.next_local_id));
            self.next_local_id += 1;
            if !self.layout.contains(&id) {
                return id;
            }
        }
    }

    fn notify(
        &mut self,
        kind: ToastKind,
        scope: ToastScope,
        title: impl Into<String>,
        body: Option<String>,
        now: Instant,
    ) {
        self.toasts
            .push(kind, scope, title, body, self.prefs.toast_ttl(), now);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn room() -> Room {
        Room::new(10.0, 8.0, 3.0)
    }

    fn table(id: &str, x: f32) -> PlacedObject {
        PlacedObject::new(
            id,
            "table",
            Position::new(x, 0.5, 0.0),
            Footprint::new(2.0, 1.0, 2.0),
            MountType::Floor,
        )
    }

    #[test]
    fn selection_requests_and_deselection_releases_the_lock() {
        let mut ed = Editor::new("me".into(), room(), vec![table("a", -3.0)]);
        let a = ObjectId::from("a");
        ed.select(&a, false, Instant::now()).unwrap();
        assert_eq!(ed.locks().holder(&a), Some(&PeerId::from("me")));
        ed.deselect(&a);
        assert!(ed.locks().is_empty());
        assert_eq!(
            ed.drain_outbox(),
            vec![
                Outbound::RequestLock(ObjectRef {
                    object_id: a.clone()
                }),
                Outbound::ReleaseLock(ObjectRef { object_id: a }),
            ]
        );
    }

    #[test]
    fn undo_without_history_is_a_no_op() {
        let mut ed = Editor::new("me".into(), room(), vec![]);
        assert!(!ed.undo(Instant::now()));
        assert!(!ed.redo(Instant::now()));
    }

    #[test]
    fn fresh_ids_skip_taken_ones() {
        let mut ed = Editor::new("me".into(), room(), vec![table("table-me-1", 0.0)]);
        assert_eq!(ed.fresh_id("table"), ObjectId::from("table-me-2"));
    }
}
