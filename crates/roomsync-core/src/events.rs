// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed collaboration events.
//!
//! [`Outbound`] is what an editor asks the hub to do; [`Inbound`] is what the
//! hub tells an editor. Both carry plain serde payloads so the wire crate can
//! frame them without knowing layout rules.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::locks::LockEntry;
use crate::model::{Euler, ObjectId, PeerId, PlacedObject, Pose};
use roomsync_geom::Position;

/// Pose broadcast for one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveEvent {
    /// Object moved.
    pub object_id: ObjectId,
    /// New position.
    pub position: Position,
    /// New rotation; only yaw is meaningful.
    pub rotation: Euler,
}

impl MoveEvent {
    /// Event for `pose` of `object_id`.
    pub fn new(object_id: ObjectId, pose: Pose) -> Self {
        Self {
            object_id,
            position: pose.position,
            rotation: Euler::yaw(pose.rotation_y),
        }
    }

    /// Yaw-only pose carried by the event.
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation.y)
    }

    fn check(&self) -> Result<(), LayoutError> {
        if !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(LayoutError::invalid(format!(
                "non-finite move for {}",
                self.object_id
            )));
        }
        Ok(())
    }
}

/// Payload naming a single object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Object concerned.
    pub object_id: ObjectId,
}

/// Payload naming a single participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRef {
    /// Participant concerned.
    pub peer_id: PeerId,
}

/// Editor → hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outbound {
    /// A new object was placed.
    FurnitureAdd(PlacedObject),
    /// An object was removed.
    FurnitureDelete(ObjectRef),
    /// An object's pose changed (throttled while dragging).
    FurnitureMove(MoveEvent),
    /// Ask for an object's lock.
    RequestLock(ObjectRef),
    /// Give an object's lock back.
    ReleaseLock(ObjectRef),
}

impl Outbound {
    /// Canonical op string.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::FurnitureAdd(_) => "furniture_add",
            Self::FurnitureDelete(_) => "furniture_delete",
            Self::FurnitureMove(_) => "furniture_move",
            Self::RequestLock(_) => "request_lock",
            Self::ReleaseLock(_) => "release_lock",
        }
    }

    /// Object the event is about.
    pub fn object_id(&self) -> &ObjectId {
        match self {
            Self::FurnitureAdd(o) => &o.id,
            Self::FurnitureMove(m) => &m.object_id,
            Self::FurnitureDelete(r) | Self::RequestLock(r) | Self::ReleaseLock(r) => &r.object_id,
        }
    }

    /// Rejects non-finite numbers before the event is relayed.
    pub fn validate(&self) -> Result<(), LayoutError> {
        match self {
            Self::FurnitureAdd(o) => o.check_numbers().map_err(LayoutError::invalid),
            Self::FurnitureMove(m) => m.check(),
            Self::FurnitureDelete(_) | Self::RequestLock(_) | Self::ReleaseLock(_) => Ok(()),
        }
    }

    /// The form peers receive when the hub relays this event.
    ///
    /// Lock traffic is answered by the hub instead of relayed.
    pub fn into_relayed(self) -> Option<Inbound> {
        match self {
            Self::FurnitureAdd(o) => Some(Inbound::FurnitureAdded(o)),
            Self::FurnitureDelete(r) => Some(Inbound::FurnitureDeleted(r)),
            Self::FurnitureMove(m) => Some(Inbound::FurnitureUpdated(m)),
            Self::RequestLock(_) | Self::ReleaseLock(_) => None,
        }
    }
}

/// Hub → editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inbound {
    /// A peer placed an object.
    FurnitureAdded(PlacedObject),
    /// A peer removed an object.
    FurnitureDeleted(ObjectRef),
    /// A peer moved an object.
    FurnitureUpdated(MoveEvent),
    /// Someone acquired a lock.
    ObjectLocked(LockEntry),
    /// A lock was released.
    ObjectUnlocked(ObjectRef),
    /// This editor's lock request lost.
    LockRejected(LockEntry),
    /// Every lock in the project, sent on join.
    CurrentLocks(Vec<LockEntry>),
    /// A participant joined the project.
    PeerJoined(PeerRef),
    /// A participant left the project.
    PeerLeft(PeerRef),
}

impl Inbound {
    /// Canonical op string.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::FurnitureAdded(_) => "furniture_added",
            Self::FurnitureDeleted(_) => "furniture_deleted",
            Self::FurnitureUpdated(_) => "furniture_updated",
            Self::ObjectLocked(_) => "object_locked",
            Self::ObjectUnlocked(_) => "object_unlocked",
            Self::LockRejected(_) => "lock_rejected",
            Self::CurrentLocks(_) => "current_locks",
            Self::PeerJoined(_) => "peer_joined",
            Self::PeerLeft(_) => "peer_left",
        }
    }

    /// Rejects non-finite numbers at the ingestion boundary.
    pub fn validate(&self) -> Result<(), LayoutError> {
        match self {
            Self::FurnitureAdded(o) => o.check_numbers().map_err(LayoutError::invalid),
            Self::FurnitureUpdated(m) => m.check(),
            Self::FurnitureDeleted(_)
            | Self::ObjectLocked(_)
            | Self::ObjectUnlocked(_)
            | Self::LockRejected(_)
            | Self::CurrentLocks(_)
            | Self::PeerJoined(_)
            | Self::PeerLeft(_) => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn moves_relay_as_updates() {
        let m = MoveEvent::new("a".into(), Pose::new(Position::new(1.0, 0.0, 2.0), 450.0));
        assert_eq!(m.rotation.y, 90.0);
        let relayed = Outbound::FurnitureMove(m.clone()).into_relayed();
        assert_eq!(relayed, Some(Inbound::FurnitureUpdated(m)));
        assert!(Outbound::RequestLock(ObjectRef {
            object_id: "a".into()
        })
        .into_relayed()
        .is_none());
    }

    #[test]
    fn non_finite_moves_are_invalid() {
        let m = MoveEvent {
            object_id: "a".into(),
            position: Position::new(0.0, f32::INFINITY, 0.0),
            rotation: Euler::default(),
        };
        assert!(matches!(
            Inbound::FurnitureUpdated(m).validate(),
            Err(LayoutError::InvalidPose { .. })
        ));
    }
}
