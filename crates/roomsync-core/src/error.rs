// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use roomsync_geom::Axis;
use thiserror::Error;

use crate::model::{ObjectId, PeerId};

/// Errors raised by layout operations.
///
/// None of these are fatal: boundary and collision violations are recovered
/// locally, lock denials deselect, and invalid poses drop the offending input.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A pose leaves the room (or the fallback boundary).
    #[error("object {id} leaves the room on {axis} by {overshoot:.3} m")]
    BoundaryViolation {
        /// Offending object.
        id: ObjectId,
        /// Axis that overshoots.
        axis: Axis,
        /// Distance past the allowed boundary.
        overshoot: f32,
    },
    /// A pose overlaps another object in the same collision domain.
    #[error("object {id} collides with {other}")]
    CollisionViolation {
        /// Offending object.
        id: ObjectId,
        /// First object it collides with.
        other: ObjectId,
    },
    /// Another participant holds the object's lock.
    #[error("object {id} is locked by {holder}")]
    LockDenied {
        /// Locked object.
        id: ObjectId,
        /// Current lock holder.
        holder: PeerId,
    },
    /// Non-finite or out-of-range numbers at an ingestion boundary.
    #[error("invalid pose: {reason}")]
    InvalidPose {
        /// What was wrong.
        reason: String,
    },
    /// The object id is not in the layout.
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),
    /// The object id is already in the layout.
    #[error("object {0} already exists")]
    DuplicateObject(ObjectId),
    /// No transform gesture is active.
    #[error("no active gesture")]
    NoActiveGesture,
    /// A transform gesture is already active on the given object.
    #[error("gesture already active on {0}")]
    GestureInProgress(ObjectId),
    /// The operation needs a selection.
    #[error("nothing selected")]
    NothingSelected,
    /// Layout document did not (de)serialize.
    #[error("layout document: {0}")]
    Document(#[from] serde_json::Error),
}

impl LayoutError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidPose {
            reason: reason.into(),
        }
    }
}
