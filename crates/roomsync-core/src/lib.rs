// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! RoomSync layout engine.
//!
//! Validates proposed object poses against room walls and neighbours,
//! snaps wall objects onto walls and floor objects edge-to-edge, runs
//! per-gesture transform sessions, keeps bounded undo/redo history and
//! mirrors the per-object lock table shared with collaborators.
//!
//! The crate is transport-free: [`Editor`] queues [`Outbound`] events and
//! consumes [`Inbound`] ones; framing and delivery live in
//! `roomsync-proto` and `roomsync-client`.

/// Wall push-back, settling and height clamps.
pub mod bounds;
/// Per-participant orchestrator.
pub mod editor;
/// Error taxonomy.
pub mod error;
/// Typed collaboration events.
pub mod events;
/// Undo/redo history.
pub mod history;
/// Object lock table.
pub mod locks;
/// Room and object model.
pub mod model;
/// Transform gestures.
pub mod session;
/// Wall and edge snapping.
pub mod snap;
/// Committed layout state and persistence document.
pub mod state;
/// Move broadcast throttle.
pub mod throttle;
/// Tunable constants.
pub mod tuning;
/// Pose validation and collision flags.
pub mod validate;

pub use editor::{CatalogItem, Editor};
pub use error::LayoutError;
pub use events::{Inbound, MoveEvent, ObjectRef, Outbound, PeerRef};
pub use history::History;
pub use locks::{LockDecision, LockEntry, LockTable};
pub use model::{Euler, ObjectId, PeerId, PlacedObject, Pose, Room};
pub use session::{
    Gesture, GestureInput, GestureOutcome, SnapToggles, TickOutcome, TransformMode,
    TransformSession,
};
pub use snap::{SnapOutcome, Wall};
pub use state::{LayoutDocument, LayoutSnapshot, LayoutState};
pub use throttle::Throttle;
pub use tuning::LayoutTuning;
pub use validate::{audit_layout, validate, LayoutReport, Rejection, Verdict};
