// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transform session state machine.
//!
//! `Idle -> Active(object) -> {Committed | Reverted} -> Idle`.
//!
//! The session owns the uncommitted pose; the layout is only borrowed. Each
//! pointer event runs: yaw lock, mount-type height clamp, snapping
//! (translation only), validation, then push-correction on a boundary
//! rejection or a revert to the last valid pose on a collision.

use roomsync_geom::Position;

use crate::bounds::{clamp_height, push_correct, settle};
use crate::error::LayoutError;
use crate::model::{Euler, ObjectId, Pose};
use crate::snap::snap;
use crate::state::LayoutState;
use crate::tuning::LayoutTuning;
use crate::validate::{find_collision, validate, Rejection, Verdict};

/// Gizmo mode of a gesture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransformMode {
    /// Dragging the object around.
    Translate,
    /// Turning the object about Y.
    Rotate,
}

/// One pointer event from the gizmo.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GestureInput {
    /// Proposed position.
    pub position: Position,
    /// Proposed rotation; pitch and roll are discarded.
    pub rotation: Euler,
}

impl GestureInput {
    /// Input with a pure yaw rotation.
    pub const fn new(position: Position, rotation_y: f32) -> Self {
        Self {
            position,
            rotation: Euler::yaw(rotation_y),
        }
    }
}

/// Snap toggles for a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SnapToggles {
    /// Pull wall objects onto walls.
    pub walls: bool,
    /// Align floor objects edge-to-edge.
    pub edges: bool,
}

impl Default for SnapToggles {
    fn default() -> Self {
        Self {
            walls: true,
            edges: true,
        }
    }
}

/// Result of one pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The (possibly snapped) pose was valid.
    Accepted(Pose),
    /// The pose crossed a wall and was pushed back flush.
    Corrected(Pose),
    /// The pose collided; the preview returned to the last valid pose.
    Reverted {
        /// Pose now shown.
        pose: Pose,
        /// Object hit.
        other: ObjectId,
    },
}

impl TickOutcome {
    /// Pose the preview shows after the event.
    pub fn pose(&self) -> Pose {
        match self {
            Self::Accepted(p) | Self::Corrected(p) | Self::Reverted { pose: p, .. } => *p,
        }
    }
}

/// Result of ending a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// The final pose is valid and should be written to the layout.
    Committed {
        /// Object moved.
        id: ObjectId,
        /// Pose to commit.
        pose: Pose,
    },
    /// The final pose failed validation; the layout stays untouched.
    Reverted {
        /// Object moved.
        id: ObjectId,
        /// Pose recorded when the gesture began.
        restored: Pose,
        /// Why the final pose failed.
        reason: Rejection,
    },
}

/// Book-keeping of an active gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    /// Object being transformed.
    pub object_id: ObjectId,
    /// Gizmo mode.
    pub mode: TransformMode,
    /// Pose at `Active` entry.
    pub origin: Pose,
    /// Most recent pose that passed validation (or push-correction).
    pub last_valid: Pose,
    /// Pose the preview currently shows.
    pub preview: Pose,
}

impl Gesture {
    /// Returns `true` if the preview has left the starting pose.
    pub fn has_moved(&self) -> bool {
        self.preview != self.origin
    }
}

/// Per-gesture transform state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TransformSession {
    /// No gesture.
    #[default]
    Idle,
    /// A gesture is in progress.
    Active(Gesture),
}

impl TransformSession {
    /// The active gesture, if any.
    pub fn gesture(&self) -> Option<&Gesture> {
        match self {
            Self::Idle => None,
            Self::Active(g) => Some(g),
        }
    }

    /// Returns `true` while a gesture is active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Returns `true` if the active gesture targets `id`.
    pub fn targets(&self, id: &ObjectId) -> bool {
        self.gesture().is_some_and(|g| &g.object_id == id)
    }

    /// Enters `Active` for `id`, recording its current pose.
    pub fn begin(
        &mut self,
        id: &ObjectId,
        mode: TransformMode,
        layout: &LayoutState,
    ) -> Result<(), LayoutError> {
        if let Self::Active(g) = self {
            return Err(LayoutError::GestureInProgress(g.object_id.clone()));
        }
        let obj = layout
            .get(id)
            .ok_or_else(|| LayoutError::UnknownObject(id.clone()))?;
        let pose = obj.pose();
        *self = Self::Active(Gesture {
            object_id: id.clone(),
            mode,
            origin: pose,
            last_valid: pose,
            preview: pose,
        });
        Ok(())
    }

    /// Processes one pointer event.
    ///
    /// Non-finite input is refused without touching the preview.
    pub fn tick(
        &mut self,
        input: GestureInput,
        layout: &LayoutState,
        tuning: &LayoutTuning,
        toggles: SnapToggles,
    ) -> Result<TickOutcome, LayoutError> {
        let Self::Active(gesture) = self else {
            return Err(LayoutError::NoActiveGesture);
        };
        if !input.position.is_finite() || !input.rotation.is_finite() {
            return Err(LayoutError::invalid("non-finite gesture input"));
        }
        let obj = layout
            .get(&gesture.object_id)
            .ok_or_else(|| LayoutError::UnknownObject(gesture.object_id.clone()))?;
        let room = layout.room();

        let mut pose = Pose::new(input.position, input.rotation.y);
        let y = clamp_height(&obj.body_at(pose), pose.position.y, room);
        pose.position = pose.position.with_y(y);

        if gesture.mode == TransformMode::Translate {
            let body = obj.body_at(pose);
            let wants_snap = match body.mount {
                roomsync_geom::MountType::Floor => toggles.edges,
                roomsync_geom::MountType::Wall => toggles.walls,
                roomsync_geom::MountType::Surface => false,
            };
            if wants_snap {
                pose.position = snap(&obj.id, &body, layout.objects(), room, tuning).position;
            }
        }

        let body = obj.body_at(pose);
        let outcome = match validate(&obj.id, &body, layout.objects(), room, tuning) {
            Verdict::Accepted => TickOutcome::Accepted(pose),
            Verdict::Rejected(Rejection::Boundary { .. }) => {
                let corrected = Pose {
                    position: push_correct(&body, room, tuning),
                    ..pose
                };
                match find_collision(&obj.id, &obj.body_at(corrected), layout.objects(), tuning) {
                    None => TickOutcome::Corrected(corrected),
                    Some(other) => TickOutcome::Reverted {
                        pose: gesture.last_valid,
                        other,
                    },
                }
            }
            Verdict::Rejected(Rejection::Collision { other }) => TickOutcome::Reverted {
                pose: gesture.last_valid,
                other,
            },
        };

        match &outcome {
            TickOutcome::Accepted(p) | TickOutcome::Corrected(p) => {
                gesture.last_valid = *p;
                gesture.preview = *p;
            }
            TickOutcome::Reverted { pose, .. } => gesture.preview = *pose,
        }
        Ok(outcome)
    }

    /// Ends the gesture: settles the last valid pose inside the wall margin
    /// and validates it in full.
    pub fn end(
        &mut self,
        layout: &LayoutState,
        tuning: &LayoutTuning,
    ) -> Result<GestureOutcome, LayoutError> {
        let Self::Active(gesture) = std::mem::take(self) else {
            return Err(LayoutError::NoActiveGesture);
        };
        let obj = layout
            .get(&gesture.object_id)
            .ok_or_else(|| LayoutError::UnknownObject(gesture.object_id.clone()))?;
        let room = layout.room();

        let settled = Pose {
            position: settle(&obj.body_at(gesture.last_valid), room, tuning),
            ..gesture.last_valid
        };
        match validate(&obj.id, &obj.body_at(settled), layout.objects(), room, tuning) {
            Verdict::Accepted => Ok(GestureOutcome::Committed {
                id: gesture.object_id,
                pose: settled,
            }),
            Verdict::Rejected(reason) => Ok(GestureOutcome::Reverted {
                id: gesture.object_id,
                restored: gesture.origin,
                reason,
            }),
        }
    }

    /// Abandons the gesture, returning it so the caller can restore the preview.
    pub fn cancel(&mut self) -> Option<Gesture> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Active(g) => Some(g),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{PlacedObject, Room};
    use roomsync_geom::{Footprint, MountType};

    fn layout() -> LayoutState {
        LayoutState::new(
            Room::new(10.0, 8.0, 3.0),
            vec![
                PlacedObject::new(
                    "a",
                    "table",
                    Position::new(0.0, 0.5, 0.0),
                    Footprint::new(2.0, 1.0, 2.0),
                    MountType::Floor,
                ),
                PlacedObject::new(
                    "b",
                    "table",
                    Position::new(3.0, 0.5, 0.0),
                    Footprint::new(2.0, 1.0, 2.0),
                    MountType::Floor,
                ),
                PlacedObject::new(
                    "small",
                    "stool",
                    Position::new(-3.0, 0.5, 2.0),
                    Footprint::new(0.2, 1.0, 0.2),
                    MountType::Floor,
                ),
            ],
        )
    }

    fn no_snap() -> SnapToggles {
        SnapToggles {
            walls: false,
            edges: false,
        }
    }

    #[test]
    fn collision_reverts_to_last_valid_pose() {
        let layout = layout();
        let tuning = LayoutTuning::default();
        let mut s = TransformSession::default();
        let b = ObjectId::from("b");
        s.begin(&b, TransformMode::Translate, &layout).unwrap();

        let ok = s
            .tick(GestureInput::new(Position::new(3.5, 0.0, 1.0), 0.0), &layout, &tuning, no_snap())
            .unwrap();
        assert!(matches!(ok, TickOutcome::Accepted(_)));
        // Floor objects are pinned to their ground height.
        assert_eq!(ok.pose().position.y, 0.5);

        let hit = s
            .tick(GestureInput::new(Position::new(1.0, 0.0, 0.0), 0.0), &layout, &tuning, no_snap())
            .unwrap();
        assert_eq!(
            hit,
            TickOutcome::Reverted {
                pose: ok.pose(),
                other: ObjectId::from("a")
            }
        );
    }

    #[test]
    fn boundary_overshoot_is_pushed_flush_then_settled_on_release() {
        let layout = layout();
        let tuning = LayoutTuning::default();
        let mut s = TransformSession::default();
        let id = ObjectId::from("small");
        s.begin(&id, TransformMode::Translate, &layout).unwrap();

        let out = s
            .tick(
                GestureInput::new(Position::new(4.96, 0.0, 2.0), 0.0),
                &layout,
                &tuning,
                no_snap(),
            )
            .unwrap();
        let TickOutcome::Corrected(pose) = out else {
            panic!("expected a corrected pose, got {out:?}");
        };
        assert!((pose.position.x - 4.9).abs() < 1e-5);

        match s.end(&layout, &tuning).unwrap() {
            GestureOutcome::Committed { pose, .. } => {
                assert!((pose.position.x - 4.85).abs() < 1e-5);
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert!(!s.is_active());
    }

    #[test]
    fn rotation_drops_pitch_and_roll_and_uses_rotated_footprint() {
        let layout = layout();
        let tuning = LayoutTuning::default();
        let mut s = TransformSession::default();
        let b = ObjectId::from("b");
        s.begin(&b, TransformMode::Rotate, &layout).unwrap();
        let input = GestureInput {
            position: Position::new(3.0, 0.5, 0.0),
            rotation: Euler {
                x: 12.0,
                y: -90.0,
                z: 4.0,
            },
        };
        let out = s.tick(input, &layout, &tuning, no_snap()).unwrap();
        assert_eq!(out.pose().rotation_y, 270.0);
    }

    #[test]
    fn end_reverts_when_the_final_pose_is_invalid() {
        let mut layout = layout();
        let tuning = LayoutTuning::default();
        let mut s = TransformSession::default();
        let b = ObjectId::from("b");
        s.begin(&b, TransformMode::Translate, &layout).unwrap();
        s.tick(GestureInput::new(Position::new(2.5, 0.0, 0.0), 0.0), &layout, &tuning, no_snap())
            .unwrap();
        // A peer drops an object onto the spot before release.
        layout
            .insert(PlacedObject::new(
                "c",
                "crate",
                Position::new(2.5, 0.5, 0.0),
                Footprint::new(1.0, 1.0, 1.0),
                MountType::Floor,
            ))
            .unwrap();
        let out = s.end(&layout, &tuning).unwrap();
        assert_eq!(
            out,
            GestureOutcome::Reverted {
                id: b,
                restored: Pose::new(Position::new(3.0, 0.5, 0.0), 0.0),
                reason: Rejection::Collision {
                    other: ObjectId::from("c")
                },
            }
        );
    }

    #[test]
    fn non_finite_input_is_refused_without_moving_the_preview() {
        let layout = layout();
        let tuning = LayoutTuning::default();
        let mut s = TransformSession::default();
        s.begin(&ObjectId::from("b"), TransformMode::Translate, &layout)
            .unwrap();
        let err = s.tick(
            GestureInput::new(Position::new(f32::NAN, 0.0, 0.0), 0.0),
            &layout,
            &tuning,
            no_snap(),
        );
        assert!(matches!(err, Err(LayoutError::InvalidPose { .. })));
        assert!(!s.gesture().is_some_and(Gesture::has_moved));
    }

    #[test]
    fn second_begin_is_refused() {
        let layout = layout();
        let mut s = TransformSession::default();
        s.begin(&ObjectId::from("a"), TransformMode::Translate, &layout)
            .unwrap();
        assert!(matches!(
            s.begin(&ObjectId::from("b"), TransformMode::Translate, &layout),
            Err(LayoutError::GestureInProgress(_))
        ));
        assert!(s.cancel().is_some());
        assert!(s.cancel().is_none());
    }
}
