// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared layout state and its persistence document.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::model::{ObjectId, PlacedObject, Room};
use crate::tuning::LayoutTuning;
use crate::validate::recompute_collisions;

/// Immutable copy of the full object set at a commit point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    objects: Vec<PlacedObject>,
}

impl LayoutSnapshot {
    /// Objects in layout order.
    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    /// Number of objects in the snapshot.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the snapshot holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Serialized layout: `{"furnitures": [...]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Every placed object.
    pub furnitures: Vec<PlacedObject>,
}

impl LayoutDocument {
    /// Renders the document as pretty JSON.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and checks a JSON document.
    ///
    /// Objects with non-finite numbers or duplicate ids reject the whole
    /// document.
    pub fn from_json(raw: &str) -> Result<Self, LayoutError> {
        let doc: Self = serde_json::from_str(raw)?;
        let mut seen = std::collections::BTreeSet::new();
        for obj in &doc.furnitures {
            obj.check_numbers().map_err(LayoutError::invalid)?;
            if !seen.insert(&obj.id) {
                return Err(LayoutError::DuplicateObject(obj.id.clone()));
            }
        }
        Ok(doc)
    }
}

/// The room and the committed object set.
///
/// Only the editor mutates it, at commit points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutState {
    room: Room,
    objects: Vec<PlacedObject>,
}

impl LayoutState {
    /// Creates a layout, dropping later duplicates of an id.
    pub fn new(room: Room, objects: Vec<PlacedObject>) -> Self {
        let mut state = Self {
            room,
            objects: Vec::with_capacity(objects.len()),
        };
        for obj in objects {
            if !state.contains(&obj.id) {
                state.objects.push(obj);
            }
        }
        state
    }

    /// Room dimensions.
    pub fn room(&self) -> &Room {
        &self.room
    }

    /// Replaces the room; only future validations see the change.
    pub fn set_room(&mut self, room: Room) {
        self.room = room;
    }

    /// Objects in layout order.
    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    /// Looks up an object.
    pub fn get(&self, id: &ObjectId) -> Option<&PlacedObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    /// Looks up an object mutably.
    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut PlacedObject> {
        self.objects.iter_mut().find(|o| &o.id == id)
    }

    /// Returns `true` if `id` is in the layout.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Appends an object.
    pub fn insert(&mut self, obj: PlacedObject) -> Result<(), LayoutError> {
        if self.contains(&obj.id) {
            return Err(LayoutError::DuplicateObject(obj.id));
        }
        self.objects.push(obj);
        Ok(())
    }

    /// Removes an object, returning it.
    pub fn remove(&mut self, id: &ObjectId) -> Option<PlacedObject> {
        let idx = self.objects.iter().position(|o| &o.id == id)?;
        Some(self.objects.remove(idx))
    }

    /// Refreshes every derived collision flag.
    pub fn recompute_collisions(&mut self, tuning: &LayoutTuning) -> bool {
        recompute_collisions(&mut self.objects, tuning)
    }

    /// Deep copy of the object set.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            objects: self.objects.clone(),
        }
    }

    /// Replaces the object set with a snapshot's.
    pub fn restore(&mut self, snapshot: &LayoutSnapshot) {
        self.objects.clone_from(&snapshot.objects);
    }

    /// Persistence document of the current objects.
    pub fn to_document(&self) -> LayoutDocument {
        LayoutDocument {
            furnitures: self.objects.clone(),
        }
    }
}
