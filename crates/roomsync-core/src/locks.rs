// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-object lock table.
//!
//! The same table serves as the hub's authoritative arbiter and as each
//! editor's advisory mirror of peer locks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ObjectId, PeerId};

/// One lock: `holder_id` owns `object_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    /// Locked object.
    pub object_id: ObjectId,
    /// Participant holding it.
    pub holder_id: PeerId,
}

/// Outcome of a lock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockDecision {
    /// The requester now holds the lock.
    Granted,
    /// Someone else holds it.
    Rejected {
        /// Current holder.
        holder: PeerId,
    },
}

/// At most one holder per object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockTable {
    entries: BTreeMap<ObjectId, PeerId>,
}

impl LockTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants the lock if it is free or already held by `requester`.
    pub fn request(&mut self, object_id: &ObjectId, requester: &PeerId) -> LockDecision {
        match self.entries.get(object_id) {
            Some(holder) if holder != requester => LockDecision::Rejected {
                holder: holder.clone(),
            },
            Some(_) => LockDecision::Granted,
            None => {
                self.entries.insert(object_id.clone(), requester.clone());
                LockDecision::Granted
            }
        }
    }

    /// Unconditionally removes the lock, returning the former holder.
    pub fn release(&mut self, object_id: &ObjectId) -> Option<PeerId> {
        self.entries.remove(object_id)
    }

    /// Removes the lock only if `peer` holds it.
    pub fn release_if_holder(&mut self, object_id: &ObjectId, peer: &PeerId) -> bool {
        if self.entries.get(object_id) == Some(peer) {
            self.entries.remove(object_id);
            true
        } else {
            false
        }
    }

    /// Removes every lock held by `peer`, returning the freed objects in id order.
    pub fn release_all_held_by(&mut self, peer: &PeerId) -> Vec<ObjectId> {
        let freed: Vec<ObjectId> = self
            .entries
            .iter()
            .filter(|(_, holder)| *holder == peer)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &freed {
            self.entries.remove(id);
        }
        freed
    }

    /// Records a lock reported by the hub, overwriting any previous holder.
    pub fn insert(&mut self, object_id: ObjectId, holder: PeerId) {
        self.entries.insert(object_id, holder);
    }

    /// Replaces the whole table with the hub's view.
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = LockEntry>) {
        self.entries = entries
            .into_iter()
            .map(|e| (e.object_id, e.holder_id))
            .collect();
    }

    /// Current holder of `object_id`.
    pub fn holder(&self, object_id: &ObjectId) -> Option<&PeerId> {
        self.entries.get(object_id)
    }

    /// Holder of `object_id` if it is someone other than `me`.
    pub fn held_by_other(&self, object_id: &ObjectId, me: &PeerId) -> Option<&PeerId> {
        self.holder(object_id).filter(|h| *h != me)
    }

    /// All locks in object-id order.
    pub fn snapshot(&self) -> Vec<LockEntry> {
        self.entries
            .iter()
            .map(|(object_id, holder_id)| LockEntry {
                object_id: object_id.clone(),
                holder_id: holder_id.clone(),
            })
            .collect()
    }

    /// Number of held locks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no lock is held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn second_requester_is_rejected_until_release() {
        let mut t = LockTable::new();
        let obj = ObjectId::from("sofa");
        let (a, b) = (PeerId::from("alice"), PeerId::from("bob"));
        assert_eq!(t.request(&obj, &a), LockDecision::Granted);
        assert_eq!(
            t.request(&obj, &b),
            LockDecision::Rejected { holder: a.clone() }
        );
        assert_eq!(t.request(&obj, &a), LockDecision::Granted);
        assert_eq!(t.release(&obj), Some(a));
        assert_eq!(t.request(&obj, &b), LockDecision::Granted);
    }

    #[test]
    fn release_if_holder_ignores_strangers() {
        let mut t = LockTable::new();
        let obj = ObjectId::from("desk");
        t.insert(obj.clone(), PeerId::from("alice"));
        assert!(!t.release_if_holder(&obj, &PeerId::from("bob")));
        assert!(t.release_if_holder(&obj, &PeerId::from("alice")));
        assert!(t.is_empty());
    }

    #[test]
    fn disconnect_frees_everything_the_peer_held() {
        let mut t = LockTable::new();
        let (a, b) = (PeerId::from("alice"), PeerId::from("bob"));
        t.insert("x".into(), a.clone());
        t.insert("y".into(), b.clone());
        t.insert("z".into(), a.clone());
        assert_eq!(
            t.release_all_held_by(&a),
            vec![ObjectId::from("x"), ObjectId::from("z")]
        );
        assert_eq!(
            t.snapshot(),
            vec![LockEntry {
                object_id: "y".into(),
                holder_id: b
            }]
        );
    }
}
