//! Side-table from physics shapes to their owners and receivers

use std::collections::HashMap;

use crate::foundation::collections::{EntityKey, ReceiverKey};
use crate::physics::ColliderHandle;

/// Maps shape handles to the entity owning them and to an optional receiver
///
/// The table only stores keys, so the physics world and the registry can be
/// torn down independently.
#[derive(Debug, Default)]
pub struct ShapeTable {
    owners: HashMap<ColliderHandle, EntityKey>,
    receivers: HashMap<ColliderHandle, ReceiverKey>,
}

impl ShapeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `owner` as the owner of every shape in `shapes`
    pub fn stamp(&mut self, shapes: &[ColliderHandle], owner: EntityKey) {
        for shape in shapes {
            self.owners.insert(*shape, owner);
        }
    }

    /// Forget the shapes, returning the receivers that were attached to them
    pub fn clear(&mut self, shapes: &[ColliderHandle]) -> Vec<ReceiverKey> {
        let mut detached = Vec::new();
        for shape in shapes {
            self.owners.remove(shape);
            if let Some(receiver) = self.receivers.remove(shape) {
                if !detached.contains(&receiver) {
                    detached.push(receiver);
                }
            }
        }
        detached
    }

    /// Owner of a shape, `None` for unknown obstacles
    pub fn owner(&self, shape: ColliderHandle) -> Option<EntityKey> {
        self.owners.get(&shape).copied()
    }

    /// Receiver attached to a shape
    pub fn receiver(&self, shape: ColliderHandle) -> Option<ReceiverKey> {
        self.receivers.get(&shape).copied()
    }

    /// Attach a receiver to a shape
    ///
    /// # Panics
    ///
    /// Panics if the shape already carries a receiver.
    pub fn attach(&mut self, shape: ColliderHandle, receiver: ReceiverKey) {
        if let Some(existing) = self.receivers.insert(shape, receiver) {
            panic!("shape {shape:?} already carries receiver {existing:?}");
        }
    }

    /// Number of shapes with a known owner
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no shape has an owner
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn shape(index: u32) -> ColliderHandle {
        ColliderHandle::from_raw_parts(index, 0)
    }

    #[test]
    fn test_owner_without_receiver() {
        let mut keys: SlotMap<EntityKey, ()> = SlotMap::with_key();
        let owner = keys.insert(());
        let mut table = ShapeTable::new();
        table.stamp(&[shape(0), shape(1)], owner);

        assert_eq!(table.owner(shape(1)), Some(owner));
        assert_eq!(table.receiver(shape(1)), None);
        assert_eq!(table.owner(shape(2)), None);
    }

    #[test]
    fn test_clear_returns_receivers_once() {
        let mut entities: SlotMap<EntityKey, ()> = SlotMap::with_key();
        let mut receivers: SlotMap<ReceiverKey, ()> = SlotMap::with_key();
        let owner = entities.insert(());
        let receiver = receivers.insert(());

        let mut table = ShapeTable::new();
        table.stamp(&[shape(0), shape(1)], owner);
        table.attach(shape(0), receiver);
        table.attach(shape(1), receiver);

        assert_eq!(table.clear(&[shape(0), shape(1)]), vec![receiver]);
        assert!(table.is_empty());
    }

    #[test]
    #[should_panic(expected = "already carries receiver")]
    fn test_second_receiver_panics() {
        let mut receivers: SlotMap<ReceiverKey, ()> = SlotMap::with_key();
        let first = receivers.insert(());
        let second = receivers.insert(());
        let mut table = ShapeTable::new();
        table.attach(shape(0), first);
        table.attach(shape(0), second);
    }
}
