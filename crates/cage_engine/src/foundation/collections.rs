//! Specialized collection types

pub use slotmap::{SlotMap, SecondaryMap};

slotmap::new_key_type! {
    /// Stable identity of an entity owned by the registry
    pub struct EntityKey;

    /// Identity of a collision receiver in the receiver table
    pub struct ReceiverKey;
}

/// Handle-based map of entities
pub type EntityMap<T> = SlotMap<EntityKey, T>;

/// Per-entity side data keyed by [`EntityKey`]
pub type EntitySideMap<T> = SecondaryMap<EntityKey, T>;
