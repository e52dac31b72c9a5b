//! Collision groups used to keep an entity's rays off its own shapes
//!
//! Every creature that casts rays gets a distinct group. A ray query carrying
//! a group skips all shapes tagged with that same group. Group `0` is the
//! sentinel meaning "no filter" and is never handed out.

/// Opaque self-exclusion tag attached to shapes and ray queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CollisionGroup(u32);

impl CollisionGroup {
    /// No group: shapes are never excluded, rays exclude nothing
    pub const NONE: CollisionGroup = CollisionGroup(0);

    /// Raw group value
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is the sentinel value
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Encode as backend shape user data
    pub(crate) fn to_user_data(self) -> u128 {
        u128::from(self.0)
    }

    /// Decode backend shape user data; anything out of range is no group
    pub(crate) fn from_user_data(data: u128) -> Self {
        u32::try_from(data).map_or(Self::NONE, CollisionGroup)
    }

    /// Whether a shape tagged `shape_group` is filtered out by a query
    /// carrying `self`
    pub fn excludes(self, shape_group: CollisionGroup) -> bool {
        !self.is_none() && self == shape_group
    }
}

/// Hands out fresh collision groups
///
/// Owned by the entity registry. Wraps around without ever yielding
/// [`CollisionGroup::NONE`].
#[derive(Debug, Default)]
pub struct GroupAllocator {
    last: u32,
}

impl GroupAllocator {
    /// Create an allocator whose first group is `1`
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Allocate the next group
    pub fn allocate(&mut self) -> CollisionGroup {
        self.last = self.last.wrapping_add(1);
        if self.last == CollisionGroup::NONE.0 {
            self.last = 1;
        }
        CollisionGroup(self.last)
    }
}
