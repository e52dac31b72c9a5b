//! Physics adapter
//!
//! Wraps the rapier2d backend behind a small surface:
//! - Body and shape descriptions built before insertion
//! - Collision groups for ray self-exclusion
//! - Nearest-hit segment queries
//! - Contact tracking with per-pair solver suppression

pub mod body;
pub mod contacts;
pub mod groups;
pub mod ray;
pub mod world;

pub use body::{Attachment, BodyKind, BodySpec, BodyState, ShapeGeometry, ShapeSpec};
pub use contacts::{ContactEvent, ContactKey, ContactPoint, ContactReport};
pub use groups::{CollisionGroup, GroupAllocator};
pub use ray::{RayHit, RaySegment};
pub use world::PhysicsWorld;

pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};
