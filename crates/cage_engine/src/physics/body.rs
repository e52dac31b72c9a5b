//! Plain descriptions of bodies and shapes
//!
//! Entities build these before they join the world. The physics world turns
//! a [`BodySpec`] into backend objects and hands back an [`Attachment`].

use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

use crate::error::{ensure_non_negative, ensure_positive, Result};
use crate::foundation::math::{constants, Point2, Vec2};

/// Default friction given to dynamic shapes
pub const DEFAULT_FRICTION: f32 = 0.1;

/// Default restitution given to dynamic shapes
pub const DEFAULT_RESTITUTION: f32 = 0.5;

/// How a body responds to forces
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyKind {
    /// Infinite mass, never moves
    Anchored,
    /// Mass-bearing body integrated by the solver
    Dynamic {
        /// Mass (kg)
        mass: f32,
        /// Moment of inertia about the center
        inertia: f32,
    },
}

impl BodyKind {
    /// Mass and inertia of a solid disc of the given radius and density
    pub fn disc(radius: f32, density: f32) -> Result<Self> {
        let radius = ensure_positive("radius", radius)?;
        let density = ensure_positive("density", density)?;
        let mass = constants::PI * radius * radius * density;
        Ok(BodyKind::Dynamic {
            mass,
            inertia: 0.5 * mass * radius * radius,
        })
    }
}

/// Collision geometry in body-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeGeometry {
    /// Segment from `a` to `b`, inflated by `thickness`
    Segment {
        /// First endpoint
        a: Point2,
        /// Second endpoint
        b: Point2,
        /// Radius of the rounded segment
        thickness: f32,
    },
    /// Circle centered on the body
    Circle {
        /// Circle radius
        radius: f32,
    },
}

/// A shape together with its surface coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSpec {
    /// Geometry of the shape
    pub geometry: ShapeGeometry,
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Restitution (elasticity) coefficient
    pub restitution: f32,
}

impl ShapeSpec {
    /// A rounded segment
    pub fn segment(
        a: Point2,
        b: Point2,
        thickness: f32,
        friction: f32,
        restitution: f32,
    ) -> Result<Self> {
        Ok(Self {
            geometry: ShapeGeometry::Segment {
                a,
                b,
                thickness: ensure_non_negative("thickness", thickness)?,
            },
            friction: ensure_non_negative("friction", friction)?,
            restitution: ensure_non_negative("restitution", restitution)?,
        })
    }

    /// A circle with the dynamic-body default coefficients
    pub fn circle(radius: f32) -> Result<Self> {
        Ok(Self {
            geometry: ShapeGeometry::Circle {
                radius: ensure_positive("radius", radius)?,
            },
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        })
    }
}

/// Everything needed to create a body and its shapes
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    /// Mass model
    pub kind: BodyKind,
    /// Initial position of the body origin
    pub position: Vec2,
    /// Initial linear velocity
    pub velocity: Vec2,
    /// Shapes attached to the body
    pub shapes: Vec<ShapeSpec>,
}

impl BodySpec {
    /// An anchored body at the origin
    pub fn anchored(shapes: Vec<ShapeSpec>) -> Self {
        Self {
            kind: BodyKind::Anchored,
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            shapes,
        }
    }

    /// A dynamic body with a single shape
    pub fn dynamic(kind: BodyKind, position: Vec2, shape: ShapeSpec) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::zeros(),
            shapes: vec![shape],
        }
    }
}

/// Backend handles of a body living in the world
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// The rigid body
    pub body: RigidBodyHandle,
    /// Its shapes, in the order of [`BodySpec::shapes`]
    pub shapes: Vec<ColliderHandle>,
}

/// Kinematic state captured when a body leaves the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Position of the body origin
    pub position: Vec2,
    /// Linear velocity
    pub velocity: Vec2,
    /// Rotation angle (radians)
    pub angle: f32,
}
