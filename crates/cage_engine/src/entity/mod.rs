//! Simulated entities and the registry that owns them
//!
//! Every entity builds its physical description up front and only touches
//! the physics world when it joins or leaves it. The hook set is:
//! - `update` once per tick, before the physics step
//! - `draw` into a render-agnostic [`DrawList`]
//! - `join_world` / `leave_world` when embedded or removed

pub mod ball;
pub mod registry;
pub mod shape_table;
pub mod static_lines;

pub use ball::{Ball, BallKind};
pub use registry::{Command, CommandQueue, Registry};
pub use shape_table::ShapeTable;
pub use static_lines::StaticLines;

use crate::creature::Eater;
use crate::draw::DrawList;
use crate::foundation::collections::{EntityKey, EntitySideMap};
use crate::foundation::math::{Color, Vec2};
use crate::physics::{
    Attachment, BodySpec, BodyState, ColliderHandle, CollisionGroup, GroupAllocator, PhysicsWorld,
    RayHit, RaySegment, RigidBodyHandle,
};

/// A simulated object owned by the registry
#[derive(Debug)]
pub enum Entity {
    /// Immovable line geometry
    Lines(StaticLines),
    /// Passive ball (including food)
    Ball(Ball),
    /// Sensing, acting creature
    Eater(Box<Eater>),
}

impl Entity {
    /// Current color
    pub fn color(&self) -> Color {
        match self {
            Entity::Lines(lines) => lines.color(),
            Entity::Ball(ball) => ball.color(),
            Entity::Eater(eater) => eater.color(),
        }
    }

    /// Current world position
    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        match self {
            Entity::Lines(lines) => lines.position(),
            Entity::Ball(ball) => ball.position(physics),
            Entity::Eater(eater) => eater.position(physics),
        }
    }

    /// Backend handles, if embedded
    pub fn attachment(&self) -> Option<&Attachment> {
        self.embodiment().attachment()
    }

    /// Whether this is a food ball
    pub fn is_food(&self) -> bool {
        matches!(self, Entity::Ball(ball) if ball.kind() == BallKind::Food)
    }

    /// Borrow as an eater
    pub fn as_eater(&self) -> Option<&Eater> {
        match self {
            Entity::Eater(eater) => Some(eater),
            _ => None,
        }
    }

    /// Mutably borrow as an eater
    pub fn as_eater_mut(&mut self) -> Option<&mut Eater> {
        match self {
            Entity::Eater(eater) => Some(eater),
            _ => None,
        }
    }

    /// Borrow as a ball
    pub fn as_ball(&self) -> Option<&Ball> {
        match self {
            Entity::Ball(ball) => Some(ball),
            _ => None,
        }
    }

    pub(crate) fn update(&mut self, ctx: &mut UpdateContext<'_>, dt: f32) {
        match self {
            Entity::Lines(_) | Entity::Ball(_) => {}
            Entity::Eater(eater) => eater.update(ctx, dt),
        }
    }

    /// Emit draw primitives
    pub fn draw(&self, physics: &PhysicsWorld, list: &mut DrawList) {
        match self {
            Entity::Lines(lines) => lines.draw(list),
            Entity::Ball(ball) => ball.draw(physics, list),
            Entity::Eater(eater) => eater.draw(physics, list),
        }
    }

    pub(crate) fn join_world(
        &mut self,
        physics: &mut PhysicsWorld,
        groups: &mut GroupAllocator,
    ) -> Attachment {
        match self {
            Entity::Lines(lines) => lines.embodiment_mut().join(physics, CollisionGroup::NONE),
            Entity::Ball(ball) => ball.embodiment_mut().join(physics, CollisionGroup::NONE),
            Entity::Eater(eater) => eater.join_world(physics, groups),
        }
    }

    pub(crate) fn leave_world(&mut self, physics: &mut PhysicsWorld) -> Option<BodyState> {
        self.embodiment_mut().leave(physics)
    }

    fn embodiment(&self) -> &Embodiment {
        match self {
            Entity::Lines(lines) => lines.embodiment(),
            Entity::Ball(ball) => ball.embodiment(),
            Entity::Eater(eater) => eater.body().embodiment(),
        }
    }

    fn embodiment_mut(&mut self) -> &mut Embodiment {
        match self {
            Entity::Lines(lines) => lines.embodiment_mut(),
            Entity::Ball(ball) => ball.embodiment_mut(),
            Entity::Eater(eater) => eater.body_mut().embodiment_mut(),
        }
    }
}

impl From<StaticLines> for Entity {
    fn from(lines: StaticLines) -> Self {
        Entity::Lines(lines)
    }
}

impl From<Ball> for Entity {
    fn from(ball: Ball) -> Self {
        Entity::Ball(ball)
    }
}

impl From<Eater> for Entity {
    fn from(eater: Eater) -> Self {
        Entity::Eater(Box::new(eater))
    }
}

/// Physical description of an entity plus its handles once embedded
#[derive(Debug, Clone)]
pub struct Embodiment {
    spec: BodySpec,
    attachment: Option<Attachment>,
}

impl Embodiment {
    /// Wrap a body description that is not yet in the world
    pub fn new(spec: BodySpec) -> Self {
        Self { spec, attachment: None }
    }

    /// Body description used on the next join
    pub fn spec(&self) -> &BodySpec {
        &self.spec
    }

    /// Backend handles, if embedded
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Rigid body handle, if embedded
    pub fn body(&self) -> Option<RigidBodyHandle> {
        self.attachment.as_ref().map(|a| a.body)
    }

    /// Shape handles, empty when not embedded
    pub fn shapes(&self) -> &[ColliderHandle] {
        match &self.attachment {
            Some(attachment) => &attachment.shapes,
            None => &[],
        }
    }

    /// Current position, falling back to the description when detached
    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        self.body()
            .and_then(|body| physics.position(body))
            .unwrap_or(self.spec.position)
    }

    /// Add the body to the world; a no-op when already embedded
    pub fn join(&mut self, physics: &mut PhysicsWorld, group: CollisionGroup) -> Attachment {
        if let Some(attachment) = &self.attachment {
            return attachment.clone();
        }
        let attachment = physics.add(&self.spec, group);
        self.attachment = Some(attachment.clone());
        attachment
    }

    /// Remove the body from the world and remember where it was
    pub fn leave(&mut self, physics: &mut PhysicsWorld) -> Option<BodyState> {
        let attachment = self.attachment.take()?;
        let state = physics.remove(&attachment)?;
        self.spec.position = state.position;
        self.spec.velocity = state.velocity;
        Some(state)
    }
}

/// Read-only view of the world used by sensors
pub struct Surroundings<'a> {
    physics: &'a PhysicsWorld,
    shapes: &'a ShapeTable,
    colors: &'a EntitySideMap<Color>,
}

impl<'a> Surroundings<'a> {
    /// Assemble a view from its parts
    pub fn new(
        physics: &'a PhysicsWorld,
        shapes: &'a ShapeTable,
        colors: &'a EntitySideMap<Color>,
    ) -> Self {
        Self { physics, shapes, colors }
    }

    /// Nearest hit along the segment, skipping shapes in `exclude`
    pub fn cast(&self, segment: &RaySegment, exclude: CollisionGroup) -> Option<RayHit> {
        self.physics.cast_ray(segment, exclude)
    }

    /// Owner and color of a shape, `None` for unknown obstacles
    pub fn identify(&self, shape: ColliderHandle) -> Option<(EntityKey, Color)> {
        let owner = self.shapes.owner(shape)?;
        let color = self.colors.get(owner).copied()?;
        Some((owner, color))
    }
}

/// Everything an entity may touch during its update
pub struct UpdateContext<'a> {
    /// The physics world (forces, impulses, ray queries)
    pub physics: &'a mut PhysicsWorld,
    /// Shape owners for hit identification
    pub shapes: &'a ShapeTable,
    /// Entity colors captured at the start of the tick
    pub colors: &'a EntitySideMap<Color>,
}

impl UpdateContext<'_> {
    /// Read-only view for ray queries
    pub fn surroundings(&self) -> Surroundings<'_> {
        Surroundings::new(&*self.physics, self.shapes, self.colors)
    }
}
