//! Passive dynamic balls and food

use crate::draw::DrawList;
use crate::error::Result;
use crate::foundation::math::{utils, Color, Point2, Vec2};
use crate::physics::{BodyKind, BodySpec, PhysicsWorld, ShapeSpec};

use super::Embodiment;

/// Radius of a food pellet
pub const FOOD_RADIUS: f32 = 0.2;

/// Density of a food pellet
pub const FOOD_DENSITY: f32 = 20.0;

/// What a ball stands for in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallKind {
    /// Plain obstacle
    Plain,
    /// Consumable food pellet
    Food,
}

/// A dynamic circle with a fixed color and an orientation marker
#[derive(Debug, Clone)]
pub struct Ball {
    radius: f32,
    color: Color,
    outline: Option<Color>,
    look_at: Vec2,
    kind: BallKind,
    embodiment: Embodiment,
}

impl Ball {
    /// A plain ball of the given size and density
    pub fn new(position: Vec2, radius: f32, density: f32, color: Color) -> Result<Self> {
        let kind = BodyKind::disc(radius, density)?;
        let shape = ShapeSpec::circle(radius)?;
        Ok(Self {
            radius,
            color,
            outline: None,
            look_at: Vec2::new(1.0, 0.0),
            kind: BallKind::Plain,
            embodiment: Embodiment::new(BodySpec::dynamic(kind, position, shape)),
        })
    }

    /// A yellow food pellet
    pub fn food(position: Vec2) -> Result<Self> {
        let mut ball = Self::new(position, FOOD_RADIUS, FOOD_DENSITY, Color::new(1.0, 1.0, 0.0))?;
        ball.kind = BallKind::Food;
        Ok(ball)
    }

    /// Builder: draw an outline and orientation marker
    pub fn with_outline(mut self, outline: Color) -> Self {
        self.outline = Some(outline);
        self
    }

    /// Builder: start with an initial velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.embodiment = Embodiment::new(BodySpec {
            velocity,
            ..self.embodiment.spec().clone()
        });
        self
    }

    /// Circle radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Fixed color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Outline color, if any
    pub fn outline(&self) -> Option<Color> {
        self.outline
    }

    /// What this ball stands for
    pub fn kind(&self) -> BallKind {
        self.kind
    }

    /// Unit orientation vector in body space
    pub fn look_at(&self) -> Vec2 {
        self.look_at
    }

    /// Point the orientation marker along `direction`
    ///
    /// Zero or non-finite directions are ignored.
    pub fn set_look_at(&mut self, direction: Vec2) {
        if let Some(unit) = direction.try_normalize(f32::EPSILON) {
            if utils::is_finite2(&unit) {
                self.look_at = unit;
            }
        }
    }

    /// Current world position
    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        self.embodiment.position(physics)
    }

    pub(crate) fn embodiment(&self) -> &Embodiment {
        &self.embodiment
    }

    pub(crate) fn embodiment_mut(&mut self) -> &mut Embodiment {
        &mut self.embodiment
    }

    pub(crate) fn draw(&self, physics: &PhysicsWorld, list: &mut DrawList) {
        self.draw_with_color(physics, list, self.color);
    }

    pub(crate) fn draw_with_color(&self, physics: &PhysicsWorld, list: &mut DrawList, fill: Color) {
        let center = Point2::from(self.position(physics));
        list.circle(center, self.radius, fill, self.outline);

        if let Some(outline) = self.outline {
            let angle = self
                .embodiment
                .body()
                .and_then(|body| physics.angle(body))
                .unwrap_or(0.0);
            let tip = center + utils::rotate(self.look_at * self.radius, angle);
            list.line(center, tip, 0.0, outline);
        }
    }
}
