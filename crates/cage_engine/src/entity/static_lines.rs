//! Immovable polyline geometry (walls, floors, platforms)

use crate::draw::DrawList;
use crate::error::{CageError, Result};
use crate::foundation::math::{Color, Point2, Vec2};
use crate::physics::{BodySpec, ShapeGeometry, ShapeSpec};

use super::Embodiment;

/// Friction of static geometry unless overridden
pub const DEFAULT_LINE_FRICTION: f32 = 0.1;

/// Restitution of static geometry unless overridden
pub const DEFAULT_LINE_RESTITUTION: f32 = 0.25;

/// A chain of segments sharing thickness, friction and restitution
#[derive(Debug, Clone)]
pub struct StaticLines {
    points: Vec<Point2>,
    thickness: f32,
    color: Color,
    embodiment: Embodiment,
}

impl StaticLines {
    /// Build a polyline with the default surface coefficients
    pub fn new(points: &[Point2], thickness: f32, color: Color) -> Result<Self> {
        Self::with_surface(
            points,
            thickness,
            color,
            DEFAULT_LINE_FRICTION,
            DEFAULT_LINE_RESTITUTION,
        )
    }

    /// Build a polyline with explicit surface coefficients
    ///
    /// `N` points give `N - 1` segments; fewer than two points is an error.
    pub fn with_surface(
        points: &[Point2],
        thickness: f32,
        color: Color,
        friction: f32,
        restitution: f32,
    ) -> Result<Self> {
        if points.len() < 2 {
            return Err(CageError::TooFewPoints(points.len()));
        }
        let shapes = points
            .windows(2)
            .map(|pair| ShapeSpec::segment(pair[0], pair[1], thickness, friction, restitution))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            points: points.to_vec(),
            thickness,
            color,
            embodiment: Embodiment::new(BodySpec::anchored(shapes)),
        })
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.embodiment.spec().shapes.len()
    }

    /// Segment shapes in chain order
    pub fn segments(&self) -> &[ShapeSpec] {
        &self.embodiment.spec().shapes
    }

    /// Fixed color
    pub fn color(&self) -> Color {
        self.color
    }

    /// Anchor of the first segment
    pub fn position(&self) -> Vec2 {
        self.points[0].coords
    }

    pub(crate) fn embodiment(&self) -> &Embodiment {
        &self.embodiment
    }

    pub(crate) fn embodiment_mut(&mut self) -> &mut Embodiment {
        &mut self.embodiment
    }

    pub(crate) fn draw(&self, list: &mut DrawList) {
        for shape in self.segments() {
            if let ShapeGeometry::Segment { a, b, .. } = shape.geometry {
                list.line(a, b, self.thickness, self.color);
            }
        }
    }
}
