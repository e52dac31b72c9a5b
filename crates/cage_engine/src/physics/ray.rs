//! Segment queries against the physics world

use rapier2d::prelude::ColliderHandle;

use crate::foundation::math::{Point2, Vec2};

/// A finite ray from `start` to `end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment {
    /// Start point in world space
    pub start: Point2,
    /// End point in world space
    pub end: Point2,
}

impl RaySegment {
    /// Creates a new segment query
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Unnormalized direction `end - start`
    pub fn delta(&self) -> Vec2 {
        self.end - self.start
    }

    /// Get the point at fraction `t` along the segment
    pub fn point_at(&self, t: f32) -> Point2 {
        self.start + self.delta() * t
    }

    /// A segment is castable when it is finite and not zero-length
    pub fn is_castable(&self) -> bool {
        let delta = self.delta();
        self.start.x.is_finite()
            && self.start.y.is_finite()
            && delta.x.is_finite()
            && delta.y.is_finite()
            && delta.norm_squared() > f32::EPSILON
    }
}

/// Nearest intersection of a segment query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The shape that was hit
    pub shape: ColliderHandle,
    /// Fraction along the segment in [0, 1]
    pub fraction: f32,
    /// The point of intersection in world space
    pub point: Point2,
    /// The surface normal at the intersection point
    pub normal: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_at_fraction() {
        let ray = RaySegment::new(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        assert_eq!(ray.point_at(0.25), Point2::new(1.0, 0.0));
    }

    #[test]
    fn test_zero_length_is_not_castable() {
        let p = Point2::new(1.0, 1.0);
        assert!(!RaySegment::new(p, p).is_castable());
        assert!(!RaySegment::new(Point2::new(f32::NAN, 0.0), p).is_castable());
        assert!(RaySegment::new(Point2::origin(), p).is_castable());
    }
}
