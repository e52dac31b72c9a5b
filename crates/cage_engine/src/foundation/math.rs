//! Math utilities and types
//!
//! Provides the 2D math types shared by the physics adapter, the sensors and
//! the creature controller.

pub use nalgebra::{Vector2, Vector3, UnitComplex};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// RGB color with components nominally in [0, 1]
pub type Color = Vec3;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Pi / 3
    pub const THIRD_PI: f32 = PI / 3.0;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Clamp a value between min and max; NaN maps to `min`
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value.is_nan() || value < min { min } else if value > max { max } else { value }
    }

    /// Rotate a 2D vector counter-clockwise by `angle` radians
    pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
        UnitComplex::new(angle) * v
    }

    /// True when both components are finite
    pub fn is_finite2(v: &Vec2) -> bool {
        v.x.is_finite() && v.y.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = utils::rotate(Vec2::new(1.0, 0.0), constants::HALF_PI);
        assert_relative_eq!(rotated, Vec2::new(0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_clamp_handles_nan() {
        assert_eq!(utils::clamp(f32::NAN, -1.0, 1.0), -1.0);
        assert_eq!(utils::clamp(3.0, -1.0, 1.0), 1.0);
        assert_eq!(utils::clamp(-3.0, -1.0, 1.0), -1.0);
    }
}
