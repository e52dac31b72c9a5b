//! Engine error types

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while building or configuring simulation objects
///
/// Only construction paths fail; per-tick operations clamp and guard their
/// inputs instead of returning errors.
#[derive(Error, Debug)]
pub enum CageError {
    /// Static geometry needs at least two points to form a segment
    #[error("static geometry needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    /// A size or mass parameter must be strictly positive
    #[error("{what} must be positive and finite, got {value}")]
    NonPositive {
        /// Name of the offending parameter
        what: &'static str,
        /// Value that was rejected
        value: f32,
    },

    /// A coefficient is outside its allowed range
    #[error("{what} must lie in {range}, got {value}")]
    OutOfRange {
        /// Name of the offending parameter
        what: &'static str,
        /// Human readable range
        range: &'static str,
        /// Value that was rejected
        value: f32,
    },

    /// Sensor outer radius does not exceed its dead zone
    #[error("sensor range {outer} must exceed its inner radius {inner}")]
    EmptySensorRange {
        /// Dead-zone radius
        inner: f32,
        /// Maximum sensing range
        outer: f32,
    },

    /// The entity has no physical representation in the world
    #[error("entity is not embedded in the physics world")]
    NotEmbedded,

    /// The entity is not a creature
    #[error("entity is not a creature")]
    NotACreature,

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, CageError>;

/// Reject values that are not strictly positive and finite
pub(crate) fn ensure_positive(what: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CageError::NonPositive { what, value })
    }
}

/// Reject values that are negative or not finite
pub(crate) fn ensure_non_negative(what: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CageError::OutOfRange { what, range: "[0, inf)", value })
    }
}
