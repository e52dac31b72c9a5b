//! Cage tuning parameters

use serde::{Deserialize, Serialize};

use crate::foundation::math::{constants, Color};

/// Complete cage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CageConfig {
    /// Physics world settings
    pub world: WorldConfig,

    /// Eater controller settings
    pub eater: EaterConfig,
}

/// Physics world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Downward gravitational acceleration (m/s^2)
    pub gravity: f32,

    /// Fraction of velocity a body keeps after one second (1.0 = no damping)
    pub damping: f32,

    /// Fixed physics time step (seconds)
    pub timestep: f32,
}

/// Eater creature configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaterConfig {
    /// Body radius
    pub radius: f32,

    /// Body density (mass = pi * r^2 * density)
    pub density: f32,

    /// Body color, used when the action vector does not pick one
    pub color: [f32; 3],

    /// Outline color
    pub outline: [f32; 3],

    /// Starting energy
    pub energy: f32,

    /// Energy lost per second
    pub decay: f32,

    /// Force applied at full acceleration command
    pub max_force: f32,

    /// Upward impulse of a jump
    pub jump_impulse: f32,

    /// Minimum seconds between jump attempts
    pub jump_debounce: f32,

    /// Ground contact threshold as a fraction of the down sensor's range
    pub ground_fraction: f32,

    /// Horizontal speed below which facing follows the acceleration command
    pub facing_deadband: f32,

    /// Number of forward-facing sensors
    pub forward_sensors: usize,

    /// Angle of the first forward sensor (radians, 0 = straight ahead)
    pub fan_start: f32,

    /// Upper end of the forward fan (exclusive)
    pub fan_end: f32,

    /// Sensor ray settings shared by every ray
    pub sensor: SensorConfig,
}

/// Sensor ray configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Maximum sensing range
    pub range: f32,

    /// Dead zone as a fraction of the body radius
    pub inner_fraction: f32,

    /// Exponential smoothing factor in (0, 1]
    pub fadeout: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            damping: 1.0,
            timestep: 1.0 / 30.0,
        }
    }
}

impl Default for EaterConfig {
    fn default() -> Self {
        Self {
            radius: 0.25,
            density: 50.0,
            color: [1.0, 1.0, 1.0],
            outline: [0.5, 0.5, 0.5],
            energy: 1.0,
            decay: 0.0,
            max_force: 200.0,
            jump_impulse: 140.0,
            jump_debounce: 0.3,
            ground_fraction: 0.005,
            facing_deadband: 0.01,
            forward_sensors: 3,
            fan_start: 0.0,
            fan_end: constants::THIRD_PI,
            sensor: SensorConfig::default(),
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            range: 10.0,
            inner_fraction: 0.5,
            fadeout: 0.6,
        }
    }
}

impl EaterConfig {
    /// Body color as a vector
    pub fn body_color(&self) -> Color {
        Color::from(self.color)
    }

    /// Outline color as a vector
    pub fn outline_color(&self) -> Color {
        Color::from(self.outline)
    }

    /// Total number of sensors: down, up and the forward fan
    pub fn sensor_count(&self) -> usize {
        2 + self.forward_sensors
    }
}
