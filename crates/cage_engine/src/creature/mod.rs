//! Creatures: energy, sensors, observation and action vectors

pub mod eater;
pub mod sensor;

pub use eater::Eater;
pub use sensor::SensorRay;

use crate::foundation::logging::warn;
use crate::foundation::math::{utils, Color};

/// Length of the action vector
pub const ACTION_DIM: usize = 6;

/// Observation slots taken by each sensor (three colors and a distance)
pub const SLOTS_PER_SENSOR: usize = 4;

/// Observation slots before the sensor block (energy, horizontal velocity)
pub const OBSERVATION_HEADER: usize = 2;

/// Smallest distance fed into the log transform
pub const MIN_OBSERVED_DISTANCE: f32 = 1e-6;

/// Observation length for a creature with `sensors` rays
pub fn observation_dim(sensors: usize) -> usize {
    OBSERVATION_HEADER + SLOTS_PER_SENSOR * sensors
}

/// Commands written by a controller
///
/// | slot | meaning |
/// |------|---------|
/// | 0 | horizontal acceleration, clamped to [-1, 1] |
/// | 1 | jump when >= 0.5 |
/// | 2 | reserved |
/// | 3..6 | requested body color, each mapped by `(v + 1) / 2` |
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionVector([f32; ACTION_DIM]);

impl ActionVector {
    /// Wrap raw controller output
    pub fn new(values: [f32; ACTION_DIM]) -> Self {
        Self(values)
    }

    /// Copy up to [`ACTION_DIM`] values, padding with zeros
    pub fn from_slice(values: &[f32]) -> Self {
        let mut raw = [0.0; ACTION_DIM];
        for (slot, value) in raw.iter_mut().zip(values) {
            *slot = *value;
        }
        Self(raw)
    }

    /// Raw slots
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Acceleration command in [-1, 1]
    pub fn acceleration(&self) -> f32 {
        utils::clamp(self.0[0], -1.0, 1.0)
    }

    /// Set the acceleration slot
    pub fn set_acceleration(&mut self, value: f32) {
        self.0[0] = value;
    }

    /// Whether a jump is requested
    pub fn jump(&self) -> bool {
        self.0[1] >= 0.5
    }

    /// Request or cancel a jump
    pub fn set_jump(&mut self, jump: bool) {
        self.0[1] = if jump { 1.0 } else { -1.0 };
    }

    /// Requested body color
    pub fn color(&self) -> Color {
        let channel = |v: f32| utils::clamp((v + 1.0) * 0.5, 0.0, 1.0);
        Color::new(channel(self.0[3]), channel(self.0[4]), channel(self.0[5]))
    }
}

/// State shared by every creature
#[derive(Debug, Clone)]
pub struct Creature {
    energy: f32,
    decay: f32,
    sensors: Vec<SensorRay>,
    observation: Vec<f32>,
    action: ActionVector,
}

impl Creature {
    /// A creature with the given energy, decay rate and sensors
    pub fn new(energy: f32, decay: f32, sensors: Vec<SensorRay>) -> Self {
        let observation = vec![0.0; observation_dim(sensors.len())];
        Self {
            energy,
            decay,
            sensors,
            observation,
            action: ActionVector::default(),
        }
    }

    /// Current energy
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Overwrite the energy; non-finite values are ignored
    pub fn set_energy(&mut self, energy: f32) {
        if energy.is_finite() {
            self.energy = energy;
        } else {
            warn!("Ignoring non-finite energy {}", energy);
        }
    }

    /// Add to the energy; non-finite amounts are ignored
    pub fn add_energy(&mut self, amount: f32) {
        self.set_energy(self.energy + amount);
    }

    /// Energy lost per second
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Set the energy lost per second
    pub fn set_decay(&mut self, decay: f32) {
        if decay.is_finite() {
            self.decay = decay;
        }
    }

    /// Sensors in observation order
    pub fn sensors(&self) -> &[SensorRay] {
        &self.sensors
    }

    /// Mutable sensors
    pub fn sensors_mut(&mut self) -> &mut [SensorRay] {
        &mut self.sensors
    }

    /// Latest observation
    pub fn observation(&self) -> &[f32] {
        &self.observation
    }

    /// Current action
    pub fn action(&self) -> &ActionVector {
        &self.action
    }

    /// Mutable action
    pub fn action_mut(&mut self) -> &mut ActionVector {
        &mut self.action
    }

    /// Replace the action
    pub fn set_action(&mut self, action: ActionVector) {
        self.action = action;
    }

    /// Lose `decay * dt` energy
    pub(crate) fn drain(&mut self, dt: f32) {
        self.add_energy(-self.decay * dt);
    }

    /// Rebuild the observation: energy, velocity, then each sensor's
    /// colors and `-ln(distance)`
    pub(crate) fn observe(&mut self, velocity_x: f32) {
        self.observation[0] = self.energy;
        self.observation[1] = if velocity_x.is_finite() { velocity_x } else { 0.0 };
        for (i, sensor) in self.sensors.iter().enumerate() {
            let base = OBSERVATION_HEADER + i * SLOTS_PER_SENSOR;
            let color = sensor.color();
            self.observation[base] = color.x;
            self.observation[base + 1] = color.y;
            self.observation[base + 2] = color.z;
            self.observation[base + 3] = -sensor.distance().max(MIN_OBSERVED_DISTANCE).ln();
        }
    }

    /// Reset every sensor to its cleared state
    pub fn zero_sensors(&mut self) {
        for sensor in &mut self.sensors {
            sensor.zero();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_slots() {
        let mut action = ActionVector::new([2.0, 0.5, 0.0, -1.0, 0.0, 3.0]);
        assert_eq!(action.acceleration(), 1.0);
        assert!(action.jump());
        assert_eq!(action.color(), Color::new(0.0, 0.5, 1.0));

        action.set_jump(false);
        assert_eq!(action.as_slice()[1], -1.0);
        assert!(!action.jump());
        action.set_acceleration(f32::NAN);
        assert_eq!(action.acceleration(), -1.0);
    }

    #[test]
    fn test_short_slice_is_padded() {
        let action = ActionVector::from_slice(&[0.3]);
        assert_eq!(action.as_slice(), &[0.3, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_observation_layout() {
        let sensors = vec![SensorRay::new(0.1, 10.0, 0.0).unwrap(); 3];
        let mut creature = Creature::new(0.8, 0.0, sensors);
        creature.observe(1.5);

        let obs = creature.observation();
        assert_eq!(obs.len(), observation_dim(3));
        assert_eq!(obs[0], 0.8);
        assert_eq!(obs[1], 1.5);
        assert_eq!(&obs[2..6], &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_drain_and_guard() {
        let mut creature = Creature::new(1.0, 0.5, Vec::new());
        creature.drain(0.5);
        assert_eq!(creature.energy(), 0.75);
        creature.add_energy(f32::INFINITY);
        assert_eq!(creature.energy(), 0.75);
    }
}
