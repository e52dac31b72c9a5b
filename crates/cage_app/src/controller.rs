//! Random-walk controller standing in for a learner

use cage_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Drifts the acceleration command and jumps now and then
#[derive(Debug)]
pub struct RandomWalk {
    rng: StdRng,
    seed: u64,
    acceleration: f32,
    step_size: f32,
    jump_chance: f64,
}

impl RandomWalk {
    /// Seeded walker; the same seed gives the same action sequence
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            acceleration: 0.0,
            step_size: 0.2,
            jump_chance: 0.02,
        }
    }

    /// Override the per-sample acceleration drift and jump probability
    pub fn with_rates(mut self, step_size: f32, jump_chance: f64) -> Self {
        self.step_size = step_size;
        self.jump_chance = jump_chance.clamp(0.0, 1.0);
        self
    }
}

impl Controller for RandomWalk {
    fn act(&mut self, _observation: &[f32]) -> ActionVector {
        let drift = self.rng.gen_range(-self.step_size..=self.step_size);
        self.acceleration = (self.acceleration + drift).clamp(-1.0, 1.0);

        let mut action = ActionVector::default();
        action.set_acceleration(self.acceleration);
        action.set_jump(self.rng.gen_bool(self.jump_chance));
        action
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.acceleration = 0.0;
    }
}
