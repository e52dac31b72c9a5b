//! Interfaces to learning code living outside the engine
//!
//! A [`Controller`] maps observations to actions, a [`Task`] turns the
//! cage's state into a reward, and an [`Episode`] ties them together one
//! interaction at a time.

use crate::creature::ActionVector;
use crate::error::{CageError, Result};
use crate::foundation::collections::EntityKey;
use crate::simulation::Cage;

/// Produces an action from an observation
pub trait Controller {
    /// Choose the next action
    fn act(&mut self, observation: &[f32]) -> ActionVector;

    /// Forget any internal state (recurrent memory, exploration noise)
    fn reset(&mut self) {}
}

/// Scores a creature's behavior
pub trait Task {
    /// Reward for the interaction that was just performed
    fn reward(&mut self, cage: &Cage, creature: EntityKey) -> f32;

    /// Shorten the episode to this many further samples, polled after every
    /// reward
    fn countdown(&mut self) -> Option<usize> {
        None
    }

    /// Start a new episode
    fn reset(&mut self) {}
}

/// Outcome of one interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    /// Reward returned by the task
    pub reward: f32,
    /// Whether the episode has used up its samples
    pub finished: bool,
}

/// Sample bookkeeping for one episode
#[derive(Debug, Clone)]
pub struct Episode {
    samples: usize,
    max_samples: usize,
    default_max_samples: usize,
    cumulative_reward: f32,
}

impl Episode {
    /// An episode lasting `max_samples` interactions
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: 0,
            max_samples,
            default_max_samples: max_samples,
            cumulative_reward: 0.0,
        }
    }

    /// Interactions performed so far
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Current sample limit
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Sum of rewards so far
    pub fn cumulative_reward(&self) -> f32 {
        self.cumulative_reward
    }

    /// Whether the sample limit is reached
    pub fn is_finished(&self) -> bool {
        self.samples >= self.max_samples
    }

    /// Observe, act, then score
    ///
    /// The action takes effect on the creature's next update.
    pub fn interact(
        &mut self,
        cage: &mut Cage,
        creature: EntityKey,
        controller: &mut dyn Controller,
        task: &mut dyn Task,
    ) -> Result<Interaction> {
        let observation = cage
            .eater(creature)
            .ok_or(CageError::NotACreature)?
            .observation()
            .to_vec();
        let action = controller.act(&observation);
        cage.eater_mut(creature).ok_or(CageError::NotACreature)?.set_action(action);
        self.samples += 1;

        let reward = task.reward(cage, creature);
        if reward.is_finite() {
            self.cumulative_reward += reward;
        }
        if let Some(remaining) = task.countdown() {
            self.countdown(remaining);
        }
        Ok(Interaction {
            reward,
            finished: self.is_finished(),
        })
    }

    /// End the episode after `remaining` more samples
    pub fn countdown(&mut self, remaining: usize) {
        self.max_samples = remaining;
        self.samples = 0;
    }

    /// Start over with the configured sample limit
    pub fn reset(&mut self) {
        self.samples = 0;
        self.max_samples = self.default_max_samples;
        self.cumulative_reward = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_shortens_episode() {
        let mut episode = Episode::new(100);
        episode.samples = 40;
        episode.countdown(2);
        assert!(!episode.is_finished());
        episode.samples = 2;
        assert!(episode.is_finished());

        episode.reset();
        assert_eq!(episode.max_samples(), 100);
        assert_eq!(episode.samples(), 0);
    }
}
