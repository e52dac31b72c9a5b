//! Food-eating task and the receiver that makes eating happen

use cage_engine::prelude::*;
use log::debug;

/// Energy gained per pellet
pub const FOOD_ENERGY: f32 = 0.1;

/// Samples left in the episode after a pellet is eaten
pub const COUNTDOWN_AFTER_MEAL: usize = 10;

const MEAL_REWARD: f32 = 100.0;
const REWARD_SCALE: f32 = 100.0;
const MEAL_MEMORY: f32 = 0.8;
const JUMP_ON_FOOD_PENALTY: f32 = 1.0;

/// Receiver attached to an Eater: touching food eats it
///
/// The food is queued for removal and the contact is never resolved, so
/// the eater passes through the pellet instead of bouncing off it.
#[derive(Debug, Default)]
pub struct EatReceiver;

impl CollisionReceiver for EatReceiver {
    fn on_begin(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        other: EntityKey,
        _contacts: &[ContactPoint],
    ) -> bool {
        if !ctx.entity(other).is_some_and(Entity::is_food) {
            return true;
        }
        let this = ctx.this();
        if let Some(eater) = ctx.entity_mut(this).and_then(Entity::as_eater_mut) {
            eater.creature_mut().add_energy(FOOD_ENERGY);
            eater.record_consumption();
            debug!("Eater {:?} ate {:?}, energy {:.2}", this, other, eater.energy());
        }
        ctx.remove(other);
        false
    }
}

/// Rewards eating, punishes jumping while standing on food
#[derive(Debug)]
pub struct EatTask {
    decay: f32,
    collected: f32,
    last_consumed: Option<u32>,
    ate: bool,
}

impl EatTask {
    /// Task that drains `decay` energy per second from the creature it scores
    pub fn new(decay: f32) -> Self {
        Self {
            decay,
            collected: 0.0,
            last_consumed: None,
            ate: false,
        }
    }

    /// Hand the task's energy drain to the creature
    pub fn prepare(&self, cage: &mut Cage, creature: EntityKey) -> cage_engine::Result<()> {
        let eater = cage.eater_mut(creature).ok_or(CageError::NotACreature)?;
        eater.creature_mut().set_decay(self.decay);
        Ok(())
    }

    fn standing_on_food(cage: &Cage, eater: &Eater) -> bool {
        eater
            .sensors()
            .first()
            .and_then(SensorRay::owner_hit)
            .and_then(|key| cage.entity(key))
            .is_some_and(Entity::is_food)
    }
}

impl Task for EatTask {
    fn reward(&mut self, cage: &Cage, creature: EntityKey) -> f32 {
        let Some(eater) = cage.eater(creature) else {
            return 0.0;
        };

        let consumed = eater.consumed();
        let meals = consumed.saturating_sub(self.last_consumed.unwrap_or(consumed));
        self.last_consumed = Some(consumed);
        self.ate = meals > 0;

        let mut reward = 0.0;
        if eater.did_jump() && Self::standing_on_food(cage, eater) {
            reward -= JUMP_ON_FOOD_PENALTY;
        }
        self.collected += meals as f32;
        reward += MEAL_REWARD * self.collected;
        self.collected *= MEAL_MEMORY;
        reward * REWARD_SCALE
    }

    fn countdown(&mut self) -> Option<usize> {
        std::mem::take(&mut self.ate).then_some(COUNTDOWN_AFTER_MEAL)
    }

    fn reset(&mut self) {
        self.collected = 0.0;
        self.ate = false;
    }
}
