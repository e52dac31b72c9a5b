//! World stepper
//!
//! Tick order:
//! 1. every embedded entity updates (own state, ray queries, own forces)
//! 2. contacts are detected at the current positions
//! 3. begin, pre-solve and separate dispatch; vetoes reach the solver
//! 4. one fixed physics step
//! 5. post-solve dispatch for the contacts the solver resolved
//! 6. queued spawns and removals are applied

use crate::config::CageConfig;
use crate::creature::Eater;
use crate::dispatch::{CollisionReceiver, ContactPhase};
use crate::draw::DrawList;
use crate::entity::{CommandQueue, Entity, Registry};
use crate::error::{CageError, Result};
use crate::foundation::collections::{EntityKey, ReceiverKey};
use crate::foundation::logging::{debug, info, trace};
use crate::foundation::math::Vec2;
use crate::physics::{PhysicsWorld, RigidBodyHandle};

/// Counts of what happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Contacts that began
    pub began: usize,
    /// Contacts suppressed by a receiver on begin
    pub suppressed: usize,
    /// Contacts that separated
    pub separated: usize,
    /// Queued commands applied at the end of the tick
    pub applied: usize,
}

/// The simulated cage: a physics world plus the entities living in it
pub struct Cage {
    config: CageConfig,
    physics: PhysicsWorld,
    registry: Registry,
    time: f64,
    steps: u64,
}

impl Cage {
    /// Create an empty cage
    pub fn new(config: CageConfig) -> Result<Self> {
        let physics = PhysicsWorld::new(&config.world)?;
        info!(
            "Cage created: gravity {:.2}, damping {:.2}, timestep {:.4}s",
            config.world.gravity, config.world.damping, config.world.timestep
        );
        Ok(Self {
            config,
            physics,
            registry: Registry::new(),
            time: 0.0,
            steps: 0,
        })
    }

    /// Configuration the cage was built from
    pub fn config(&self) -> &CageConfig {
        &self.config
    }

    /// The physics world
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// The entity registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Simulated seconds so far
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ticks so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Store and embed an entity
    pub fn add(&mut self, entity: impl Into<Entity>) -> EntityKey {
        self.registry.add(entity.into(), &mut self.physics)
    }

    /// Store an entity without embedding it
    pub fn insert(&mut self, entity: impl Into<Entity>) -> EntityKey {
        self.registry.insert(entity.into())
    }

    /// Embed a stored entity; idempotent, returns its index
    pub fn embed(&mut self, key: EntityKey) -> usize {
        self.registry.embed(key, &mut self.physics)
    }

    /// Remove an entity immediately
    ///
    /// # Panics
    ///
    /// Panics if `key` is not registered.
    pub fn remove(&mut self, key: EntityKey) -> Entity {
        self.registry.remove(key, &mut self.physics)
    }

    /// Look up an entity
    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.registry.get(key)
    }

    /// Mutably look up an entity
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.registry.get_mut(key)
    }

    /// Look up an eater
    pub fn eater(&self, key: EntityKey) -> Option<&Eater> {
        self.entity(key).and_then(Entity::as_eater)
    }

    /// Mutably look up an eater
    pub fn eater_mut(&mut self, key: EntityKey) -> Option<&mut Eater> {
        self.entity_mut(key).and_then(Entity::as_eater_mut)
    }

    /// Embedded entities in update order
    pub fn entities(&self) -> impl Iterator<Item = (EntityKey, &Entity)> + '_ {
        self.registry.iter()
    }

    /// Queue for spawns and removals applied at the end of the next tick
    pub fn commands_mut(&mut self) -> &mut CommandQueue {
        self.registry.commands_mut()
    }

    /// Attach a receiver to the shapes of an embedded entity
    ///
    /// # Panics
    ///
    /// Panics if one of its shapes already carries a receiver.
    pub fn attach_receiver(
        &mut self,
        key: EntityKey,
        receiver: impl CollisionReceiver + 'static,
    ) -> Result<ReceiverKey> {
        self.registry.attach_receiver(key, Box::new(receiver))
    }

    /// Move an embedded entity and stop it
    pub fn teleport(&mut self, key: EntityKey, position: Vec2) -> Result<()> {
        let body = self.body_of(key)?;
        self.physics.set_position(body, position);
        debug!("Teleported {:?} to {:?}", key, position);
        Ok(())
    }

    /// Overwrite the linear velocity of an embedded entity
    pub fn set_velocity(&mut self, key: EntityKey, velocity: Vec2) -> Result<()> {
        let body = self.body_of(key)?;
        self.physics.set_velocity(body, velocity);
        Ok(())
    }

    fn body_of(&self, key: EntityKey) -> Result<RigidBodyHandle> {
        self.registry
            .get(key)
            .and_then(Entity::attachment)
            .map(|attachment| attachment.body)
            .ok_or(CageError::NotEmbedded)
    }

    /// Advance by the configured timestep
    pub fn step(&mut self) -> TickReport {
        self.process_time_step(self.config.world.timestep)
    }

    /// Advance the whole cage by `dt` seconds
    pub fn process_time_step(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();

        self.registry.step_logic(dt, &mut self.physics);

        let contacts = self.physics.detect_contacts();
        for event in &contacts.began {
            report.began += 1;
            if !self.registry.dispatch(ContactPhase::Begin, event) {
                self.physics.suppress(event.key);
                report.suppressed += 1;
            }
        }

        let mut resolved = Vec::new();
        for event in contacts.began.iter().chain(&contacts.persisted) {
            if self.physics.is_suppressed(&event.key) {
                continue;
            }
            if self.registry.dispatch(ContactPhase::PreSolve, event) {
                resolved.push(event);
            } else {
                self.physics.suppress_for_step(event.key);
            }
        }
        for event in &contacts.separated {
            report.separated += 1;
            self.registry.dispatch(ContactPhase::Separate, event);
        }

        self.physics.step(dt);

        for event in resolved {
            self.registry.dispatch(ContactPhase::PostSolve, event);
        }

        report.applied = self.registry.apply_commands(&mut self.physics);

        self.time += f64::from(dt);
        self.steps += 1;
        trace!("Tick {} done: {:?}", self.steps, report);
        report
    }

    /// Collect draw primitives for every entity and receiver
    pub fn draw_things(&self, list: &mut DrawList) {
        self.registry.draw(&self.physics, list);
    }
}
