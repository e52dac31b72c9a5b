//! Entity registry
//!
//! Owns the live entities, the shape side-table, the receivers and the
//! queue of mutations requested while a tick is in progress.

use crate::dispatch::{dispatch, CollisionReceiver, ContactPhase, DispatchTargets, ReceiverTable};
use crate::draw::DrawList;
use crate::error::{CageError, Result};
use crate::foundation::collections::{EntityKey, EntityMap, EntitySideMap, ReceiverKey};
use crate::foundation::logging::{debug, trace};
use crate::foundation::math::Color;
use crate::physics::{ContactEvent, GroupAllocator, PhysicsWorld};

use super::{Entity, ShapeTable, UpdateContext};

/// A registry mutation requested during a tick
#[derive(Debug)]
pub enum Command {
    /// Insert and embed a new entity
    Spawn(Entity),
    /// Remove an entity (ignored if it is already gone)
    Remove(EntityKey),
}

/// Mutations applied between ticks, in request order
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    /// Request insertion of `entity`
    pub fn spawn(&mut self, entity: Entity) {
        self.commands.push(Command::Spawn(entity));
    }

    /// Request removal of `key`
    pub fn remove(&mut self, key: EntityKey) {
        self.commands.push(Command::Remove(key));
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

/// The set of live entities
#[derive(Default)]
pub struct Registry {
    entities: EntityMap<Entity>,
    order: Vec<EntityKey>,
    groups: GroupAllocator,
    shapes: ShapeTable,
    receivers: ReceiverTable,
    commands: CommandQueue,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entity without embedding it
    pub fn insert(&mut self, entity: Entity) -> EntityKey {
        self.entities.insert(entity)
    }

    /// Store an entity and embed it in the world
    pub fn add(&mut self, entity: Entity, physics: &mut PhysicsWorld) -> EntityKey {
        let key = self.insert(entity);
        self.embed(key, physics);
        key
    }

    /// Embed a stored entity and return its index in update order
    ///
    /// Embedding an already embedded entity returns its existing index.
    ///
    /// # Panics
    ///
    /// Panics if `key` was never inserted.
    pub fn embed(&mut self, key: EntityKey, physics: &mut PhysicsWorld) -> usize {
        if let Some(index) = self.index_of(key) {
            return index;
        }
        let Some(entity) = self.entities.get_mut(key) else {
            panic!("cannot embed {key:?}: entity was never registered");
        };

        let attachment = entity.join_world(physics, &mut self.groups);
        self.shapes.stamp(&attachment.shapes, key);
        self.order.push(key);
        debug!("Embedded {:?} with {} shapes", key, attachment.shapes.len());
        self.order.len() - 1
    }

    /// Remove an entity, detaching it from the world
    ///
    /// Receivers attached to its shapes are dropped.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not registered.
    pub fn remove(&mut self, key: EntityKey, physics: &mut PhysicsWorld) -> Entity {
        let Some(mut entity) = self.entities.remove(key) else {
            panic!("cannot remove {key:?}: entity was never registered");
        };
        self.order.retain(|k| *k != key);

        if let Some(attachment) = entity.attachment() {
            for receiver in self.shapes.clear(&attachment.shapes) {
                self.receivers.remove(receiver);
            }
        }
        entity.leave_world(physics);
        debug!("Removed {:?}", key);
        entity
    }

    /// Whether `key` is registered
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// Position of `key` in update order, if embedded
    pub fn index_of(&self, key: EntityKey) -> Option<usize> {
        self.order.iter().position(|k| *k == key)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is registered
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up an entity
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Mutably look up an entity
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Embedded entities in update order
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> + '_ {
        self.order.iter().filter_map(|key| self.entities.get(*key).map(|e| (*key, e)))
    }

    /// Shape owner and receiver side-table
    pub fn shapes(&self) -> &ShapeTable {
        &self.shapes
    }

    /// Stored receivers
    pub fn receivers(&self) -> &ReceiverTable {
        &self.receivers
    }

    /// Pending mutations
    pub fn commands_mut(&mut self) -> &mut CommandQueue {
        &mut self.commands
    }

    /// Attach a receiver to every shape of an embedded entity
    ///
    /// # Panics
    ///
    /// Panics if one of the shapes already carries a receiver.
    pub fn attach_receiver(
        &mut self,
        key: EntityKey,
        receiver: Box<dyn CollisionReceiver>,
    ) -> Result<ReceiverKey> {
        let shapes = match self.entities.get(key).and_then(Entity::attachment) {
            Some(attachment) => attachment.shapes.clone(),
            None => return Err(CageError::NotEmbedded),
        };
        let receiver_key = self.receivers.insert(key, receiver);
        for shape in shapes {
            self.shapes.attach(shape, receiver_key);
        }
        debug!("Attached receiver {:?} to {:?}", receiver_key, key);
        Ok(receiver_key)
    }

    /// Colors of every entity, captured before entities are mutated
    pub fn color_snapshot(&self) -> EntitySideMap<Color> {
        let mut colors = EntitySideMap::new();
        for (key, entity) in &self.entities {
            colors.insert(key, entity.color());
        }
        colors
    }

    /// Run every embedded entity's update in registry order
    pub fn step_logic(&mut self, dt: f32, physics: &mut PhysicsWorld) {
        let colors = self.color_snapshot();
        let mut ctx = UpdateContext {
            physics,
            shapes: &self.shapes,
            colors: &colors,
        };
        for key in &self.order {
            if let Some(entity) = self.entities.get_mut(*key) {
                entity.update(&mut ctx, dt);
            }
        }
        self.receivers.update(dt);
        trace!("Updated {} entities", self.order.len());
    }

    /// Collect draw primitives from every entity, then every receiver
    pub fn draw(&self, physics: &PhysicsWorld, list: &mut DrawList) {
        for (_, entity) in self.iter() {
            entity.draw(physics, list);
        }
        self.receivers.draw(physics, list);
    }

    /// Offer a contact to the receivers of both shapes
    pub fn dispatch(&mut self, phase: ContactPhase, event: &ContactEvent) -> bool {
        let mut targets = DispatchTargets {
            shapes: &self.shapes,
            receivers: &mut self.receivers,
            entities: &mut self.entities,
            commands: &mut self.commands,
        };
        dispatch(phase, event, &mut targets)
    }

    /// Apply queued spawns and removals, returning how many took effect
    pub fn apply_commands(&mut self, physics: &mut PhysicsWorld) -> usize {
        let mut applied = 0;
        for command in self.commands.take() {
            match command {
                Command::Spawn(entity) => {
                    self.add(entity, physics);
                    applied += 1;
                }
                Command::Remove(key) if self.contains(key) => {
                    self.remove(key, physics);
                    applied += 1;
                }
                Command::Remove(key) => {
                    trace!("Skipping removal of {:?}: already gone", key);
                }
            }
        }
        applied
    }
}
