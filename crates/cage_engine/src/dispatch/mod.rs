//! Collision dispatch
//!
//! Key principles:
//! - A receiver is an optional capability attached to a shape
//! - Each contact is offered to the receiver of each shape in the pair
//! - Handlers return bool (true = resolve the contact, false = suppress it)
//! - Verdicts combine by logical AND; every receiver is always invoked
//! - Receivers never mutate the registry directly, they queue commands

mod recorder;

pub use recorder::{ContactLog, ContactRecorder, RecordedContact};

use crate::draw::DrawList;
use crate::entity::{CommandQueue, Entity, ShapeTable};
use crate::foundation::collections::{EntityKey, EntityMap, ReceiverKey, SlotMap};
use crate::physics::{ContactEvent, ContactPoint, PhysicsWorld};

/// Phase of a contact's life in which a receiver is consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    /// The pair started touching; runs before the step that would resolve it
    Begin,
    /// The pair is about to be resolved by the coming step
    PreSolve,
    /// The pair was resolved by the step that just ran
    PostSolve,
    /// The pair stopped touching
    Separate,
}

/// Reacts to contacts of the shapes it is attached to
///
/// Every handler receives the counterpart entity and the contact points,
/// with normals pointing away from the receiving shape. Returning `false`
/// asks the solver not to resolve the contact.
pub trait CollisionReceiver {
    /// The shapes started touching
    fn on_begin(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
        _other: EntityKey,
        _contacts: &[ContactPoint],
    ) -> bool {
        true
    }

    /// The shapes are about to be resolved this step
    fn on_pre_solve(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
        _other: EntityKey,
        _contacts: &[ContactPoint],
    ) -> bool {
        true
    }

    /// The shapes were resolved this step
    fn on_post_solve(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
        _other: EntityKey,
        _contacts: &[ContactPoint],
    ) -> bool {
        true
    }

    /// The shapes stopped touching
    fn on_separate(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
        _other: EntityKey,
        _contacts: &[ContactPoint],
    ) -> bool {
        true
    }

    /// Called once per tick, before any contact of that tick is offered
    fn update(&mut self, _dt: f32) {}

    /// Emit draw primitives (nothing by default)
    fn draw(&self, _physics: &PhysicsWorld, _list: &mut DrawList) {}
}

/// What a receiver may touch while handling a contact
pub struct DispatchContext<'a> {
    this: EntityKey,
    entities: &'a mut EntityMap<Entity>,
    commands: &'a mut CommandQueue,
}

impl<'a> DispatchContext<'a> {
    pub(crate) fn new(
        this: EntityKey,
        entities: &'a mut EntityMap<Entity>,
        commands: &'a mut CommandQueue,
    ) -> Self {
        Self { this, entities, commands }
    }

    /// Entity the receiver is attached to
    pub fn this(&self) -> EntityKey {
        self.this
    }

    /// Look up any live entity
    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Mutably look up any live entity
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Queue an entity for removal at the end of the tick
    pub fn remove(&mut self, key: EntityKey) {
        self.commands.remove(key);
    }

    /// Queue an entity for insertion at the end of the tick
    pub fn spawn(&mut self, entity: Entity) {
        self.commands.spawn(entity);
    }
}

struct ReceiverEntry {
    owner: EntityKey,
    receiver: Box<dyn CollisionReceiver>,
}

/// Storage for receivers, keyed by [`ReceiverKey`]
#[derive(Default)]
pub struct ReceiverTable {
    entries: SlotMap<ReceiverKey, ReceiverEntry>,
}

impl ReceiverTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a receiver acting on behalf of `owner`
    pub fn insert(
        &mut self,
        owner: EntityKey,
        receiver: Box<dyn CollisionReceiver>,
    ) -> ReceiverKey {
        self.entries.insert(ReceiverEntry { owner, receiver })
    }

    /// Drop a receiver
    pub fn remove(&mut self, key: ReceiverKey) -> Option<Box<dyn CollisionReceiver>> {
        self.entries.remove(key).map(|entry| entry.receiver)
    }

    /// Whether the receiver is stored
    pub fn contains(&self, key: ReceiverKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored receivers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no receivers are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a new tick for every receiver
    pub fn update(&mut self, dt: f32) {
        for entry in self.entries.values_mut() {
            entry.receiver.update(dt);
        }
    }

    /// Let every receiver draw
    pub fn draw(&self, physics: &PhysicsWorld, list: &mut DrawList) {
        for entry in self.entries.values() {
            entry.receiver.draw(physics, list);
        }
    }
}

/// Borrowed registry parts a dispatch pass needs
pub(crate) struct DispatchTargets<'a> {
    pub(crate) shapes: &'a ShapeTable,
    pub(crate) receivers: &'a mut ReceiverTable,
    pub(crate) entities: &'a mut EntityMap<Entity>,
    pub(crate) commands: &'a mut CommandQueue,
}

/// Offer one contact to both shapes' receivers and combine the verdicts
///
/// A direction is skipped (counts as `true`) when the shape has no receiver
/// or the counterpart shape has no owner.
pub(crate) fn dispatch(
    phase: ContactPhase,
    event: &ContactEvent,
    targets: &mut DispatchTargets<'_>,
) -> bool {
    let key = event.key;
    let mut verdict = true;

    let sides = [(key.shape_a, key.shape_b, false), (key.shape_b, key.shape_a, true)];
    for (this_shape, other_shape, flip) in sides {
        let Some(receiver_key) = targets.shapes.receiver(this_shape) else {
            continue;
        };
        let Some(other) = targets.shapes.owner(other_shape) else {
            continue;
        };
        let Some(entry) = targets.receivers.entries.get_mut(receiver_key) else {
            continue;
        };

        let contacts: Vec<ContactPoint> = if flip {
            event
                .points
                .iter()
                .map(|p| ContactPoint { position: p.position, normal: -p.normal })
                .collect()
        } else {
            event.points.clone()
        };

        let mut ctx =
            DispatchContext::new(entry.owner, &mut *targets.entities, &mut *targets.commands);
        let handled = invoke(entry.receiver.as_mut(), phase, &mut ctx, other, &contacts);
        verdict = verdict && handled;
    }
    verdict
}

fn invoke(
    receiver: &mut dyn CollisionReceiver,
    phase: ContactPhase,
    ctx: &mut DispatchContext<'_>,
    other: EntityKey,
    contacts: &[ContactPoint],
) -> bool {
    match phase {
        ContactPhase::Begin => receiver.on_begin(ctx, other, contacts),
        ContactPhase::PreSolve => receiver.on_pre_solve(ctx, other, contacts),
        ContactPhase::PostSolve => receiver.on_post_solve(ctx, other, contacts),
        ContactPhase::Separate => receiver.on_separate(ctx, other, contacts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::StaticLines;
    use crate::foundation::math::{Color, Point2, Vec2};
    use crate::physics::{ColliderHandle, ContactKey};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Fixed {
        verdict: bool,
        calls: Rc<Cell<u32>>,
    }

    impl CollisionReceiver for Fixed {
        fn on_begin(
            &mut self,
            _ctx: &mut DispatchContext<'_>,
            _other: EntityKey,
            _contacts: &[ContactPoint],
        ) -> bool {
            self.calls.set(self.calls.get() + 1);
            self.verdict
        }
    }

    struct Harness {
        shapes: ShapeTable,
        receivers: ReceiverTable,
        entities: EntityMap<Entity>,
        commands: CommandQueue,
        a: EntityKey,
        b: EntityKey,
    }

    fn shape(index: u32) -> ColliderHandle {
        ColliderHandle::from_raw_parts(index, 0)
    }

    fn lines() -> Entity {
        StaticLines::new(&[Point2::origin(), Point2::new(1.0, 0.0)], 0.1, Color::zeros())
            .unwrap()
            .into()
    }

    fn harness() -> Harness {
        let mut entities = EntityMap::with_key();
        let a = entities.insert(lines());
        let b = entities.insert(lines());
        let mut shapes = ShapeTable::new();
        shapes.stamp(&[shape(0)], a);
        shapes.stamp(&[shape(1)], b);
        Harness {
            shapes,
            receivers: ReceiverTable::new(),
            entities,
            commands: CommandQueue::default(),
            a,
            b,
        }
    }

    impl Harness {
        fn attach(&mut self, index: u32, owner: EntityKey, verdict: bool) -> Rc<Cell<u32>> {
            let calls = Rc::new(Cell::new(0));
            let receiver = Fixed {
                verdict,
                calls: calls.clone(),
            };
            let key = self.receivers.insert(owner, Box::new(receiver));
            self.shapes.attach(shape(index), key);
            calls
        }

        fn begin(&mut self, a: u32, b: u32) -> bool {
            let event = ContactEvent {
                key: ContactKey::new(shape(a), shape(b)),
                points: vec![ContactPoint {
                    position: Point2::origin(),
                    normal: Vec2::new(0.0, 1.0),
                }],
            };
            let mut targets = DispatchTargets {
                shapes: &self.shapes,
                receivers: &mut self.receivers,
                entities: &mut self.entities,
                commands: &mut self.commands,
            };
            dispatch(ContactPhase::Begin, &event, &mut targets)
        }
    }

    #[test]
    fn test_false_and_true_is_false() {
        let mut h = harness();
        let (a, b) = (h.a, h.b);
        let first = h.attach(0, a, false);
        let second = h.attach(1, b, true);

        assert!(!h.begin(0, 1));
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1, "second receiver runs even after a false verdict");
    }

    #[test]
    fn test_true_and_true_is_true() {
        let mut h = harness();
        let (a, b) = (h.a, h.b);
        h.attach(0, a, true);
        h.attach(1, b, true);
        assert!(h.begin(0, 1));
    }

    #[test]
    fn test_unknown_counterpart_is_not_invoked() {
        let mut h = harness();
        let a = h.a;
        let calls = h.attach(0, a, false);

        assert!(h.begin(0, 7));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_no_receivers_resolve() {
        let mut h = harness();
        assert!(h.begin(0, 1));
    }
}
