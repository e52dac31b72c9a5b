//! Contact tracking between shapes
//!
//! Before each step the world detects which shape pairs touch at the current
//! positions. The tracker keeps the set from the previous detection and diffs
//! it against the new one (enter/exit detection), and keeps the set of pairs
//! whose contacts the solver must ignore.

use std::collections::{HashMap, HashSet};

use rapier2d::prelude::{ColliderHandle, ContactModificationContext, PhysicsHooks};

use crate::foundation::math::{Point2, Vec2};

/// Unordered pair of shapes (stores the smaller handle first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactKey {
    /// First shape of the pair
    pub shape_a: ColliderHandle,
    /// Second shape of the pair
    pub shape_b: ColliderHandle,
}

impl ContactKey {
    /// Create a new contact key, normalizing the order of the two shapes
    pub fn new(shape_a: ColliderHandle, shape_b: ColliderHandle) -> Self {
        if shape_a.into_raw_parts() <= shape_b.into_raw_parts() {
            Self { shape_a, shape_b }
        } else {
            Self { shape_a: shape_b, shape_b: shape_a }
        }
    }

    /// Whether `shape` is one of the two members
    pub fn involves(&self, shape: ColliderHandle) -> bool {
        self.shape_a == shape || self.shape_b == shape
    }

    fn order(&self) -> ((u32, u32), (u32, u32)) {
        (self.shape_a.into_raw_parts(), self.shape_b.into_raw_parts())
    }
}

/// One contact point of a touching pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// World-space position
    pub position: Point2,
    /// World-space normal, pointing from the first shape towards the second
    pub normal: Vec2,
}

/// A touching pair and its contact points
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEvent {
    /// The pair of shapes
    pub key: ContactKey,
    /// Contact points (empty for separation)
    pub points: Vec<ContactPoint>,
}

/// Contact changes since the previous detection
#[derive(Debug, Clone, Default)]
pub struct ContactReport {
    /// Pairs that started touching
    pub began: Vec<ContactEvent>,
    /// Pairs that were already touching and still are
    pub persisted: Vec<ContactEvent>,
    /// Pairs that stopped touching
    pub separated: Vec<ContactEvent>,
}

impl ContactReport {
    /// True when nothing changed and nothing is touching
    pub fn is_empty(&self) -> bool {
        self.began.is_empty() && self.persisted.is_empty() && self.separated.is_empty()
    }
}

/// Touching pairs across steps plus solver suppression state
#[derive(Debug, Default)]
pub struct ContactTracker {
    touching: HashMap<ContactKey, Vec<ContactPoint>>,
    suppressed: HashSet<ContactKey>,
    suppressed_this_step: HashSet<ContactKey>,
}

impl ContactTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs touching at the last detection, in deterministic order
    pub fn touching(&self) -> Vec<ContactEvent> {
        let mut events: Vec<ContactEvent> = self
            .touching
            .iter()
            .map(|(key, points)| ContactEvent { key: *key, points: points.clone() })
            .collect();
        sort_events(&mut events);
        events
    }

    /// Whether the pair was touching at the last detection
    pub fn is_touching(&self, key: &ContactKey) -> bool {
        self.touching.contains_key(key)
    }

    /// Ignore the pair in the solver until it separates
    pub fn suppress(&mut self, key: ContactKey) {
        self.suppressed.insert(key);
    }

    /// Ignore the pair in the solver for the next step only
    pub fn suppress_for_step(&mut self, key: ContactKey) {
        self.suppressed_this_step.insert(key);
    }

    /// Whether the solver currently ignores the pair
    pub fn is_suppressed(&self, key: &ContactKey) -> bool {
        self.suppressed.contains(key) || self.suppressed_this_step.contains(key)
    }

    /// Whether the pair is ignored until separation
    pub fn is_suppressed_until_separation(&self, key: &ContactKey) -> bool {
        self.suppressed.contains(key)
    }

    /// Replace the touching set with a new detection and diff it
    pub fn update(&mut self, now: HashMap<ContactKey, Vec<ContactPoint>>) -> ContactReport {
        let mut report = ContactReport::default();

        for (key, points) in &now {
            let event = ContactEvent { key: *key, points: points.clone() };
            if self.touching.contains_key(key) {
                report.persisted.push(event);
            } else {
                report.began.push(event);
            }
        }

        for key in self.touching.keys() {
            if !now.contains_key(key) {
                report.separated.push(ContactEvent { key: *key, points: Vec::new() });
                self.suppressed.remove(key);
            }
        }

        self.touching = now;

        sort_events(&mut report.began);
        sort_events(&mut report.persisted);
        sort_events(&mut report.separated);
        report
    }

    /// Expire single-step suppressions once the solver has run
    pub fn end_step(&mut self) {
        self.suppressed_this_step.clear();
    }

    /// Drop every pair involving one of `shapes` without reporting it
    pub fn forget_shapes(&mut self, shapes: &[ColliderHandle]) {
        let involved = |key: &ContactKey| shapes.iter().any(|shape| key.involves(*shape));
        self.touching.retain(|key, _| !involved(key));
        self.suppressed.retain(|key| !involved(key));
        self.suppressed_this_step.retain(|key| !involved(key));
    }
}

fn sort_events(events: &mut [ContactEvent]) {
    events.sort_by_key(|event| event.key.order());
}

/// Solver hook clearing the contacts of suppressed pairs
pub(crate) struct ContactHooks<'a> {
    pub(crate) tracker: &'a ContactTracker,
}

impl PhysicsHooks for ContactHooks<'_> {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let key = ContactKey::new(context.collider1, context.collider2);
        if self.tracker.is_suppressed(&key) {
            context.solver_contacts.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(index: u32) -> ColliderHandle {
        ColliderHandle::from_raw_parts(index, 0)
    }

    fn touching(keys: &[ContactKey]) -> HashMap<ContactKey, Vec<ContactPoint>> {
        keys.iter().map(|key| (*key, Vec::new())).collect()
    }

    #[test]
    fn test_key_is_order_independent() {
        assert_eq!(ContactKey::new(handle(1), handle(2)), ContactKey::new(handle(2), handle(1)));
    }

    #[test]
    fn test_enter_persist_exit() {
        let mut tracker = ContactTracker::new();
        let pair = ContactKey::new(handle(1), handle(2));

        let report = tracker.update(touching(&[pair]));
        assert_eq!(report.began.len(), 1);
        assert!(report.separated.is_empty());

        let report = tracker.update(touching(&[pair]));
        assert!(report.began.is_empty());
        assert_eq!(report.persisted.len(), 1);

        let report = tracker.update(HashMap::new());
        assert_eq!(report.separated.len(), 1);
        assert_eq!(report.separated[0].key, pair);
    }

    #[test]
    fn test_separation_lifts_suppression() {
        let mut tracker = ContactTracker::new();
        let pair = ContactKey::new(handle(3), handle(4));
        tracker.update(touching(&[pair]));
        tracker.suppress(pair);

        tracker.update(touching(&[pair]));
        assert!(tracker.is_suppressed(&pair));

        tracker.update(HashMap::new());
        assert!(!tracker.is_suppressed(&pair));
    }

    #[test]
    fn test_step_suppression_lasts_one_step() {
        let mut tracker = ContactTracker::new();
        let pair = ContactKey::new(handle(5), handle(6));
        tracker.update(touching(&[pair]));
        tracker.suppress_for_step(pair);
        assert!(tracker.is_suppressed(&pair));
        assert!(!tracker.is_suppressed_until_separation(&pair));

        tracker.end_step();
        assert!(!tracker.is_suppressed(&pair));
    }

    #[test]
    fn test_forgotten_shapes_do_not_separate() {
        let mut tracker = ContactTracker::new();
        let pair = ContactKey::new(handle(1), handle(2));
        tracker.update(touching(&[pair]));
        tracker.forget_shapes(&[handle(2)]);

        let report = tracker.update(HashMap::new());
        assert!(report.separated.is_empty());
    }
}
