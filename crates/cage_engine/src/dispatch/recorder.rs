//! Receiver that records contacts for telemetry and debug drawing

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::draw::DrawList;
use crate::foundation::collections::EntityKey;
use crate::foundation::math::Color;
use crate::physics::{ContactPoint, PhysicsWorld};

use super::{CollisionReceiver, ContactPhase, DispatchContext};

/// One recorded contact
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedContact {
    /// Phase in which it was seen
    pub phase: ContactPhase,
    /// The counterpart entity
    pub other: EntityKey,
    /// Color of the counterpart when the contact was seen
    pub color: Color,
    /// Contact points, normals pointing away from the recorder's shape
    pub contacts: Vec<ContactPoint>,
}

/// Contacts of the current tick plus running totals
///
/// Entries are cleared when the next tick starts; totals are kept for the
/// recorder's whole life.
#[derive(Debug, Clone, Default)]
pub struct ContactLog {
    entries: Vec<RecordedContact>,
    totals: HashMap<ContactPhase, usize>,
}

impl ContactLog {
    /// All entries in arrival order
    pub fn entries(&self) -> &[RecordedContact] {
        &self.entries
    }

    /// Number of current entries seen in `phase`
    pub fn count(&self, phase: ContactPhase) -> usize {
        self.entries.iter().filter(|entry| entry.phase == phase).count()
    }

    /// Number of contacts ever recorded in `phase`
    pub fn total(&self, phase: ContactPhase) -> usize {
        self.totals.get(&phase).copied().unwrap_or(0)
    }

    /// Drop the current entries, keeping the totals
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push(&mut self, entry: RecordedContact) {
        *self.totals.entry(entry.phase).or_insert(0) += 1;
        self.entries.push(entry);
    }
}

/// Records the phases it is enabled for and never suppresses a contact
#[derive(Debug)]
pub struct ContactRecorder {
    phases: Vec<ContactPhase>,
    normal_scale: f32,
    log: Rc<RefCell<ContactLog>>,
}

impl ContactRecorder {
    /// Record the given phases
    pub fn new(phases: &[ContactPhase]) -> Self {
        Self {
            phases: phases.to_vec(),
            normal_scale: 1.0,
            log: Rc::new(RefCell::new(ContactLog::default())),
        }
    }

    /// Builder: length of the drawn normals
    pub fn with_normal_scale(mut self, scale: f32) -> Self {
        self.normal_scale = scale;
        self
    }

    /// Shared handle on the log, readable after the recorder is attached
    pub fn log(&self) -> Rc<RefCell<ContactLog>> {
        Rc::clone(&self.log)
    }

    fn record(
        &self,
        phase: ContactPhase,
        ctx: &DispatchContext<'_>,
        other: EntityKey,
        contacts: &[ContactPoint],
    ) -> bool {
        if self.phases.contains(&phase) {
            let color = ctx.entity(other).map_or_else(Color::zeros, |entity| entity.color());
            self.log.borrow_mut().push(RecordedContact {
                phase,
                other,
                color,
                contacts: contacts.to_vec(),
            });
        }
        true
    }
}

impl CollisionReceiver for ContactRecorder {
    fn update(&mut self, _dt: f32) {
        self.log.borrow_mut().clear();
    }

    fn on_begin(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        other: EntityKey,
        contacts: &[ContactPoint],
    ) -> bool {
        self.record(ContactPhase::Begin, ctx, other, contacts)
    }

    fn on_pre_solve(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        other: EntityKey,
        contacts: &[ContactPoint],
    ) -> bool {
        self.record(ContactPhase::PreSolve, ctx, other, contacts)
    }

    fn on_post_solve(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        other: EntityKey,
        contacts: &[ContactPoint],
    ) -> bool {
        self.record(ContactPhase::PostSolve, ctx, other, contacts)
    }

    fn on_separate(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        other: EntityKey,
        contacts: &[ContactPoint],
    ) -> bool {
        self.record(ContactPhase::Separate, ctx, other, contacts)
    }

    fn draw(&self, _physics: &PhysicsWorld, list: &mut DrawList) {
        let white = Color::new(1.0, 1.0, 1.0);
        for entry in self.log.borrow().entries() {
            for contact in &entry.contacts {
                list.dot(contact.position, white);
                let tip = contact.position + contact.normal * self.normal_scale;
                list.line(contact.position, tip, 0.0, entry.color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point2, Vec2};

    fn entry(phase: ContactPhase) -> RecordedContact {
        RecordedContact {
            phase,
            other: EntityKey::default(),
            color: Color::new(0.0, 1.0, 0.0),
            contacts: vec![ContactPoint {
                position: Point2::new(1.0, 0.0),
                normal: Vec2::new(0.0, -1.0),
            }],
        }
    }

    #[test]
    fn test_new_tick_clears_entries_but_keeps_totals() {
        let mut recorder = ContactRecorder::new(&[ContactPhase::Begin]);
        let log = recorder.log();
        log.borrow_mut().push(entry(ContactPhase::Begin));
        log.borrow_mut().push(entry(ContactPhase::Begin));
        assert_eq!(log.borrow().count(ContactPhase::Begin), 2);

        recorder.update(1.0 / 30.0);
        assert!(log.borrow().entries().is_empty());
        assert_eq!(log.borrow().count(ContactPhase::Begin), 0);
        assert_eq!(log.borrow().total(ContactPhase::Begin), 2);
        assert_eq!(log.borrow().total(ContactPhase::Separate), 0);
    }

    #[test]
    fn test_draw_shows_only_current_tick() {
        let mut recorder = ContactRecorder::new(&[ContactPhase::Begin]).with_normal_scale(0.5);
        let physics = PhysicsWorld::new(&crate::config::WorldConfig::default()).unwrap();
        recorder.log().borrow_mut().push(entry(ContactPhase::Begin));

        let mut list = DrawList::new();
        recorder.draw(&physics, &mut list);
        assert_eq!(list.len(), 2);

        recorder.update(1.0 / 30.0);
        list.clear();
        recorder.draw(&physics, &mut list);
        assert!(list.is_empty());
    }
}
