//! Receivers reacting to real contacts inside a running cage

use super::{cage, floor, DT};
use crate::config::EaterConfig;
use crate::creature::Eater;
use crate::dispatch::{CollisionReceiver, ContactPhase, ContactRecorder, DispatchContext};
use crate::entity::{Ball, Entity};
use crate::foundation::collections::EntityKey;
use crate::foundation::math::{Color, Vec2};
use crate::physics::ContactPoint;

struct Eat;

impl CollisionReceiver for Eat {
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
            eater.creature_mut().add_energy(0.1);
            eater.record_consumption();
        }
        ctx.remove(other);
        false
    }
}

struct Veto {
    begin: bool,
    pre_solve: bool,
}

impl CollisionReceiver for Veto {
    fn on_begin(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
        _other: EntityKey,
        _contacts: &[ContactPoint],
    ) -> bool {
        self.begin
    }

    fn on_pre_solve(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
        _other: EntityKey,
        _contacts: &[ContactPoint],
    ) -> bool {
        self.pre_solve
    }
}

fn resting_ball() -> Ball {
    Ball::new(Vec2::new(0.0, 0.35), 0.25, 50.0, Color::new(0.0, 0.1, 0.9)).unwrap()
}

#[test]
fn test_eater_consumes_food_on_touch() {
    let mut cage = cage(0.0);
    let eater = cage.add(Eater::new(&EaterConfig::default(), Vec2::zeros()).unwrap());
    let food = cage.add(Ball::food(Vec2::new(1.5, 0.0)).unwrap());
    cage.attach_receiver(eater, Eat).unwrap();
    cage.set_velocity(eater, Vec2::new(3.0, 0.0)).unwrap();

    let mut removed = 0;
    for _ in 0..30 {
        removed += cage.process_time_step(DT).applied;
    }

    assert_eq!(removed, 1);
    assert!(cage.entity(food).is_none());
    let eater = cage.eater(eater).unwrap();
    assert_eq!(eater.consumed(), 1);
    assert!((eater.energy() - 1.1).abs() < 1e-6);
    assert_eq!(cage.physics().body_count(), 1);
}

#[test]
fn test_eaten_food_never_slows_the_eater() {
    let mut cage = cage(0.0);
    let eater = cage.add(Eater::new(&EaterConfig::default(), Vec2::zeros()).unwrap());
    let food = cage.add(Ball::food(Vec2::new(1.5, 0.0)).unwrap());
    cage.attach_receiver(eater, Eat).unwrap();
    cage.set_velocity(eater, Vec2::new(3.0, 0.0)).unwrap();

    let mut began = 0;
    for _ in 0..30 {
        let report = cage.process_time_step(DT);
        began += report.began;
        let body = cage.entity(eater).and_then(Entity::attachment).unwrap().body;
        let vx = cage.physics().velocity(body).unwrap().x;
        assert!((vx - 3.0).abs() < 1e-4, "eater slowed to {vx}");
    }
    assert_eq!(began, 1);
    assert!(cage.entity(food).is_none());
}

#[test]
fn test_non_food_is_not_eaten() {
    let mut cage = cage(9.81);
    floor(&mut cage, 0.0);
    let eater = cage.add(Eater::new(&EaterConfig::default(), Vec2::new(0.0, 0.35)).unwrap());
    cage.attach_receiver(eater, Eat).unwrap();

    for _ in 0..30 {
        cage.process_time_step(DT);
    }
    let position = cage.eater(eater).unwrap().position(cage.physics());
    assert!((position.y - 0.35).abs() < 0.05);
    assert_eq!(cage.eater(eater).unwrap().consumed(), 0);
}

#[test]
fn test_recorder_sees_begin_and_separate() {
    let mut cage = cage(9.81);
    let ground = floor(&mut cage, 0.0);
    let ball = cage.add(resting_ball());
    let recorder = ContactRecorder::new(&[ContactPhase::Begin, ContactPhase::Separate]);
    let log = recorder.log();
    cage.attach_receiver(ball, recorder).unwrap();

    let report = cage.process_time_step(DT);
    assert_eq!(report.began, 1);
    {
        let log = log.borrow();
        assert_eq!(log.count(ContactPhase::Begin), 1);
        let entry = &log.entries()[0];
        assert_eq!(entry.other, ground);
        assert_eq!(entry.color, Color::new(0.0, 1.0, 0.0));
        assert!(entry.contacts.iter().all(|c| c.normal.y < -0.5));
    }

    cage.teleport(ball, Vec2::new(0.0, 5.0)).unwrap();
    cage.process_time_step(DT);
    assert_eq!(log.borrow().count(ContactPhase::Separate), 1);
    assert_eq!(log.borrow().count(ContactPhase::Begin), 0);

    cage.process_time_step(DT);
    assert!(log.borrow().entries().is_empty());
    assert_eq!(log.borrow().total(ContactPhase::Begin), 1);
    assert_eq!(log.borrow().total(ContactPhase::Separate), 1);
}

#[test]
fn test_begin_veto_lets_ball_fall_through() {
    let mut cage = cage(9.81);
    floor(&mut cage, 0.0);
    let ball = cage.add(resting_ball());
    cage.attach_receiver(ball, Veto { begin: false, pre_solve: true }).unwrap();

    let first = cage.process_time_step(DT);
    assert_eq!(first.suppressed, 1);
    for _ in 0..30 {
        cage.process_time_step(DT);
    }
    let position = cage.entity(ball).unwrap().position(cage.physics());
    assert!(position.y < -0.5, "ball stuck at {}", position.y);
}

#[test]
fn test_pre_solve_veto_lets_ball_fall_through() {
    let mut cage = cage(9.81);
    floor(&mut cage, 0.0);
    let ball = cage.add(resting_ball());
    cage.attach_receiver(ball, Veto { begin: true, pre_solve: false }).unwrap();

    for _ in 0..30 {
        cage.process_time_step(DT);
    }
    let position = cage.entity(ball).unwrap().position(cage.physics());
    assert!(position.y < -0.5, "ball stuck at {}", position.y);
}

#[test]
fn test_receivers_without_veto_keep_contact() {
    let mut cage = cage(9.81);
    floor(&mut cage, 0.0);
    let ball = cage.add(resting_ball());
    cage.attach_receiver(ball, Veto { begin: true, pre_solve: true }).unwrap();

    for _ in 0..30 {
        cage.process_time_step(DT);
    }
    let position = cage.entity(ball).unwrap().position(cage.physics());
    assert!((position.y - 0.35).abs() < 0.05);
}

#[test]
#[should_panic(expected = "already carries receiver")]
fn test_second_receiver_on_shape_panics() {
    let mut cage = cage(0.0);
    let ball = cage.add(resting_ball());
    cage.attach_receiver(ball, Veto { begin: true, pre_solve: true }).unwrap();
    let _ = cage.attach_receiver(ball, Veto { begin: true, pre_solve: true });
}

#[test]
fn test_removed_shapes_do_not_separate() {
    let mut cage = cage(9.81);
    let ground = floor(&mut cage, 0.0);
    let ball = cage.add(resting_ball());
    cage.add(Ball::new(Vec2::new(3.0, 0.35), 0.25, 50.0, Color::zeros()).unwrap());
    let recorder = ContactRecorder::new(&[ContactPhase::Begin, ContactPhase::Separate]);
    let log = recorder.log();
    cage.attach_receiver(ground, recorder).unwrap();

    cage.process_time_step(DT);
    assert_eq!(log.borrow().count(ContactPhase::Begin), 2);

    cage.remove(ball);
    cage.process_time_step(DT);
    assert_eq!(log.borrow().count(ContactPhase::Separate), 0);
    assert_eq!(cage.physics().touching().len(), 1);
}
