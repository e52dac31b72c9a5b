//! Eater sensors inside a running cage

use super::{cage, DT};
use crate::config::EaterConfig;
use crate::creature::Eater;
use crate::entity::Ball;
use crate::foundation::math::{Color, Vec2};

#[test]
fn test_rays_ignore_own_body() {
    let mut cage = cage(0.0);
    let key = cage.add(Eater::new(&EaterConfig::default(), Vec2::zeros()).unwrap());
    cage.process_time_step(DT);

    for sensor in cage.eater(key).unwrap().sensors() {
        assert_eq!(sensor.distance(), 1.0);
        assert!(sensor.owner_hit().is_none());
    }
}

#[test]
fn test_forward_ray_learns_food_color() {
    let mut cage = cage(0.0);
    let key = cage.add(Eater::new(&EaterConfig::default(), Vec2::zeros()).unwrap());
    let food = cage.add(Ball::food(Vec2::new(3.0, 0.0)).unwrap());

    for _ in 0..10 {
        cage.process_time_step(DT);
    }

    let forward = &cage.eater(key).unwrap().sensors()[2];
    assert_eq!(forward.owner_hit(), Some(food));
    assert!((forward.distance() - 2.675 / 9.875).abs() < 1e-3);
    let color = forward.color();
    assert!((color - Color::new(1.0, 1.0, 0.0)).norm() < 1e-3);
}

#[test]
fn test_mirrored_fan_sees_behind() {
    let mut cage = cage(0.0);
    let key = cage.add(Eater::new(&EaterConfig::default(), Vec2::zeros()).unwrap());
    let food = cage.add(Ball::food(Vec2::new(-3.0, 0.0)).unwrap());
    cage.eater_mut(key).unwrap().set_acceleration(-1.0);
    cage.process_time_step(DT);

    let eater = cage.eater(key).unwrap();
    assert!(eater.facing_left());
    assert_eq!(eater.sensors()[2].owner_hit(), Some(food));
}
