//! Scenario tests spanning several modules

mod contact_flow;
mod sensing;

use crate::config::{CageConfig, WorldConfig};
use crate::entity::StaticLines;
use crate::foundation::collections::EntityKey;
use crate::foundation::math::{Color, Point2};
use crate::simulation::Cage;

pub(crate) const DT: f32 = 1.0 / 30.0;

/// Cage with the given gravity and no damping
pub(crate) fn cage(gravity: f32) -> Cage {
    Cage::new(CageConfig {
        world: WorldConfig {
            gravity,
            damping: 1.0,
            timestep: DT,
        },
        ..CageConfig::default()
    })
    .unwrap()
}

/// Flat line from x = -10 to x = 10 at height `y`, 0.1 thick
pub(crate) fn floor(cage: &mut Cage, y: f32) -> EntityKey {
    let points = [Point2::new(-10.0, y), Point2::new(10.0, y)];
    cage.add(StaticLines::new(&points, 0.1, Color::new(0.0, 1.0, 0.0)).unwrap())
}
