//! # Cage Engine
//!
//! A 2D physics cage for embodied agents.
//!
//! ## Features
//!
//! - **Rigid-body world**: rapier2d-backed bodies, shapes and segment queries
//! - **Entity registry**: static lines, balls, food and sensing creatures
//! - **Collision dispatch**: per-shape receivers that can veto contacts
//! - **Ray sensors**: smoothed color and distance signals per ray
//! - **Creature control**: observation and action vectors for external learners
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cage_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CageConfig::default();
//!     let mut cage = Cage::new(config.clone())?;
//!
//!     let floor = [Point2::new(-20.0, -5.0), Point2::new(20.0, -5.0)];
//!     cage.add(StaticLines::new(&floor, 0.25, Color::new(0.7, 0.0, 0.0))?);
//!     let eater = cage.add(Eater::new(&config.eater, Vec2::new(0.0, 2.0))?);
//!
//!     if let Some(eater) = cage.eater_mut(eater) {
//!         eater.set_acceleration(1.0);
//!     }
//!     for _ in 0..30 {
//!         cage.step();
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod physics;
pub mod entity;
pub mod dispatch;
pub mod creature;
pub mod draw;
pub mod agent;
pub mod simulation;

mod error;

pub use error::{CageError, Result};
pub use simulation::{Cage, TickReport};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Cage, CageError, TickReport,
        agent::{Controller, Episode, Interaction, Task},
        config::{CageConfig, Config, EaterConfig, SensorConfig, WorldConfig},
        creature::{ActionVector, Eater, SensorRay, ACTION_DIM},
        dispatch::{CollisionReceiver, ContactPhase, ContactRecorder, DispatchContext},
        draw::{DrawCommand, DrawList},
        entity::{Ball, BallKind, Entity, StaticLines},
        foundation::collections::{EntityKey, ReceiverKey},
        foundation::math::{Color, Point2, Vec2},
        physics::ContactPoint,
    };
}

#[cfg(test)]
mod tests;
