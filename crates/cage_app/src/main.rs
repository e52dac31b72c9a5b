//! Headless cage runner
//!
//! Drops an Eater into the reference arena, drives it with a seeded random
//! walk and scores it on the eat task. Pass a `.toml` or `.ron` file to
//! override the defaults:
//!
//! ```text
//! cage [config.toml]
//! ```

mod arena;
mod config;
mod controller;
mod task;

use cage_engine::prelude::*;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AppConfig;
use crate::controller::RandomWalk;
use crate::task::{EatReceiver, EatTask};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    cage_engine::foundation::logging::init();

    let path = std::env::args().nth(1);
    let config = AppConfig::load(path.as_deref())?;
    info!("Starting cage run: {} steps, seed {}", config.run.steps, config.run.seed);

    let summary = run(&config)?;
    info!(
        "Run finished after {:.1}s: {} meals, {} respawns, {} episodes, reward {:.1}, \
         {} ball landings, ball resting at {:?}",
        summary.seconds,
        summary.meals,
        summary.respawns,
        summary.episodes,
        summary.reward,
        summary.ball_landings,
        summary.ball_position.map(|p| (p.x, p.y))
    );
    Ok(())
}

/// Totals of a finished run
#[derive(Debug, Default)]
struct Summary {
    seconds: f64,
    meals: u32,
    respawns: u32,
    episodes: u32,
    reward: f32,
    ball_landings: usize,
    ball_position: Option<Vec2>,
}

fn random_x(rng: &mut StdRng) -> f32 {
    rng.gen_range(-arena::HALF_WIDTH..arena::HALF_WIDTH)
}

fn run(config: &AppConfig) -> Result<Summary, CageError> {
    let run = &config.run;
    let mut cage = Cage::new(config.cage.clone())?;
    let arena = arena::build(&mut cage)?;
    cage.attach_receiver(arena.eater, EatReceiver)?;

    let mut task = EatTask::new(run.decay);
    task.prepare(&mut cage, arena.eater)?;
    let mut controller =
        RandomWalk::new(run.seed).with_rates(run.acceleration_step, run.jump_chance);
    let mut episode = Episode::new(run.max_samples);
    let mut rng = StdRng::seed_from_u64(run.seed.wrapping_add(1));

    let mut summary = Summary::default();
    let mut life_time = 0.0;
    let mut meals_before_life = 0;
    let mut draw_list = DrawList::new();

    for step in 0..run.steps {
        let interaction = episode.interact(&mut cage, arena.eater, &mut controller, &mut task)?;
        summary.reward += interaction.reward;
        if interaction.finished {
            summary.episodes += 1;
            debug!(
                "Episode {} done with reward {:.1}",
                summary.episodes,
                episode.cumulative_reward()
            );
            episode.reset();
            task.reset();
            controller.reset();
        }

        let eater = cage.eater_mut(arena.eater).ok_or(CageError::NotACreature)?;
        if eater.energy() <= 0.0 || life_time > run.episode_seconds {
            let meals = eater.consumed() - meals_before_life;
            meals_before_life = eater.consumed();
            eater.creature_mut().set_energy(1.0);
            eater.creature_mut().zero_sensors();
            let spawn = Vec2::new(random_x(&mut rng), arena::RESPAWN_HEIGHT);
            cage.teleport(arena.eater, spawn)?;
            summary.respawns += 1;
            life_time = 0.0;
            info!("Respawn {} at x = {:.2} after {} meals", summary.respawns, spawn.x, meals);
        }

        if run.food_interval > 0
            && step % run.food_interval == run.food_interval - 1
            && arena::food_count(&cage) <= run.food_cap
        {
            cage.add(Ball::food(Vec2::new(random_x(&mut rng), arena::FOOD_HEIGHT))?);
        }

        cage.step();
        life_time += config.cage.world.timestep;

        if run.report_interval > 0 && step % run.report_interval == run.report_interval - 1 {
            draw_list.clear();
            cage.draw_things(&mut draw_list);
            let eater = cage.eater(arena.eater).ok_or(CageError::NotACreature)?;
            info!(
                "t = {:.1}s energy {:.2} meals {} food {} draw commands {}",
                cage.time(),
                eater.energy(),
                eater.consumed(),
                arena::food_count(&cage),
                draw_list.len()
            );
        }
    }

    summary.seconds = cage.time();
    summary.meals = cage.eater(arena.eater).map_or(0, Eater::consumed);
    summary.ball_landings = arena.ball_contacts.borrow().total(ContactPhase::Begin);
    summary.ball_position = cage.entity(arena.ball).map(|ball| ball.position(cage.physics()));
    Ok(summary)
}
