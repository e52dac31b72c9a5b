//! The reference arena: red walls, three ledges, one eater and a bouncing ball

use std::cell::RefCell;
use std::rc::Rc;

use cage_engine::dispatch::ContactLog;
use cage_engine::prelude::*;

/// Half the arena width; food and respawns land inside `[-HALF_WIDTH, HALF_WIDTH]`
pub const HALF_WIDTH: f32 = 20.0;

/// Height at which a respawned eater appears
pub const RESPAWN_HEIGHT: f32 = 2.0;

/// Height at which food pellets appear
pub const FOOD_HEIGHT: f32 = 0.0;

/// Handles to the interesting entities of a freshly built arena
#[derive(Debug)]
pub struct Arena {
    /// The controlled creature
    pub eater: EntityKey,

    /// The blue ball carrying a contact recorder
    pub ball: EntityKey,

    /// Contacts seen by the blue ball: last tick plus running totals
    pub ball_contacts: Rc<RefCell<ContactLog>>,
}

fn points(raw: &[(f32, f32)]) -> Vec<Point2> {
    raw.iter().map(|&(x, y)| Point2::new(x, y)).collect()
}

/// Populate `cage` with the reference layout
pub fn build(cage: &mut Cage) -> cage_engine::Result<Arena> {
    let borders = points(&[
        (-HALF_WIDTH, 10.0),
        (-HALF_WIDTH, -6.0),
        (0.0, -5.0),
        (HALF_WIDTH, -6.0),
        (HALF_WIDTH, 10.0),
    ]);
    cage.add(StaticLines::new(&borders, 0.25, Color::new(0.7, 0.0, 0.0))?);

    let platform = points(&[(-5.0, 0.0), (-1.0, 0.0), (-0.5, 0.5)]);
    cage.add(StaticLines::new(&platform, 0.1, Color::new(0.0, 1.0, 1.0))?);

    let ledge_color = Color::new(0.0, 1.0, 0.0);
    cage.add(StaticLines::new(&points(&[(-18.0, -4.0), (-9.0, -4.5)]), 0.1, ledge_color)?);
    cage.add(StaticLines::new(&points(&[(18.0, -4.0), (9.0, -4.5)]), 0.1, ledge_color)?);

    let eater_config = cage.config().eater.clone();
    let eater = cage.add(Eater::new(&eater_config, Vec2::zeros())?);

    let ball = Ball::new(Vec2::new(3.0, 2.0), 0.6, 30.0, Color::new(0.0, 0.1, 0.9))?
        .with_outline(Color::new(1.0, 1.0, 1.0));
    let ball = cage.add(ball);
    let recorder = ContactRecorder::new(&[ContactPhase::Begin]);
    let ball_contacts = recorder.log();
    cage.attach_receiver(ball, recorder)?;

    Ok(Arena {
        eater,
        ball,
        ball_contacts,
    })
}

/// Number of food pellets currently in the cage
pub fn food_count(cage: &Cage) -> usize {
    cage.entities().filter(|(_, entity)| entity.is_food()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_entities() {
        let mut cage = Cage::new(CageConfig::default()).unwrap();
        let arena = build(&mut cage).unwrap();

        assert_eq!(cage.entities().count(), 6);
        assert!(cage.eater(arena.eater).is_some());
        assert!(cage.entity(arena.ball).and_then(Entity::as_ball).is_some());
        assert_eq!(food_count(&cage), 0);
    }

    #[test]
    fn test_ball_records_landing() {
        let mut cage = Cage::new(CageConfig::default()).unwrap();
        let arena = build(&mut cage).unwrap();

        for _ in 0..120 {
            cage.step();
        }
        assert!(arena.ball_contacts.borrow().total(ContactPhase::Begin) >= 1);
    }
}
