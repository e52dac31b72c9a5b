//! The Eater: a ball-shaped creature that rolls, jumps and looks around
//!
//! Sensor layout: index 0 points down, index 1 points up, the rest fan out
//! forward. Facing is mirrored by flipping the sensor fan about the
//! horizontal axis.

use crate::config::EaterConfig;
use crate::draw::DrawList;
use crate::entity::{Ball, UpdateContext};
use crate::error::{ensure_non_negative, ensure_positive, Result};
use crate::foundation::logging::trace;
use crate::foundation::math::{constants, utils, Color, Vec2};
use crate::physics::{Attachment, CollisionGroup, GroupAllocator, PhysicsWorld};

use super::{ActionVector, Creature, SensorRay};

/// Creature driven by an external controller through its action vector
#[derive(Debug, Clone)]
pub struct Eater {
    body: Ball,
    creature: Creature,
    fixed_color: Option<Color>,
    group: CollisionGroup,
    max_force: f32,
    jump_impulse: f32,
    jump_debounce: f32,
    ground_fraction: f32,
    facing_deadband: f32,
    jump_timer: f32,
    did_jump: bool,
    consumed: u32,
    flips: u32,
}

impl Eater {
    /// Build an eater at `position` from its configuration
    pub fn new(config: &EaterConfig, position: Vec2) -> Result<Self> {
        let body = Ball::new(position, config.radius, config.density, config.body_color())?
            .with_outline(config.outline_color());

        let sensor = &config.sensor;
        let inner = config.radius * ensure_non_negative("inner fraction", sensor.inner_fraction)?;
        let make = |angle: f32| SensorRay::with_fadeout(inner, sensor.range, angle, sensor.fadeout);

        let mut sensors = Vec::with_capacity(config.sensor_count());
        sensors.push(make(-constants::HALF_PI)?);
        sensors.push(make(constants::HALF_PI)?);
        let n = config.forward_sensors;
        for i in 0..n {
            let angle =
                config.fan_start + (config.fan_end - config.fan_start) / n as f32 * i as f32;
            sensors.push(make(angle)?);
        }

        Ok(Self {
            body,
            creature: Creature::new(config.energy, config.decay, sensors),
            fixed_color: None,
            group: CollisionGroup::NONE,
            max_force: ensure_non_negative("max force", config.max_force)?,
            jump_impulse: ensure_non_negative("jump impulse", config.jump_impulse)?,
            jump_debounce: ensure_non_negative("jump debounce", config.jump_debounce)?,
            ground_fraction: ensure_positive("ground fraction", config.ground_fraction)?,
            facing_deadband: ensure_non_negative("facing deadband", config.facing_deadband)?,
            jump_timer: 0.0,
            did_jump: false,
            consumed: 0,
            flips: 0,
        })
    }

    /// Builder: ignore the color slots of the action vector
    pub fn with_fixed_color(mut self, color: Color) -> Self {
        self.fixed_color = Some(color);
        self
    }

    /// Current color: the fixed color, or the one requested by the action
    pub fn color(&self) -> Color {
        self.fixed_color.unwrap_or_else(|| self.creature.action().color())
    }

    /// The underlying ball
    pub fn body(&self) -> &Ball {
        &self.body
    }

    pub(crate) fn body_mut(&mut self) -> &mut Ball {
        &mut self.body
    }

    /// Energy, sensors, observation and action
    pub fn creature(&self) -> &Creature {
        &self.creature
    }

    /// Mutable creature state
    pub fn creature_mut(&mut self) -> &mut Creature {
        &mut self.creature
    }

    /// Current energy
    pub fn energy(&self) -> f32 {
        self.creature.energy()
    }

    /// Sensors: down, up, then the forward fan
    pub fn sensors(&self) -> &[SensorRay] {
        self.creature.sensors()
    }

    /// Latest observation vector
    pub fn observation(&self) -> &[f32] {
        self.creature.observation()
    }

    /// Current action vector
    pub fn action(&self) -> &ActionVector {
        self.creature.action()
    }

    /// Replace the action vector
    pub fn set_action(&mut self, action: ActionVector) {
        self.creature.set_action(action);
    }

    /// Set the acceleration command
    pub fn set_acceleration(&mut self, value: f32) {
        self.creature.action_mut().set_acceleration(value);
    }

    /// Set the jump command
    pub fn set_jump(&mut self, jump: bool) {
        self.creature.action_mut().set_jump(jump);
    }

    /// Whether the last update performed a jump
    pub fn did_jump(&self) -> bool {
        self.did_jump
    }

    /// Seconds since the last jump (or since creation)
    pub fn jump_timer(&self) -> f32 {
        self.jump_timer
    }

    /// Number of items consumed
    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    /// Count one consumed item
    pub fn record_consumption(&mut self) {
        self.consumed += 1;
    }

    /// Number of facing changes so far
    pub fn flips(&self) -> u32 {
        self.flips
    }

    /// Whether the eater faces towards -x
    pub fn facing_left(&self) -> bool {
        self.body.look_at().x < 0.0
    }

    /// Collision group of its shapes, allocated on join
    pub fn group(&self) -> CollisionGroup {
        self.group
    }

    /// Current world position
    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        self.body.position(physics)
    }

    pub(crate) fn join_world(
        &mut self,
        physics: &mut PhysicsWorld,
        groups: &mut GroupAllocator,
    ) -> Attachment {
        if let Some(attachment) = self.body.embodiment().attachment() {
            return attachment.clone();
        }
        self.group = groups.allocate();
        self.body.embodiment_mut().join(physics, self.group)
    }

    pub(crate) fn update(&mut self, ctx: &mut UpdateContext<'_>, dt: f32) {
        self.did_jump = false;
        self.creature.drain(dt);

        let Some(handle) = self.body.embodiment().body() else {
            return;
        };
        ctx.physics.set_angular_velocity(handle, 0.0);

        let acceleration = self.creature.action().acceleration();
        let velocity = ctx.physics.velocity(handle).unwrap_or_else(Vec2::zeros);
        self.update_facing(velocity.x, acceleration);

        ctx.physics.reset_forces(handle);
        let local_force = Vec2::new(self.max_force * acceleration, 0.0);
        if let Some(force) = ctx.physics.to_world(handle, local_force) {
            if utils::is_finite2(&force) {
                ctx.physics.apply_force(handle, force);
            }
        }

        let position = self.body.position(ctx.physics);
        let orientation = self.body.look_at();
        let mirrored = self.facing_left();
        let surroundings = ctx.surroundings();
        for sensor in self.creature.sensors_mut() {
            sensor.sense(position, orientation, mirrored, &surroundings, self.group);
        }

        if self.creature.action().jump()
            && self.jump_timer > self.jump_debounce
            && self.on_ground()
        {
            ctx.physics.apply_impulse(handle, Vec2::new(0.0, self.jump_impulse));
            self.did_jump = true;
            self.jump_timer = 0.0;
            trace!("Eater jumped at {:?}", position);
        }
        self.jump_timer += dt;

        let velocity_x = ctx.physics.velocity(handle).map_or(0.0, |v| v.x);
        self.creature.observe(velocity_x);
    }

    fn on_ground(&self) -> bool {
        let down = &self.creature.sensors()[0];
        down.distance() < self.ground_fraction * down.radius()
    }

    fn update_facing(&mut self, velocity_x: f32, acceleration: f32) {
        let want_left = if velocity_x < -self.facing_deadband {
            true
        } else if velocity_x > self.facing_deadband {
            false
        } else {
            acceleration < 0.0
        };
        if want_left == self.facing_left() {
            return;
        }

        self.body.set_look_at(Vec2::new(if want_left { -1.0 } else { 1.0 }, 0.0));
        for sensor in self.creature.sensors_mut().iter_mut().skip(2) {
            sensor.clear_color();
        }
        self.flips += 1;
    }

    pub(crate) fn draw(&self, physics: &PhysicsWorld, list: &mut DrawList) {
        self.body.draw_with_color(physics, list, self.color());
        for sensor in self.sensors() {
            sensor.draw(list);
        }
    }
}
