//! Rigid-body world backed by rapier2d
//!
//! Owns every rapier set and pipeline component. The rest of the engine only
//! sees [`BodySpec`]s going in, [`Attachment`]s coming out, and plain math
//! types for state, rays and contacts.

use std::collections::HashMap;

use rapier2d::parry::bounding_volume::BoundingVolume;
use rapier2d::parry::query::{self, Ray};
use rapier2d::prelude::{
    vector, ActiveHooks, CCDSolver, CoefficientCombineRule, Collider, ColliderBuilder,
    ColliderHandle, ColliderSet, DefaultBroadPhase, ImpulseJointSet, IntegrationParameters,
    IslandManager, MassProperties, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Point,
    QueryFilter, QueryPipeline, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, SharedShape,
    Vector,
};

use crate::config::WorldConfig;
use crate::error::{ensure_positive, CageError, Result};
use crate::foundation::logging::{debug, trace};
use crate::foundation::math::{utils, Vec2};

use super::body::{Attachment, BodyKind, BodySpec, BodyState, ShapeGeometry};
use super::contacts::{
    ContactEvent, ContactHooks, ContactKey, ContactPoint, ContactReport, ContactTracker,
};
use super::groups::CollisionGroup;
use super::ray::{RayHit, RaySegment};

/// The simulated 2D physics world
pub struct PhysicsWorld {
    gravity: Vector<f32>,
    linear_damping: f32,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    contacts: ContactTracker,
}

impl PhysicsWorld {
    /// Create an empty world from the world settings
    pub fn new(config: &WorldConfig) -> Result<Self> {
        if !config.gravity.is_finite() {
            return Err(CageError::OutOfRange {
                what: "gravity",
                range: "finite",
                value: config.gravity,
            });
        }
        let damping = ensure_positive("damping", config.damping)?;
        ensure_positive("timestep", config.timestep)?;
        if damping > 1.0 {
            return Err(CageError::OutOfRange {
                what: "damping",
                range: "(0, 1]",
                value: damping,
            });
        }

        Ok(Self {
            gravity: vector![0.0, -config.gravity],
            linear_damping: damping_coefficient(damping),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            contacts: ContactTracker::new(),
        })
    }

    /// Gravity vector
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Damping coefficient applied to dynamic bodies
    pub fn linear_damping(&self) -> f32 {
        self.linear_damping
    }

    /// Insert a body and its shapes, tagging the shapes with `group`
    pub fn add(&mut self, spec: &BodySpec, group: CollisionGroup) -> Attachment {
        let builder = match spec.kind {
            BodyKind::Anchored => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic { mass, inertia } => RigidBodyBuilder::dynamic()
                .additional_mass_properties(MassProperties::new(Point::origin(), mass, inertia))
                .linear_damping(self.linear_damping)
                .angular_damping(self.linear_damping)
                .can_sleep(false),
        };
        let body = self
            .bodies
            .insert(builder.translation(spec.position).linvel(spec.velocity).build());

        let shapes = spec
            .shapes
            .iter()
            .map(|shape| {
                let geometry = match shape.geometry {
                    ShapeGeometry::Segment { a, b, thickness } if thickness > 0.0 => {
                        SharedShape::capsule(a, b, thickness)
                    }
                    ShapeGeometry::Segment { a, b, .. } => SharedShape::segment(a, b),
                    ShapeGeometry::Circle { radius } => SharedShape::ball(radius),
                };
                let collider = ColliderBuilder::new(geometry)
                    .density(0.0)
                    .friction(shape.friction)
                    .friction_combine_rule(CoefficientCombineRule::Multiply)
                    .restitution(shape.restitution)
                    .restitution_combine_rule(CoefficientCombineRule::Multiply)
                    .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
                    .user_data(group.to_user_data())
                    .build();
                self.colliders.insert_with_parent(collider, body, &mut self.bodies)
            })
            .collect();
        self.refresh_queries();

        debug!("Added body {:?} with {} shapes", body, spec.shapes.len());
        Attachment { body, shapes }
    }

    /// Remove a body and its shapes, returning its last kinematic state
    ///
    /// Contacts involving the removed shapes are forgotten without producing
    /// separation events.
    pub fn remove(&mut self, attachment: &Attachment) -> Option<BodyState> {
        let removed = self.bodies.remove(
            attachment.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        )?;
        self.contacts.forget_shapes(&attachment.shapes);
        self.refresh_queries();

        debug!("Removed body {:?}", attachment.body);
        Some(BodyState {
            position: *removed.translation(),
            velocity: *removed.linvel(),
            angle: removed.rotation().angle(),
        })
    }

    /// Whether the body is still in the world
    pub fn contains(&self, body: RigidBodyHandle) -> bool {
        self.bodies.contains(body)
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of shapes in the world
    pub fn shape_count(&self) -> usize {
        self.colliders.len()
    }

    /// Group tag of a shape, `None` if the shape is unknown
    pub fn group_of(&self, shape: ColliderHandle) -> Option<CollisionGroup> {
        self.colliders.get(shape).map(group_of)
    }

    /// Add a continuous force for the next step
    pub fn apply_force(&mut self, body: RigidBodyHandle, force: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.add_force(force, true);
        }
    }

    /// Clear accumulated forces of a body
    pub fn reset_forces(&mut self, body: RigidBodyHandle) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.reset_forces(true);
        }
    }

    /// Apply an instantaneous impulse at the center of mass
    pub fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.apply_impulse(impulse, true);
        }
    }

    /// Set the angular velocity of a body
    pub fn set_angular_velocity(&mut self, body: RigidBodyHandle, angvel: f32) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.set_angvel(angvel, true);
        }
    }

    /// Position of a body origin
    pub fn position(&self, body: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(body).map(|rb| *rb.translation())
    }

    /// Linear velocity of a body
    pub fn velocity(&self, body: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(body).map(|rb| *rb.linvel())
    }

    /// Rotation angle of a body (radians)
    pub fn angle(&self, body: RigidBodyHandle) -> Option<f32> {
        self.bodies.get(body).map(|rb| rb.rotation().angle())
    }

    /// Rotate a body-frame vector into world space
    pub fn to_world(&self, body: RigidBodyHandle, local: Vec2) -> Option<Vec2> {
        self.bodies.get(body).map(|rb| rb.rotation() * local)
    }

    /// Teleport a body and stop it
    ///
    /// Its shapes move immediately, so queries and contact detection see the
    /// new position before the next step.
    pub fn set_position(&mut self, body: RigidBodyHandle, position: Vec2) {
        let Some(rb) = self.bodies.get_mut(body) else {
            return;
        };
        rb.set_translation(position, true);
        rb.set_linvel(Vec2::zeros(), true);
        rb.set_angvel(0.0, true);
        let pose = *rb.position();
        let shapes = rb.colliders().to_vec();

        for shape in shapes {
            if let Some(collider) = self.colliders.get_mut(shape) {
                if let Some(local) = collider.position_wrt_parent().copied() {
                    collider.set_position(pose * local);
                }
            }
        }
        self.refresh_queries();
    }

    /// Overwrite the linear velocity of a body
    pub fn set_velocity(&mut self, body: RigidBodyHandle, velocity: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.set_linvel(velocity, true);
        }
    }

    /// Nearest shape hit by the segment, skipping shapes in `exclude`
    pub fn cast_ray(&self, segment: &RaySegment, exclude: CollisionGroup) -> Option<RayHit> {
        if !segment.is_castable() {
            return None;
        }
        let ray = Ray::new(segment.start, segment.delta());
        let not_excluded =
            |_: ColliderHandle, collider: &Collider| !exclude.excludes(group_of(collider));
        let filter = QueryFilter::default().predicate(&not_excluded);

        let (shape, hit) = self.query_pipeline.cast_ray_and_get_normal(
            &self.bodies,
            &self.colliders,
            &ray,
            1.0,
            true,
            filter,
        )?;
        Some(RayHit {
            shape,
            fraction: hit.toi,
            point: segment.point_at(hit.toi),
            normal: hit.normal,
        })
    }

    /// Make the solver ignore the pair until it separates
    pub fn suppress(&mut self, key: ContactKey) {
        self.contacts.suppress(key);
    }

    /// Make the solver ignore the pair during the next step
    pub fn suppress_for_step(&mut self, key: ContactKey) {
        self.contacts.suppress_for_step(key);
    }

    /// Whether the solver currently ignores the pair
    pub fn is_suppressed(&self, key: &ContactKey) -> bool {
        self.contacts.is_suppressed(key)
    }

    /// Pairs touching after the last step
    pub fn touching(&self) -> Vec<ContactEvent> {
        self.contacts.touching()
    }

    /// Find the pairs touching at the current positions and diff them
    /// against the previous detection
    ///
    /// Runs before [`step`](Self::step) so verdicts on new contacts reach the
    /// solver in the same step.
    pub fn detect_contacts(&mut self) -> ContactReport {
        let touching = self.collect_touching();
        let report = self.contacts.update(touching);
        trace!(
            "Detected contacts: {} began, {} persisted, {} separated",
            report.began.len(),
            report.persisted.len(),
            report.separated.len()
        );
        report
    }

    /// Advance the world by `dt` seconds
    ///
    /// Forces added since the previous step are consumed by this step, and
    /// single-step suppressions expire with it.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        let hooks = ContactHooks { tracker: &self.contacts };
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &hooks,
            &(),
        );

        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
        }
        self.contacts.end_step();
        trace!("Stepped {:.4}s", dt);
    }

    fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.bodies, &self.colliders);
    }

    /// Pairs with at least one dynamic shape whose gap is within the
    /// solver's prediction distance
    fn collect_touching(&self) -> HashMap<ContactKey, Vec<ContactPoint>> {
        let prediction = self.integration_parameters.prediction_distance;
        let mut touching = HashMap::new();

        for (handle, collider) in self.colliders.iter() {
            let Some(parent) = collider.parent() else {
                continue;
            };
            if !self.bodies.get(parent).is_some_and(|rb| rb.is_dynamic()) {
                continue;
            }
            let area = collider.compute_aabb().loosened(prediction);
            self.query_pipeline.colliders_with_aabb_intersecting_aabb(&area, |&other| {
                let key = ContactKey::new(handle, other);
                if other == handle || touching.contains_key(&key) {
                    return true;
                }
                let Some(counterpart) = self.colliders.get(other) else {
                    return true;
                };
                if counterpart.parent() == Some(parent) {
                    return true;
                }
                let point = contact_point(&key, handle, collider, counterpart, prediction);
                if let Some(point) = point {
                    touching.insert(key, vec![point]);
                }
                true
            });
        }
        touching
    }
}

/// Closest contact of two shapes, expressed from `key.shape_a`'s side
fn contact_point(
    key: &ContactKey,
    handle: ColliderHandle,
    collider: &Collider,
    counterpart: &Collider,
    prediction: f32,
) -> Option<ContactPoint> {
    let contact = query::contact(
        collider.position(),
        collider.shape(),
        counterpart.position(),
        counterpart.shape(),
        prediction,
    )
    .ok()
    .flatten()?;

    let (position, normal) = if key.shape_a == handle {
        (contact.point1, contact.normal1.into_inner())
    } else {
        (contact.point2, contact.normal2.into_inner())
    };
    (utils::is_finite2(&position.coords) && utils::is_finite2(&normal))
        .then_some(ContactPoint { position, normal })
}

fn group_of(collider: &Collider) -> CollisionGroup {
    CollisionGroup::from_user_data(collider.user_data)
}

/// Per-second kept fraction to the backend's damping coefficient
fn damping_coefficient(kept_per_second: f32) -> f32 {
    -kept_per_second.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::ShapeSpec;
    use crate::foundation::math::Point2;
    use approx::assert_relative_eq;

    fn world(gravity: f32) -> PhysicsWorld {
        PhysicsWorld::new(&WorldConfig {
            gravity,
            ..WorldConfig::default()
        })
        .unwrap()
    }

    fn floor() -> BodySpec {
        BodySpec::anchored(vec![ShapeSpec::segment(
            Point2::new(-10.0, 0.0),
            Point2::new(10.0, 0.0),
            0.1,
            0.5,
            0.25,
        )
        .unwrap()])
    }

    fn ball(position: Vec2) -> BodySpec {
        BodySpec::dynamic(
            BodyKind::disc(0.25, 50.0).unwrap(),
            position,
            ShapeSpec::circle(0.25).unwrap(),
        )
    }

    #[test]
    fn test_damping_conversion() {
        assert_eq!(damping_coefficient(1.0), 0.0);
        assert_relative_eq!(damping_coefficient(0.15), 1.89712, epsilon = 1e-4);
    }

    #[test]
    fn test_invalid_damping_is_rejected() {
        let mut config = WorldConfig::default();
        config.damping = 0.0;
        assert!(PhysicsWorld::new(&config).is_err());
        config.damping = 1.5;
        assert!(PhysicsWorld::new(&config).is_err());
    }

    #[test]
    fn test_add_and_remove() {
        let mut world = world(9.81);
        let attachment = world.add(&ball(Vec2::new(1.0, 2.0)), CollisionGroup::NONE);
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.shape_count(), 1);

        let state = world.remove(&attachment).unwrap();
        assert_eq!(state.position, Vec2::new(1.0, 2.0));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.shape_count(), 0);
        assert!(world.remove(&attachment).is_none());
    }

    #[test]
    fn test_ray_hits_nearest_shape() {
        let mut world = world(0.0);
        let near = world.add(&ball(Vec2::new(2.0, 0.0)), CollisionGroup::NONE);
        world.add(&ball(Vec2::new(5.0, 0.0)), CollisionGroup::NONE);

        let ray = RaySegment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let hit = world.cast_ray(&ray, CollisionGroup::NONE).unwrap();
        assert_eq!(hit.shape, near.shapes[0]);
        assert_relative_eq!(hit.fraction, 0.175, epsilon = 1e-4);
        assert_relative_eq!(hit.normal, Vec2::new(-1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_ray_skips_excluded_group() {
        let mut groups = crate::physics::groups::GroupAllocator::new();
        let own = groups.allocate();
        let mut world = world(0.0);
        world.add(&ball(Vec2::new(2.0, 0.0)), own);
        let other = world.add(&ball(Vec2::new(5.0, 0.0)), CollisionGroup::NONE);

        let ray = RaySegment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let hit = world.cast_ray(&ray, own).unwrap();
        assert_eq!(hit.shape, other.shapes[0]);

        let miss = RaySegment::new(Point2::new(0.0, 3.0), Point2::new(10.0, 3.0));
        assert!(world.cast_ray(&miss, CollisionGroup::NONE).is_none());
    }

    #[test]
    fn test_impulse_changes_velocity() {
        let mut world = world(0.0);
        let attachment = world.add(&ball(Vec2::zeros()), CollisionGroup::NONE);
        let BodyKind::Dynamic { mass, .. } = BodyKind::disc(0.25, 50.0).unwrap() else {
            unreachable!()
        };
        world.step(1.0 / 30.0);
        world.apply_impulse(attachment.body, Vec2::new(mass, 0.0));
        world.step(1.0 / 30.0);
        let velocity = world.velocity(attachment.body).unwrap();
        assert_relative_eq!(velocity.x, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_falling_ball_begins_contact() {
        let mut world = world(9.81);
        world.add(&floor(), CollisionGroup::NONE);
        world.add(&ball(Vec2::new(0.0, 1.0)), CollisionGroup::NONE);

        let mut began = 0;
        for _ in 0..60 {
            began += world.detect_contacts().began.len();
            world.step(1.0 / 30.0);
        }
        assert!(began >= 1);
        assert_eq!(world.detect_contacts().persisted.len(), 1);
        assert_eq!(world.touching().len(), 1);
    }

    #[test]
    fn test_contact_detected_before_solving() {
        let mut world = world(0.0);
        let left = world.add(&ball(Vec2::new(0.0, 0.0)), CollisionGroup::NONE);
        let right = world.add(&ball(Vec2::new(0.45, 0.0)), CollisionGroup::NONE);
        world.set_velocity(left.body, Vec2::new(3.0, 0.0));

        let report = world.detect_contacts();
        assert_eq!(report.began.len(), 1);
        let key = report.began[0].key;
        assert_eq!(key, ContactKey::new(left.shapes[0], right.shapes[0]));
        world.suppress(key);

        world.step(1.0 / 30.0);
        assert_relative_eq!(world.velocity(left.body).unwrap().x, 3.0, epsilon = 1e-4);
        assert_relative_eq!(world.velocity(right.body).unwrap().x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_contact_normal_points_from_first_shape() {
        let mut world = world(0.0);
        let ground = world.add(&floor(), CollisionGroup::NONE);
        let resting = world.add(&ball(Vec2::new(0.0, 0.35)), CollisionGroup::NONE);

        let report = world.detect_contacts();
        assert_eq!(report.began.len(), 1);
        let event = &report.began[0];
        let point = event.points[0];
        let expected = if event.key.shape_a == ground.shapes[0] { 1.0 } else { -1.0 };
        assert!(event.key.involves(resting.shapes[0]));
        assert_relative_eq!(point.normal.y, expected, epsilon = 1e-3);
    }

    #[test]
    fn test_ray_sees_teleported_body() {
        let mut world = world(0.0);
        let moved = world.add(&ball(Vec2::new(2.0, 0.0)), CollisionGroup::NONE);
        world.set_position(moved.body, Vec2::new(0.0, 4.0));

        let ray = RaySegment::new(Point2::new(0.0, 0.0), Point2::new(0.0, 10.0));
        let hit = world.cast_ray(&ray, CollisionGroup::NONE).unwrap();
        assert_eq!(hit.shape, moved.shapes[0]);
        assert_relative_eq!(hit.fraction, 0.375, epsilon = 1e-4);
        let segment = RaySegment::new(Point2::origin(), Point2::new(10.0, 0.0));
        assert!(world.cast_ray(&segment, CollisionGroup::NONE).is_none());
    }

    #[test]
    fn test_invalid_timestep_is_rejected() {
        for timestep in [0.0, -1.0 / 30.0, f32::NAN] {
            let config = WorldConfig { timestep, ..WorldConfig::default() };
            assert!(PhysicsWorld::new(&config).is_err());
        }
    }

    #[test]
    fn test_suppressed_pair_passes_through() {
        let mut world = world(9.81);
        let ground = world.add(&floor(), CollisionGroup::NONE);
        let falling = world.add(&ball(Vec2::new(0.0, 0.5)), CollisionGroup::NONE);
        world.suppress(ContactKey::new(ground.shapes[0], falling.shapes[0]));

        for _ in 0..30 {
            world.step(1.0 / 30.0);
        }
        assert!(world.position(falling.body).unwrap().y < -0.5);
    }

    #[test]
    fn test_teleport_stops_body() {
        let mut world = world(9.81);
        let attachment = world.add(&ball(Vec2::new(0.0, 5.0)), CollisionGroup::NONE);
        for _ in 0..10 {
            world.step(1.0 / 30.0);
        }
        world.set_position(attachment.body, Vec2::new(3.0, 2.0));
        assert_eq!(world.position(attachment.body).unwrap(), Vec2::new(3.0, 2.0));
        assert_eq!(world.velocity(attachment.body).unwrap(), Vec2::zeros());
    }
}
