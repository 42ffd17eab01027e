//! Physics simulation of the disc using `Rapier3D`.
//!
//! The world holds exactly one dynamic body (the disc) plus static colliders
//! for the ground slab and the four arena walls. It is advanced on a fixed
//! sub-step with a cap on sub-steps per call, and reports the contacts the
//! disc started during the call.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use parking_lot::Mutex;
use rapier3d::prelude::*;
use tracing::warn;

use crate::config::DiscConfig;
use crate::math::{Pose, Vec3};

/// A contact the disc started with one of the static colliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEvent {
    Ground,
    Wall,
}

/// Collects collision events raised during a pipeline step.
#[derive(Default)]
struct ContactCollector {
    events: Mutex<Vec<CollisionEvent>>,
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.events.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Physics world containing all `Rapier3D` components for the disc scene.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    frame: u64,
    accumulator: f32,
    max_substeps: u32,
    disc_body: RigidBodyHandle,
    disc_collider: ColliderHandle,
    ground: ColliderHandle,
    collector: ContactCollector,
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("accumulator", &self.accumulator)
            .field("collider_count", &self.collider_set.len())
            .field("disc", &self.disc_pose())
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Builds the arena and the disc at the configured spawn position.
    pub fn new(config: &DiscConfig) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: config.fixed_dt,
            ..Default::default()
        };

        let mut rigid_body_set = RigidBodySet::new();
        let mut collider_set = ColliderSet::new();

        let body = RigidBodyBuilder::dynamic()
            .translation(config.spawn_position.into())
            .linear_damping(config.linear_damping)
            .angular_damping(config.angular_damping)
            .ccd_enabled(true)
            .build();
        let disc_body = rigid_body_set.insert(body);

        // Min combine rule: the static collider's restitution decides the bounce.
        let collider = ColliderBuilder::ball(config.disc_radius)
            .mass(config.disc_mass)
            .restitution(1.0)
            .restitution_combine_rule(CoefficientCombineRule::Min)
            .friction(0.0)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let disc_collider =
            collider_set.insert_with_parent(collider, disc_body, &mut rigid_body_set);

        // Mass properties must be ready before the first impulse, which can
        // arrive before the first step.
        if let Some(body) = rigid_body_set.get_mut(disc_body) {
            body.recompute_mass_properties_from_colliders(&collider_set);
        }

        let (width, depth) = config.arena_size();

        let ground = collider_set.insert(
            ColliderBuilder::cuboid(width, 0.5, depth)
                .translation(Vector::new(width / 2.0, config.ground_height - 0.5, depth / 2.0))
                .restitution(config.ground_restitution)
                .friction(0.0)
                .build(),
        );

        // Invisible boundary walls on the four arena edges.
        let walls = [
            (Vector::new(width / 2.0, 25.0, depth), (width, 50.0, 1.0)),
            (Vector::new(width / 2.0, 25.0, 0.0), (width, 50.0, 1.0)),
            (Vector::new(0.0, 25.0, depth / 2.0), (1.0, 50.0, depth)),
            (Vector::new(width, 25.0, depth / 2.0), (1.0, 50.0, depth)),
        ];
        for (center, (hx, hy, hz)) in walls {
            collider_set.insert(
                ColliderBuilder::cuboid(hx, hy, hz)
                    .translation(center)
                    .restitution(config.wall_restitution)
                    .friction(0.0)
                    .build(),
            );
        }

        Self {
            rigid_body_set,
            collider_set,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(0.0, config.gravity, 0.0),
            frame: 0,
            accumulator: 0.0,
            max_substeps: config.max_substeps,
            disc_body,
            disc_collider,
            ground,
            collector: ContactCollector::default(),
        }
    }

    /// Advances the simulation by `dt` seconds of frame time.
    ///
    /// Runs as many fixed sub-steps as fit, at most `max_substeps`. Time left
    /// over once the cap is hit is discarded rather than carried forward.
    /// Returns the contacts the disc started during this call, in order.
    /// A non-finite `dt` runs nothing and leaves the accumulator alone.
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        if !dt.is_finite() {
            warn!(dt, "ignoring non-finite frame time");
            return Vec::new();
        }
        let fixed = self.integration_parameters.dt;
        self.accumulator += dt.max(0.0);

        let mut contacts = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= fixed && substeps < self.max_substeps {
            self.step_fixed(&mut contacts);
            self.accumulator -= fixed;
            substeps += 1;
        }
        if self.accumulator >= fixed {
            self.accumulator %= fixed;
        }
        contacts
    }

    /// Runs exactly one fixed sub-step.
    fn step_fixed(&mut self, contacts: &mut Vec<ContactEvent>) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &self.collector,
        );
        self.frame += 1;

        for event in self.collector.events.lock().drain(..) {
            let CollisionEvent::Started(h1, h2, _flags) = event else {
                continue;
            };
            let other = if h1 == self.disc_collider {
                h2
            } else if h2 == self.disc_collider {
                h1
            } else {
                continue;
            };
            contacts.push(if other == self.ground {
                ContactEvent::Ground
            } else {
                ContactEvent::Wall
            });
        }
    }

    /// Current pose of the disc body.
    pub fn disc_pose(&self) -> Pose {
        let body = &self.rigid_body_set[self.disc_body];
        Pose::new(body.translation().into(), (*body.rotation()).into())
    }

    /// Current linear velocity of the disc body.
    pub fn disc_velocity(&self) -> Vec3 {
        self.rigid_body_set[self.disc_body].linvel().into()
    }

    /// Teleports the disc. Velocity is left untouched; see [`Self::stop`].
    pub fn set_pose(&mut self, pose: Pose) {
        if let Some(body) = self.rigid_body_set.get_mut(self.disc_body) {
            body.set_translation(pose.position.into(), true);
            body.set_rotation(pose.rotation.to_unit(), true);
        }
        self.accumulator = 0.0;
    }

    /// Zeroes linear and angular velocity.
    pub fn stop(&mut self) {
        if let Some(body) = self.rigid_body_set.get_mut(self.disc_body) {
            body.set_linvel(Vector::ZERO, true);
            body.set_angvel(Vector::ZERO, true);
        }
    }

    /// Adds an instantaneous impulse applied at the world point `at`.
    pub fn apply_impulse(&mut self, impulse: Vec3, at: Vec3) {
        let Some(body) = self.rigid_body_set.get_mut(self.disc_body) else {
            return;
        };
        let impulse = Vector::from(impulse);
        let torque = (Vector::from(at) - body.translation()).cross(impulse);
        body.apply_impulse(impulse, true);
        if torque.length_squared() > f32::EPSILON {
            body.apply_torque_impulse(torque, true);
        }
    }

    /// Returns the number of fixed sub-steps run so far.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Computes a deterministic hash of the disc's simulated state.
    /// Two peers fed the same inputs produce the same hash.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.frame.hash(&mut hasher);

        let body = &self.rigid_body_set[self.disc_body];
        let t = body.translation();
        let r = body.rotation();
        let v = body.linvel();
        let w = body.angvel();
        for value in [t.x, t.y, t.z, r.x, r.y, r.z, r.w, v.x, v.y, v.z, w.x, w.y, w.z] {
            hash_f32(value, &mut hasher);
        }

        hasher.finish()
    }
}

/// Hashes a f32 value by converting to bits.
fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&DiscConfig::default())
    }

    #[test]
    fn test_world_creation() {
        let world = world();
        assert_eq!(world.current_frame(), 0);
        assert_eq!(world.integration_parameters.dt, 1.0 / 60.0);
        assert_eq!(world.disc_pose().position, Vec3::new(8.0, 0.49, 8.0));
        // disc + ground + four walls
        assert_eq!(world.collider_set.len(), 6);
    }

    #[test]
    fn test_step_caps_substeps() {
        let mut world = world();
        world.step(1.0);
        assert_eq!(world.current_frame(), 3);

        // The excess second was dropped, not banked.
        world.step(0.0);
        assert_eq!(world.current_frame(), 3);
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let mut world = world();
        let fixed = world.integration_parameters.dt;
        world.step(f32::INFINITY);
        world.step(f32::NAN);
        assert_eq!(world.current_frame(), 0);

        // The world keeps stepping afterwards.
        world.step(fixed);
        assert_eq!(world.current_frame(), 1);
        world.step(1.0);
        assert_eq!(world.current_frame(), 4);
    }

    #[test]
    fn test_step_accumulates_partial_frames() {
        let mut world = world();
        let fixed = world.integration_parameters.dt;
        world.step(fixed * 0.6);
        assert_eq!(world.current_frame(), 0);
        world.step(fixed * 0.6);
        assert_eq!(world.current_frame(), 1);
    }

    #[test]
    fn test_set_pose_and_stop() {
        let mut world = world();
        world.apply_impulse(Vec3::new(0.0, 0.0, 5.0), world.disc_pose().position);
        assert!(world.disc_velocity().z > 0.0);

        world.set_pose(Pose::from_position(Vec3::new(4.0, 3.0, 4.0)));
        world.stop();
        assert_eq!(world.disc_pose().position, Vec3::new(4.0, 3.0, 4.0));
        assert_eq!(world.disc_velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_impulse_scales_by_mass() {
        let mut world = world();
        let at = world.disc_pose().position;
        world.apply_impulse(Vec3::new(0.0, 0.0, 50.0), at);
        let v = world.disc_velocity();
        assert!((v.z - 40.0).abs() < 1e-3, "velocity was {v:?}");
        assert!(v.x.abs() < 1e-6 && v.y.abs() < 1e-6);
    }

    #[test]
    fn test_falling_disc_reports_ground_contact() {
        let mut world = world();
        world.set_pose(Pose::from_position(Vec3::new(8.0, 2.0, 8.0)));

        let mut contacts = Vec::new();
        for _ in 0..120 {
            contacts.extend(world.step(1.0 / 60.0));
        }
        assert_eq!(contacts.first(), Some(&ContactEvent::Ground));
        assert!(!contacts.contains(&ContactEvent::Wall));

        // Never sinks through the slab.
        let y = world.disc_pose().position.y;
        assert!(y > 0.3, "y = {y}");
    }

    #[test]
    fn test_wall_contact_is_not_ground() {
        let mut world = world();
        world.set_pose(Pose::from_position(Vec3::new(8.0, 5.0, 30.0)));
        let at = world.disc_pose().position;
        world.apply_impulse(Vec3::new(0.0, 0.0, 40.0), at);

        let contacts = world.step(0.1);
        assert!(contacts.contains(&ContactEvent::Wall));
        assert!(!contacts.contains(&ContactEvent::Ground));
    }

    #[test]
    fn test_deterministic_simulation() {
        let mut world1 = world();
        let mut world2 = world();

        for world in [&mut world1, &mut world2] {
            world.set_pose(Pose::from_position(Vec3::new(8.0, 1.0, 8.0)));
            world.apply_impulse(Vec3::new(3.0, 2.0, 10.0), Vec3::new(8.0, 1.0, 8.0));
        }
        for _ in 0..100 {
            world1.step(1.0 / 60.0);
            world2.step(1.0 / 60.0);
        }

        assert_eq!(world1.compute_hash(), world2.compute_hash());
        assert_eq!(world1.disc_pose(), world2.disc_pose());
    }
}
