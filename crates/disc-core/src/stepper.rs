//! Per-frame physics task that runs while the disc flies.

use tracing::{debug, error};

use crate::disc::Disc;
use crate::physics::PhysicsWorld;

/// What the owner of a [`ThrowStepper`] should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperStatus {
    Continue,
    /// The disc is no longer airborne; drop the stepper.
    Deregister,
}

/// Advances physics and projects the disc pose, one frame at a time.
#[derive(Debug, Default)]
pub struct ThrowStepper {
    frames: u64,
}

impl ThrowStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames stepped since registration.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn tick(&mut self, disc: &mut Disc, world: &mut PhysicsWorld, dt: f32) -> StepperStatus {
        if !disc.is_airborne() {
            debug!(frames = self.frames, "disc landed in a hand; stepper done");
            return StepperStatus::Deregister;
        }

        for contact in world.step(dt) {
            disc.on_contact(contact);
        }
        self.frames += 1;

        let pose = world.disc_pose();
        if pose.is_finite() {
            disc.project(pose);
        } else {
            error!(?pose, "physics produced a non-finite disc pose; not projecting");
        }
        StepperStatus::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscConfig;
    use crate::events::Viewpoint;
    use crate::math::{Quat, Vec3};

    fn thrown() -> (Disc, PhysicsWorld, DiscConfig) {
        let config = DiscConfig::default();
        let mut world = PhysicsWorld::new(&config);
        let mut disc = Disc::new(config.spawn_position);
        let view = Viewpoint::new(Vec3::new(8.0, 1.0, 7.0), Quat::IDENTITY);
        disc.grab(&mut world, &config, &view).unwrap();
        disc.throw(&mut world, &config, &view, Vec3::FORWARD).unwrap();
        (disc, world, config)
    }

    #[test]
    fn test_projects_physics_pose() {
        let (mut disc, mut world, _) = thrown();
        let start = disc.pose().position;
        let mut stepper = ThrowStepper::new();

        assert_eq!(stepper.tick(&mut disc, &mut world, 1.0 / 60.0), StepperStatus::Continue);
        assert_eq!(disc.pose(), world.disc_pose());
        assert!(disc.pose().position.z > start.z);
        assert_eq!(stepper.frames(), 1);
    }

    #[test]
    fn test_flags_ground_contact() {
        let (mut disc, mut world, _) = thrown();
        let mut stepper = ThrowStepper::new();
        for _ in 0..60 {
            stepper.tick(&mut disc, &mut world, 1.0 / 60.0);
        }
        assert!(disc.touched_ground());
        assert!(disc.is_airborne());
    }

    #[test]
    fn test_deregisters_once_caught() {
        let (mut disc, mut world, config) = thrown();
        let mut stepper = ThrowStepper::new();
        stepper.tick(&mut disc, &mut world, 1.0 / 60.0);

        disc.remote_pick_up(&mut world, &config, disc.pose().position, 1);
        let frame = world.current_frame();
        assert_eq!(stepper.tick(&mut disc, &mut world, 1.0 / 60.0), StepperStatus::Deregister);
        assert_eq!(world.current_frame(), frame);
    }
}
