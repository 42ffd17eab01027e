//! The shared disc and its ownership state machine.
//!
//! Local transitions check their guards and return `None` when the action is
//! not legal right now; nothing changes in that case. Remote transitions are
//! applied unconditionally: the latest message wins.

use rapier3d::math::Vector;
use tracing::{debug, info};

use crate::catch::{self, CatchOutcome};
use crate::config::DiscConfig;
use crate::events::Viewpoint;
use crate::math::{Pose, Quat, Vec3};
use crate::physics::{ContactEvent, PhysicsWorld};

/// Who controls the disc, from this participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// Nobody holds it and it is not flying. Only at spawn or after a
    /// resync released a holder.
    #[default]
    Free,
    HeldLocal,
    HeldRemote,
    InFlight,
}

/// Result of a local pick-up or grab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalCatch {
    pub outcome: CatchOutcome,
    /// Disc position at the moment it was taken.
    pub impact: Vec3,
    /// Streak after judging the catch.
    pub streak: u32,
}

/// Result of a local throw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub position: Vec3,
    pub rotation: Quat,
    pub direction: Vec3,
}

/// The disc as one participant sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Disc {
    pose: Pose,
    ownership: Ownership,
    touched_ground: bool,
    streak: u32,
    visible: bool,
    last_holder: bool,
    catch_hint: bool,
}

impl Disc {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            pose: Pose::from_position(spawn),
            ownership: Ownership::Free,
            touched_ground: false,
            streak: 0,
            visible: true,
            last_holder: false,
            catch_hint: false,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// True from a throw until the next pick-up or forced stop.
    pub fn is_airborne(&self) -> bool {
        self.ownership == Ownership::InFlight
    }

    pub fn is_held_local(&self) -> bool {
        self.ownership == Ownership::HeldLocal
    }

    pub fn is_held_remote(&self) -> bool {
        self.ownership == Ownership::HeldRemote
    }

    pub fn touched_ground(&self) -> bool {
        self.touched_ground
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether this participant made the most recent pick-up.
    pub fn is_last_holder(&self) -> bool {
        self.last_holder
    }

    pub fn catch_hint(&self) -> bool {
        self.catch_hint
    }

    /// Whether this participant should be broadcasting resyncs.
    pub fn is_resync_source(&self) -> bool {
        self.last_holder && self.is_held_local()
    }

    /// Catch the disc out of the air.
    ///
    /// Legal only while it flies, nobody holds it, and it is within catch
    /// reach of the viewpoint.
    pub fn pick_up(
        &mut self,
        world: &mut PhysicsWorld,
        config: &DiscConfig,
        viewpoint: &Viewpoint,
    ) -> Option<LocalCatch> {
        if !self.is_airborne() || self.is_held_local() || self.is_held_remote() {
            return None;
        }
        let distance_sq = self.distance_squared(viewpoint);
        if distance_sq >= config.catch_reach_squared() {
            debug!(distance_sq, "disc out of catch reach");
            return None;
        }
        Some(self.take_local(world, config, viewpoint))
    }

    /// Take a disc that is lying free, by pointing at it.
    pub fn grab(
        &mut self,
        world: &mut PhysicsWorld,
        config: &DiscConfig,
        viewpoint: &Viewpoint,
    ) -> Option<LocalCatch> {
        if self.ownership != Ownership::Free {
            return None;
        }
        let distance_sq = self.distance_squared(viewpoint);
        if distance_sq >= config.grab_reach_squared() {
            debug!(distance_sq, "disc out of grab reach");
            return None;
        }
        Some(self.take_local(world, config, viewpoint))
    }

    fn distance_squared(&self, viewpoint: &Viewpoint) -> f32 {
        Vector::from(self.pose.position).distance_squared(viewpoint.position.into())
    }

    fn take_local(
        &mut self,
        world: &mut PhysicsWorld,
        config: &DiscConfig,
        viewpoint: &Viewpoint,
    ) -> LocalCatch {
        let impact = self.pose.position;
        let outcome = catch::classify(impact.y, self.touched_ground, config.high_catch_threshold);
        self.streak = outcome.next_streak(self.streak);

        self.ownership = Ownership::HeldLocal;
        self.last_holder = true;
        self.visible = true;
        self.catch_hint = false;

        world.stop();
        self.follow_viewpoint(world, config, viewpoint);

        info!(%outcome, streak = self.streak, "picked up disc");
        LocalCatch {
            outcome,
            impact,
            streak: self.streak,
        }
    }

    /// Throw the held disc along `direction`.
    ///
    /// Legal only while held locally. Launches from the viewpoint position
    /// plus the direction.
    pub fn throw(
        &mut self,
        world: &mut PhysicsWorld,
        config: &DiscConfig,
        viewpoint: &Viewpoint,
        direction: Vec3,
    ) -> Option<Launch> {
        if self.is_airborne() || !self.is_held_local() || !direction.is_finite() {
            return None;
        }
        let launch = Launch {
            position: (Vector::from(viewpoint.position) + Vector::from(direction)).into(),
            rotation: viewpoint.rotation,
            direction,
        };
        self.launch(world, config, launch);
        info!(position = ?launch.position, direction = ?direction, "threw disc");
        Some(launch)
    }

    /// Another participant caught the disc.
    ///
    /// The judgement is only for feedback; the streak is taken verbatim from
    /// the catcher, who observed the catch.
    pub fn remote_pick_up(
        &mut self,
        world: &mut PhysicsWorld,
        config: &DiscConfig,
        position: Vec3,
        streak: u32,
    ) -> CatchOutcome {
        let outcome =
            catch::classify(position.y, self.touched_ground, config.high_catch_threshold);

        self.ownership = Ownership::HeldRemote;
        self.last_holder = false;
        self.visible = false;
        self.catch_hint = false;
        self.streak = streak;

        world.stop();
        outcome
    }

    /// Another participant threw the disc.
    pub fn remote_throw(
        &mut self,
        world: &mut PhysicsWorld,
        config: &DiscConfig,
        position: Vec3,
        rotation: Quat,
        direction: Vec3,
    ) {
        self.last_holder = false;
        self.launch(
            world,
            config,
            Launch {
                position,
                rotation,
                direction,
            },
        );
    }

    fn launch(&mut self, world: &mut PhysicsWorld, config: &DiscConfig, launch: Launch) {
        self.ownership = Ownership::InFlight;
        self.touched_ground = false;
        self.visible = true;
        self.catch_hint = true;
        self.pose = Pose::new(launch.position, launch.rotation);

        world.set_pose(self.pose);
        world.stop();
        let impulse = Vector::from(launch.direction) * config.launch_speed;
        world.apply_impulse(impulse.into(), launch.position);
    }

    /// Applies a resync snapshot.
    ///
    /// The pose is overwritten. Ownership only changes when the snapshot's
    /// holding flag disagrees with the current state: `holding` forces
    /// `HeldRemote`, otherwise a held disc is released to `Free`.
    pub fn apply_sync(&mut self, world: &mut PhysicsWorld, pose: Pose, holding: bool) {
        self.pose = pose;
        world.set_pose(pose);
        self.last_holder = false;

        if holding {
            if !self.is_held_remote() {
                world.stop();
                self.ownership = Ownership::HeldRemote;
                self.visible = false;
                self.catch_hint = false;
            }
        } else if matches!(self.ownership, Ownership::HeldLocal | Ownership::HeldRemote) {
            self.ownership = Ownership::Free;
            self.visible = true;
        }
    }

    /// Reacts to a contact reported by the physics step.
    pub fn on_contact(&mut self, contact: ContactEvent) {
        if contact == ContactEvent::Ground && self.is_airborne() && !self.touched_ground {
            debug!("disc touched the ground");
            self.touched_ground = true;
            self.catch_hint = false;
        }
    }

    /// Keeps a locally held disc in front of the viewpoint.
    pub fn follow_viewpoint(
        &mut self,
        world: &mut PhysicsWorld,
        config: &DiscConfig,
        viewpoint: &Viewpoint,
    ) {
        if !self.is_held_local() {
            return;
        }
        let rotation = viewpoint.rotation.to_unit();
        let offset = rotation * Vector::from(config.hold_offset);
        let position = Vector::from(viewpoint.position) + offset;
        let pose = Pose::new(position.into(), rotation.into());
        if pose != self.pose {
            self.pose = pose;
            world.set_pose(pose);
        }
    }

    /// Copies the simulated pose onto the disc while it flies.
    pub fn project(&mut self, pose: Pose) {
        if self.is_airborne() {
            self.pose = pose;
        }
    }
}
