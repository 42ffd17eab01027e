//! Per-participant session context and the frame dispatch function.
//!
//! A [`Session`] owns the disc, the physics world, the throw stepper, the
//! background timers and the outbound transport. Everything happens inside
//! [`Session::frame`], in this order:
//!
//! 1. queued events (input, inbound messages, transport loss)
//! 2. held disc follows the viewpoint
//! 3. heartbeat and resync timers
//! 4. throw stepper
//! 5. outbox flush

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::DiscConfig;
use crate::disc::{Disc, LocalCatch};
use crate::events::{CatchOrigin, Feedback, FrameEvent, FrameReport, InputAction, Viewpoint};
use crate::math::Pose;
use crate::physics::PhysicsWorld;
use crate::protocol::{NetworkMessage, PickData, SyncData, ThrowData};
use crate::stepper::{StepperStatus, ThrowStepper};
use crate::timer::IntervalTimer;
use crate::transport::Transport;

/// Appended to the room name to form the channel.
pub const CHANNEL_SUFFIX: &str = "-frisbee";

/// Who the local player is and which room they are in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub room: String,
}

impl Identity {
    pub fn new(display_name: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            room: room.into(),
        }
    }

    /// Per-session sender identifier: the display name plus a random number
    /// below 10000, so two tabs of the same player don't suppress each other.
    pub fn session_user<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        format!("{}{}", self.display_name, rng.random_range(0..10_000))
    }

    /// Broadcast channel for this room on the given server base URL.
    pub fn channel_url(&self, server: &str) -> String {
        format!("{server}{}{CHANNEL_SUFFIX}", self.room)
    }
}

/// Milliseconds since the Unix epoch, for message timestamps.
fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct Session<T: Transport> {
    user: String,
    config: DiscConfig,
    disc: Disc,
    world: PhysicsWorld,
    stepper: Option<ThrowStepper>,
    heartbeat: IntervalTimer,
    resync: IntervalTimer,
    transport: T,
    outbox: Vec<NetworkMessage>,
    degraded: bool,
    active: bool,
}

impl<T: Transport> Session<T> {
    pub fn new(user: impl Into<String>, config: DiscConfig, transport: T) -> Self {
        let user = user.into();
        let world = PhysicsWorld::new(&config);
        let disc = Disc::new(config.spawn_position);
        info!(%user, "session started");
        Self {
            user,
            disc,
            world,
            stepper: None,
            heartbeat: IntervalTimer::new(config.heartbeat_interval),
            resync: IntervalTimer::new(config.resync_interval),
            config,
            transport,
            outbox: Vec::new(),
            degraded: false,
            active: true,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn disc(&self) -> &Disc {
        &self.disc
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Whether the throw stepper is registered.
    pub fn is_stepping(&self) -> bool {
        self.stepper.is_some()
    }

    /// True once the transport failed; outbound sends are dropped from then on.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the session by one frame of `dt` seconds.
    pub fn frame(
        &mut self,
        dt: f32,
        viewpoint: &Viewpoint,
        events: impl IntoIterator<Item = FrameEvent>,
    ) -> FrameReport {
        let mut feedback = Vec::new();
        if !self.active {
            return self.report(feedback);
        }

        for event in events {
            match event {
                FrameEvent::Input(action) => self.handle_input(action, viewpoint, &mut feedback),
                FrameEvent::Message(text) => self.handle_text(&text, &mut feedback),
                FrameEvent::TransportClosed => self.mark_degraded("transport closed"),
            }
        }

        self.disc
            .follow_viewpoint(&mut self.world, &self.config, viewpoint);
        self.tick_background(dt);

        if let Some(stepper) = &mut self.stepper {
            if stepper.tick(&mut self.disc, &mut self.world, dt) == StepperStatus::Deregister {
                self.stepper = None;
            }
        }

        self.flush();
        self.report(feedback)
    }

    /// Cancel the background timers and the stepper. Later frames do nothing.
    pub fn teardown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.stepper = None;
        self.outbox.clear();
        info!(user = %self.user, "session torn down");
    }

    fn handle_input(
        &mut self,
        action: InputAction,
        viewpoint: &Viewpoint,
        feedback: &mut Vec<Feedback>,
    ) {
        match action {
            InputAction::PickUp => {
                if let Some(caught) = self.disc.pick_up(&mut self.world, &self.config, viewpoint) {
                    self.on_local_catch(caught, feedback);
                }
            }
            InputAction::Grab => {
                if let Some(caught) = self.disc.grab(&mut self.world, &self.config, viewpoint) {
                    self.on_local_catch(caught, feedback);
                }
            }
            InputAction::Throw { direction } => {
                let Some(launch) =
                    self.disc
                        .throw(&mut self.world, &self.config, viewpoint, direction)
                else {
                    return;
                };
                self.stepper = Some(ThrowStepper::new());
                self.outbox.push(NetworkMessage::Throw(ThrowData {
                    user: self.user.clone(),
                    pos: launch.position,
                    rot: launch.rotation,
                    dir: launch.direction,
                    timestamp: now_millis(),
                }));
            }
        }
    }

    fn on_local_catch(&mut self, caught: LocalCatch, feedback: &mut Vec<Feedback>) {
        feedback.push(Feedback {
            outcome: caught.outcome,
            origin: CatchOrigin::Local,
            at: caught.impact,
        });
        self.outbox.push(NetworkMessage::Pick(PickData {
            user: self.user.clone(),
            pos: caught.impact,
            streak: caught.streak,
            timestamp: now_millis(),
        }));
    }

    fn handle_text(&mut self, text: &str, feedback: &mut Vec<Feedback>) {
        let message = match NetworkMessage::decode(text) {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!(text, "ignoring message with unknown type");
                return;
            }
            Err(err) => {
                warn!(%err, "dropping malformed message");
                return;
            }
        };

        if message.sender() == Some(self.user.as_str()) {
            return;
        }
        debug!(kind = ?message.kind(), sender = ?message.sender(), "received");
        self.apply_remote(message, feedback);
    }

    fn apply_remote(&mut self, message: NetworkMessage, feedback: &mut Vec<Feedback>) {
        match message {
            NetworkMessage::Ping => {}
            NetworkMessage::Pick(data) => {
                let outcome =
                    self.disc
                        .remote_pick_up(&mut self.world, &self.config, data.pos, data.streak);
                info!(user = %data.user, %outcome, streak = data.streak, "remote pick-up");
                feedback.push(Feedback {
                    outcome,
                    origin: CatchOrigin::Remote,
                    at: data.pos,
                });
            }
            NetworkMessage::Throw(data) => {
                self.disc.remote_throw(
                    &mut self.world,
                    &self.config,
                    data.pos,
                    data.rot,
                    data.dir,
                );
                self.stepper = Some(ThrowStepper::new());
                info!(user = %data.user, "remote throw");
            }
            NetworkMessage::Sync(data) => {
                self.disc
                    .apply_sync(&mut self.world, Pose::new(data.pos, data.rot), data.holding);
            }
        }
    }

    fn tick_background(&mut self, dt: f32) {
        if self.heartbeat.tick(dt) {
            self.outbox.push(NetworkMessage::Ping);
        }

        if self.disc.is_resync_source() {
            if self.resync.tick(dt) {
                let pose = self.disc.pose();
                self.outbox.push(NetworkMessage::Sync(SyncData {
                    user: Some(self.user.clone()),
                    holding: self.disc.is_held_local(),
                    pos: pose.position,
                    rot: pose.rotation,
                }));
            }
        } else {
            self.resync.reset();
        }
    }

    fn flush(&mut self) {
        let outbox = std::mem::take(&mut self.outbox);
        if outbox.is_empty() {
            return;
        }
        if self.degraded {
            debug!(dropped = outbox.len(), "transport degraded; not sending");
            return;
        }

        for message in outbox {
            let text = match message.encode() {
                Ok(text) => text,
                Err(err) => {
                    warn!(%err, kind = ?message.kind(), "failed to encode message");
                    continue;
                }
            };
            if let Err(err) = self.transport.send_text(text) {
                self.mark_degraded(&err.to_string());
                return;
            }
        }
    }

    fn mark_degraded(&mut self, reason: &str) {
        if !self.degraded {
            warn!(reason, "transport lost; session continues without sending");
            self.degraded = true;
        }
    }

    fn report(&self, feedback: Vec<Feedback>) -> FrameReport {
        FrameReport {
            pose: self.disc.pose(),
            visible: self.disc.is_visible(),
            streak: self.disc.streak(),
            ownership: self.disc.ownership(),
            catch_hint: self.disc.catch_hint(),
            feedback,
        }
    }
}
