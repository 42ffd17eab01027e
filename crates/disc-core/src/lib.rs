//! Disc Core Library
//!
//! A shared, thrown disc simulated independently by every participant of a
//! room and kept consistent through broadcast messages, with no authority.
//!
//! - [`physics`]: fixed-step `Rapier3D` world with the disc, ground and walls
//! - [`disc`]: ownership state machine
//! - [`catch`]: catch classification and streaks
//! - [`protocol`]: JSON wire messages
//! - [`stepper`]: per-frame physics task while the disc flies
//! - [`session`]: the per-participant context and its frame dispatch

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod catch;
pub mod config;
pub mod disc;
pub mod error;
pub mod events;
pub mod math;
pub mod physics;
pub mod protocol;
pub mod session;
pub mod stepper;
pub mod timer;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_utils;

pub use catch::CatchOutcome;
pub use config::{DiscConfig, PHYSICS_DT};
pub use disc::{Disc, Ownership};
pub use error::{ConfigError, ProtocolError, TransportError};
pub use events::{
    CatchOrigin, Feedback, FeedbackDisplay, FrameEvent, FrameReport, InputAction, Viewpoint,
};
pub use math::{Pose, Quat, Vec3};
pub use physics::{ContactEvent, PhysicsWorld};
pub use protocol::{MessageKind, NetworkMessage};
pub use session::{Identity, Session};
pub use transport::{LoopbackHub, Transport};
