//! Events fed into a frame and the report a frame produces.

use rapier3d::math::Vector;

use crate::catch::CatchOutcome;
use crate::disc::Ownership;
use crate::math::{Pose, Quat, Vec3};

/// Player input, delivered once per button press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Catch the disc out of the air.
    PickUp,
    /// Take a disc nobody holds by pointing at it.
    Grab,
    /// Throw the held disc along `direction`.
    Throw { direction: Vec3 },
}

/// Everything that can happen to a session between two frames.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    Input(InputAction),
    /// A raw text frame from the transport.
    Message(String),
    /// The transport reported an error or closed.
    TransportClosed,
}

/// The local player's camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewpoint {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Viewpoint {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        (self.rotation.to_unit() * Vector::Z).into()
    }
}

/// Who made the catch a [`Feedback`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchOrigin {
    Local,
    Remote,
}

/// Where a feedback text is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackDisplay {
    /// Screen-space announcement for the local player.
    Announcement,
    /// In-world text floating at the catch point.
    FloatingText,
}

/// A judged catch, surfaced for UI feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feedback {
    pub outcome: CatchOutcome,
    pub origin: CatchOrigin,
    /// Disc position when it was caught.
    pub at: Vec3,
}

impl Feedback {
    /// Text to show, if any. A local drop is silent.
    pub fn text(&self) -> Option<&'static str> {
        match (self.outcome, self.origin) {
            (CatchOutcome::Spectacular, _) => Some("Wow!"),
            (CatchOutcome::Good, CatchOrigin::Local) => Some("Good catch!"),
            (CatchOutcome::Good, CatchOrigin::Remote) => Some("Good Catch!"),
            (CatchOutcome::Dropped, CatchOrigin::Local) => None,
            (CatchOutcome::Dropped, CatchOrigin::Remote) => Some("Picked frisbee up"),
        }
    }

    pub fn display(&self) -> FeedbackDisplay {
        match self.origin {
            CatchOrigin::Local => FeedbackDisplay::Announcement,
            CatchOrigin::Remote => FeedbackDisplay::FloatingText,
        }
    }
}

/// What the rendering and UI layers need after a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub pose: Pose,
    /// Whether the disc's shape should be rendered.
    pub visible: bool,
    pub streak: u32,
    pub ownership: Ownership,
    /// "Catch it!" hint: on while the disc flies, off once it lands or is caught.
    pub catch_hint: bool,
    pub feedback: Vec<Feedback>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_follows_rotation() {
        let view = Viewpoint::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::PI));
        let f = view.forward();
        assert!((f.z + 1.0).abs() < 1e-5 && f.x.abs() < 1e-5);
    }

    #[test]
    fn test_feedback_texts() {
        let local_drop = Feedback {
            outcome: CatchOutcome::Dropped,
            origin: CatchOrigin::Local,
            at: Vec3::ZERO,
        };
        assert_eq!(local_drop.text(), None);
        assert_eq!(local_drop.display(), FeedbackDisplay::Announcement);

        let remote_drop = Feedback {
            origin: CatchOrigin::Remote,
            ..local_drop
        };
        assert_eq!(remote_drop.text(), Some("Picked frisbee up"));
        assert_eq!(remote_drop.display(), FeedbackDisplay::FloatingText);

        let wow = Feedback {
            outcome: CatchOutcome::Spectacular,
            ..remote_drop
        };
        assert_eq!(wow.text(), Some("Wow!"));
    }
}
