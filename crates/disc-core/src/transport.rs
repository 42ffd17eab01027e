//! Outbound text channel to the rest of the room.
//!
//! A [`Session`](crate::session::Session) only ever sends through
//! [`Transport`]; inbound frames reach it as
//! [`FrameEvent::Message`](crate::events::FrameEvent::Message). The relay
//! echoes every frame back to its sender, and [`LoopbackHub`] does the same.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TransportError;

/// Sending half of a broadcast channel.
pub trait Transport {
    /// Queue a text frame for every member of the room, the sender included.
    fn send_text(&mut self, text: String) -> Result<(), TransportError>;
}

#[derive(Debug, Default)]
struct HubState {
    inboxes: Vec<VecDeque<String>>,
    closed: bool,
}

/// In-process broadcast room.
#[derive(Debug, Clone, Default)]
pub struct LoopbackHub {
    state: Arc<Mutex<HubState>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member and return its sending half and inbox.
    pub fn join(&self) -> (LoopbackTransport, LoopbackInbox) {
        let mut state = self.state.lock();
        let slot = state.inboxes.len();
        state.inboxes.push(VecDeque::new());
        (
            LoopbackTransport {
                hub: self.clone(),
            },
            LoopbackInbox {
                hub: self.clone(),
                slot,
            },
        )
    }

    /// Make every further send fail.
    pub fn close(&self) {
        self.state.lock().closed = true;
    }
}

/// Member's sending half.
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    hub: LoopbackHub,
}

impl Transport for LoopbackTransport {
    fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        let mut state = self.hub.state.lock();
        if state.closed {
            return Err(TransportError::Closed);
        }
        for inbox in &mut state.inboxes {
            inbox.push_back(text.clone());
        }
        Ok(())
    }
}

/// Member's receiving half.
#[derive(Debug)]
pub struct LoopbackInbox {
    hub: LoopbackHub,
    slot: usize,
}

impl LoopbackInbox {
    /// Take every frame received so far, oldest first.
    pub fn drain(&self) -> Vec<String> {
        let mut state = self.hub.state.lock();
        state.inboxes[self.slot].drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_includes_sender() {
        let hub = LoopbackHub::new();
        let (mut a, a_inbox) = hub.join();
        let (_b, b_inbox) = hub.join();

        a.send_text("hello".into()).unwrap();
        assert_eq!(a_inbox.drain(), vec!["hello".to_string()]);
        assert_eq!(b_inbox.drain(), vec!["hello".to_string()]);
        assert!(b_inbox.drain().is_empty());
    }

    #[test]
    fn test_send_after_close_fails() {
        let hub = LoopbackHub::new();
        let (mut a, inbox) = hub.join();
        hub.close();
        assert!(matches!(a.send_text("x".into()), Err(TransportError::Closed)));
        assert!(inbox.drain().is_empty());
    }
}
