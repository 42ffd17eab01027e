//! Test utilities for multi-peer session tests.
//!
//! Provides `TestRoom`, a set of sessions joined over one
//! [`LoopbackHub`], plus a tap that sees every frame sent in the room.

use crate::config::{DiscConfig, PHYSICS_DT};
use crate::events::{FrameEvent, FrameReport, InputAction, Viewpoint};
use crate::math::{Quat, Vec3};
use crate::protocol::NetworkMessage;
use crate::session::Session;
use crate::transport::{LoopbackHub, LoopbackInbox, LoopbackTransport};

pub(crate) struct TestPeer {
    pub session: Session<LoopbackTransport>,
    pub inbox: LoopbackInbox,
    pub view: Viewpoint,
    pending: Vec<FrameEvent>,
}

/// A room of peers named `peer0`, `peer1`, ... advancing in lockstep.
///
/// Each step runs one frame per peer in index order. A peer sees frames
/// sent by lower-indexed peers in the same step and by higher-indexed
/// peers one step later.
pub(crate) struct TestRoom {
    pub hub: LoopbackHub,
    pub peers: Vec<TestPeer>,
    tap: LoopbackInbox,
    _tap_transport: LoopbackTransport,
}

impl TestRoom {
    /// Create a room with `n` peers, all standing 2 m in front of the spawn.
    pub fn new(n: usize) -> Self {
        let hub = LoopbackHub::new();
        let (_tap_transport, tap) = hub.join();
        let peers = (0..n)
            .map(|i| {
                let (transport, inbox) = hub.join();
                TestPeer {
                    session: Session::new(format!("peer{i}"), DiscConfig::default(), transport),
                    inbox,
                    view: Viewpoint::new(Vec3::new(8.0, 1.0, 6.0), Quat::IDENTITY),
                    pending: Vec::new(),
                }
            })
            .collect();
        Self {
            hub,
            peers,
            tap,
            _tap_transport,
        }
    }

    pub fn session(&self, peer: usize) -> &Session<LoopbackTransport> {
        &self.peers[peer].session
    }

    pub fn session_mut(&mut self, peer: usize) -> &mut Session<LoopbackTransport> {
        &mut self.peers[peer].session
    }

    /// Queue an input for the peer's next frame.
    pub fn input(&mut self, peer: usize, action: InputAction) {
        self.peers[peer].pending.push(FrameEvent::Input(action));
    }

    /// Run one frame on every peer.
    pub fn step(&mut self) -> Vec<FrameReport> {
        self.peers
            .iter_mut()
            .map(|peer| {
                let mut events: Vec<FrameEvent> = peer
                    .inbox
                    .drain()
                    .into_iter()
                    .map(FrameEvent::Message)
                    .collect();
                events.append(&mut peer.pending);
                peer.session.frame(PHYSICS_DT, &peer.view, events)
            })
            .collect()
    }

    /// Advance the room by `seconds` of simulated time.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance(&mut self, seconds: f32) {
        let frames = (seconds / PHYSICS_DT).round() as usize;
        for _ in 0..frames {
            self.step();
        }
    }

    /// Every message sent in the room since the last call.
    pub fn tap(&self) -> Vec<NetworkMessage> {
        self.tap
            .drain()
            .iter()
            .filter_map(|text| NetworkMessage::decode(text).ok().flatten())
            .collect()
    }
}
