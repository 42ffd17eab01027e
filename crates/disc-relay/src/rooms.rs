//! Channel registry: one broadcast fan-out per channel name.

use std::collections::HashMap;

use axum::extract::ws::Utf8Bytes;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::info;

/// Frames buffered per member before it starts lagging.
pub const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
struct Room {
    tx: broadcast::Sender<Utf8Bytes>,
    members: usize,
}

/// A socket's handle on its channel.
#[derive(Debug)]
pub struct Membership {
    pub tx: broadcast::Sender<Utf8Bytes>,
    pub rx: broadcast::Receiver<Utf8Bytes>,
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join `channel`, creating it on first use.
    pub fn join(&self, channel: &str) -> Membership {
        let mut rooms = self.rooms.lock();
        let room = rooms.entry(channel.to_string()).or_insert_with(|| {
            info!(channel, "channel opened");
            Room {
                tx: broadcast::channel(CHANNEL_CAPACITY).0,
                members: 0,
            }
        });
        room.members += 1;
        Membership {
            tx: room.tx.clone(),
            rx: room.tx.subscribe(),
        }
    }

    /// Leave `channel`; the last member to leave drops it.
    pub fn leave(&self, channel: &str) {
        let mut rooms = self.rooms.lock();
        let Some(room) = rooms.get_mut(channel) else {
            return;
        };
        room.members = room.members.saturating_sub(1);
        if room.members == 0 {
            rooms.remove(channel);
            info!(channel, "channel closed");
        }
    }

    pub fn member_count(&self, channel: &str) -> usize {
        self.rooms.lock().get(channel).map_or(0, |room| room.members)
    }

    pub fn channel_count(&self) -> usize {
        self.rooms.lock().len()
    }
}
