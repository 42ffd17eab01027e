//! Wire protocol between peers.
//!
//! One JSON object per text frame, tagged by a small integer `type`:
//!
//! ```text
//! {"type":0}
//! {"type":1,"data":{"user":..,"pos":{x,y,z},"streak":..,"timeStamp":..}}
//! {"type":2,"data":{"user":..,"pos":{x,y,z},"rot":{x,y,z,w},"dir":{x,y,z},"timeStamp":..}}
//! {"type":3,"user":..,"holding":..,"pos":{x,y,z},"rot":{x,y,z,w}}
//! ```
//!
//! There are no sequence numbers or acknowledgements: the last message
//! received wins.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::math::{Quat, Vec3};

/// Message type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Ping = 0,
    Pick = 1,
    Throw = 2,
    Sync = 3,
}

impl MessageKind {
    pub fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            0 => Some(Self::Ping),
            1 => Some(Self::Pick),
            2 => Some(Self::Throw),
            3 => Some(Self::Sync),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A peer caught or grabbed the disc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickData {
    pub user: String,
    /// Disc position at the moment of the pick-up.
    pub pos: Vec3,
    /// The picker's streak after judging the catch.
    pub streak: u32,
    /// Sender wall clock, milliseconds since the Unix epoch.
    #[serde(rename = "timeStamp")]
    pub timestamp: i64,
}

/// A peer threw the disc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowData {
    pub user: String,
    /// Launch position.
    pub pos: Vec3,
    pub rot: Quat,
    /// Throw direction; the impulse is `dir * launch_speed`.
    pub dir: Vec3,
    #[serde(rename = "timeStamp")]
    pub timestamp: i64,
}

/// Periodic pose snapshot from the holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncData {
    /// Sender identifier. Older peers omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub holding: bool,
    pub pos: Vec3,
    pub rot: Quat,
}

/// P2P message types.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkMessage {
    /// Keep-alive, no payload.
    Ping,
    Pick(PickData),
    Throw(ThrowData),
    Sync(SyncData),
}

#[derive(Serialize)]
struct Bare {
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Serialize)]
struct Enveloped<'a, T> {
    #[serde(rename = "type")]
    kind: u8,
    data: &'a T,
}

#[derive(Serialize)]
struct Flattened<'a, T> {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(flatten)]
    body: &'a T,
}

impl NetworkMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Ping => MessageKind::Ping,
            Self::Pick(_) => MessageKind::Pick,
            Self::Throw(_) => MessageKind::Throw,
            Self::Sync(_) => MessageKind::Sync,
        }
    }

    /// Identifier of the sending session, when the message carries one.
    pub fn sender(&self) -> Option<&str> {
        match self {
            Self::Ping => None,
            Self::Pick(data) => Some(&data.user),
            Self::Throw(data) => Some(&data.user),
            Self::Sync(data) => data.user.as_deref(),
        }
    }

    /// Encode the message to a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let kind = self.kind().tag();
        let text = match self {
            Self::Ping => serde_json::to_string(&Bare { kind })?,
            Self::Pick(data) => serde_json::to_string(&Enveloped { kind, data })?,
            Self::Throw(data) => serde_json::to_string(&Enveloped { kind, data })?,
            Self::Sync(body) => serde_json::to_string(&Flattened { kind, body })?,
        };
        Ok(text)
    }

    /// Decode a JSON text frame.
    ///
    /// Returns `Ok(None)` for a well-formed message with an unknown tag;
    /// those are ignored rather than treated as errors.
    pub fn decode(text: &str) -> Result<Option<Self>, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let tag = value
            .get("type")
            .and_then(Value::as_u64)
            .ok_or(ProtocolError::MissingType)?;

        let Some(kind) = MessageKind::from_tag(tag) else {
            return Ok(None);
        };

        let message = match kind {
            MessageKind::Ping => Self::Ping,
            MessageKind::Pick => Self::Pick(payload(&value, kind)?),
            MessageKind::Throw => Self::Throw(payload(&value, kind)?),
            MessageKind::Sync => Self::Sync(SyncData::deserialize(&value)?),
        };
        if !message.is_finite() {
            return Err(ProtocolError::NonFinite(kind.tag()));
        }
        Ok(Some(message))
    }

    /// Numbers beyond `f32` range decode to infinities; such a pose must
    /// never reach the disc.
    fn is_finite(&self) -> bool {
        match self {
            Self::Ping => true,
            Self::Pick(data) => data.pos.is_finite(),
            Self::Throw(data) => {
                data.pos.is_finite() && data.rot.is_finite() && data.dir.is_finite()
            }
            Self::Sync(data) => data.pos.is_finite() && data.rot.is_finite(),
        }
    }
}

fn payload<T: DeserializeOwned>(value: &Value, kind: MessageKind) -> Result<T, ProtocolError> {
    let data = value
        .get("data")
        .ok_or(ProtocolError::MissingData(kind.tag()))?;
    Ok(T::deserialize(data)?)
}
