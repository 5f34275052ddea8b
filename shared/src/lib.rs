//! Wire protocol shared by the game and its remote controllers.
//!
//! Remote peers speak JSON text frames. Inbound, only `{"type":"jump"}` means
//! anything; every other shape is dropped without error. Outbound, the game
//! pushes score changes and the final score of each session.

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8765;

/// Source-agnostic player input, produced by the local input poller and by
/// every remote connection, consumed only by the loop driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Flap,
    Quit,
}

/// A recognized client-to-server message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlMessage {
    Jump,
}

impl ControlMessage {
    pub fn input_event(self) -> InputEvent {
        match self {
            ControlMessage::Jump => InputEvent::Flap,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Parses one inbound text frame.
///
/// Returns `None` for malformed JSON, non-object payloads and unknown `type`
/// values. None of these are errors: the caller drops the frame and keeps the
/// connection open.
pub fn parse_control(text: &str) -> Option<ControlMessage> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    // Only the discriminator is inspected, extra fields are ignored.
    match value.get("type")?.as_str()? {
        "jump" => Some(ControlMessage::Jump),
        _ => None,
    }
}

/// Server-to-client notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    /// Sent every time the score changes during play.
    Score { value: u32 },
    /// Sent once per session, when the player crashes.
    GameOver { score: u32 },
}

impl Notification {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
