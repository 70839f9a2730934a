//! Typed cross-window messages exchanged with the embedded page.
//!
//! The embedded page posts JSON objects discriminated by a `type` field:
//!
//! | `type`              | extra fields                         |
//! |---------------------|--------------------------------------|
//! | `INITIALISING`      | (none)                               |
//! | `INITIALISING_DONE` | (none)                               |
//! | `RENDERING`         | (none)                               |
//! | `RENDERING_DONE`    | (none)                               |
//! | `USER_EVENT`        | `userEventTime` (number or null)     |
//! | `USER_IDLE`         | `lastActiveTime` (number or null)    |
//! | `ERROR`             | `errorDigest` (optional string)      |
//!
//! Every message carries `messageTime` (epoch millis) and an optional
//! human-readable `message`. Validation is total: [`parse_message`] either
//! returns a fully-typed [`EmbedMessage`] or a [`MessageParseError`].
//! Unknown tags and missing required fields are rejected outright (a
//! payload is never partially accepted), while unknown extra fields are
//! tolerated so the embedded page can evolve ahead of the host.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// An inbound payload did not match any message variant.
#[derive(Debug, Error)]
#[error("invalid embed message: {0}")]
pub struct MessageParseError(#[from] serde_json::Error);

/// Keeps a nullable field key-required: serde defaults a missing `Option`
/// field to `None`, which would let `{"type": "USER_EVENT"}` pass without
/// its `userEventTime` key.
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer)
}

/// The embedded page has started initialising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialisingMessage {
    /// When the embedded page produced the message, epoch millis.
    pub message_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Initialisation finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialisingDoneMessage {
    pub message_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The page has started rendering its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingMessage {
    pub message_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Rendering finished; the page is interactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingDoneMessage {
    pub message_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The user interacted with the embedded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEventMessage {
    pub message_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Time of the interaction, epoch millis. The key is always present
    /// but the page may send `null`.
    #[serde(deserialize_with = "required_nullable")]
    pub user_event_time: Option<i64>,
}

/// The embedded page considers the user idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdleMessage {
    pub message_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Last observed activity, epoch millis. The key is always present
    /// but the page may send `null`.
    #[serde(deserialize_with = "required_nullable")]
    pub last_active_time: Option<i64>,
}

/// Something went wrong inside the embedded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub message_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Opaque digest identifying the failure in the page's own logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_digest: Option<String>,
}

/// Every message the embedded page can post, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmbedMessage {
    Initialising(InitialisingMessage),
    InitialisingDone(InitialisingDoneMessage),
    Rendering(RenderingMessage),
    RenderingDone(RenderingDoneMessage),
    UserEvent(UserEventMessage),
    UserIdle(UserIdleMessage),
    Error(ErrorMessage),
}

impl EmbedMessage {
    /// Epoch-millis timestamp common to every variant.
    pub fn message_time(&self) -> i64 {
        match self {
            EmbedMessage::Initialising(m) => m.message_time,
            EmbedMessage::InitialisingDone(m) => m.message_time,
            EmbedMessage::Rendering(m) => m.message_time,
            EmbedMessage::RenderingDone(m) => m.message_time,
            EmbedMessage::UserEvent(m) => m.message_time,
            EmbedMessage::UserIdle(m) => m.message_time,
            EmbedMessage::Error(m) => m.message_time,
        }
    }
}

/// Validate an arbitrary JSON value as an [`EmbedMessage`].
///
/// Never panics and never coerces: anything that is not exactly one of the
/// message variants comes back as an error.
pub fn parse_message(data: Value) -> Result<EmbedMessage, MessageParseError> {
    serde_json::from_value(data).map_err(MessageParseError::from)
}
