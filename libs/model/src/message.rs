//! Push channel messages.
//!
//! The server pushes JSON text frames of the form `{"type": ..., "data": ...}`.
//! Decoding is two-step: the envelope first, then the payload against the
//! declared type, so an unrecognized type (ignorable) is distinguishable
//! from a malformed payload (dropped with a warning).

use serde::{Deserialize, Serialize};

use crate::error::MessageError;
use crate::status::TeacherStatus;
use crate::types::{Application, Teacher};

/// All push message type names as constants.
pub mod message_types {
    pub const NEW_APPLICATION: &str = "NEW_APPLICATION";
    pub const STATUS_UPDATE: &str = "STATUS_UPDATE";
}

/// Frame envelope before payload dispatch.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Vacancy reference inside a push payload. Only the id is used for lookup;
/// anything else on the wire is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyRef {
    pub id: String,
}

/// Payload of a `NEW_APPLICATION` message: a teacher applied to a vacancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplicationEvent {
    pub teacher: Teacher,
    pub vacancy: VacancyRef,
    pub application: Application,
}

/// Payload of a `STATUS_UPDATE` message: a teacher's review status changed
/// elsewhere (another console session or the server itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateEvent {
    pub teacher_id: String,
    pub status: TeacherStatus,
}

/// A decoded push message.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    NewApplication(NewApplicationEvent),
    StatusUpdate(StatusUpdateEvent),
}

impl PushMessage {
    /// Decodes a raw text frame.
    ///
    /// Returns [`MessageError::UnknownType`] for a well-formed frame whose
    /// type is not recognized; callers log those and move on.
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        let frame: RawFrame = serde_json::from_str(text)?;
        match frame.kind.as_str() {
            message_types::NEW_APPLICATION => {
                let event = serde_json::from_value(frame.data)
                    .map_err(|e| MessageError::InvalidPayload(e.to_string()))?;
                Ok(PushMessage::NewApplication(event))
            }
            message_types::STATUS_UPDATE => {
                let event = serde_json::from_value(frame.data)
                    .map_err(|e| MessageError::InvalidPayload(e.to_string()))?;
                Ok(PushMessage::StatusUpdate(event))
            }
            other => Err(MessageError::UnknownType(other.to_string())),
        }
    }

    /// The wire type name of this message.
    pub fn type_name(&self) -> &'static str {
        match self {
            PushMessage::NewApplication(_) => message_types::NEW_APPLICATION,
            PushMessage::StatusUpdate(_) => message_types::STATUS_UPDATE,
        }
    }
}
