//! Participant identity and the display session attached to it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection-scoped identifier for a tournament participant.
pub type ParticipantId = Uuid;

/// What the transport layer knows about a connected participant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub participant: ParticipantId,
    /// Stable public name written into the tournament log.
    pub display_name: String,
}

impl Session {
    pub fn new(participant: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            participant,
            display_name: display_name.into(),
        }
    }
}
