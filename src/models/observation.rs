use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One structured interpretation of a single inbound patient message.
/// Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Days since surgery at receipt time.
    pub day_index: i64,
    /// Self-reported pain, 0-10. Absent when no recognizable score was found.
    pub pain_score: Option<u8>,
    /// Tri-state: `Some(true)` bleeding reported, `Some(false)` explicitly
    /// denied, `None` not mentioned.
    pub bleeding: Option<bool>,
    /// The full normalized message text, kept verbatim regardless of which
    /// structured fields were extracted.
    pub concerns_text: String,
    pub received_at: DateTime<Utc>,
    /// Message id assigned by the SMS transport.
    pub external_message_id: String,
}
