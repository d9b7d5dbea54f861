use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ConversationStatus, MessageDirection, MessageType};

/// Per-patient SMS thread. Append-only; doubles as the audit trail and the
/// input window for trend analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: u32,
    pub last_message_at: DateTime<Utc>,
    pub status: ConversationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    /// Denormalized for per-patient history queries.
    pub patient_id: Uuid,
    pub direction: MessageDirection,
    pub content: String,
    /// Id assigned by the SMS transport, when known.
    pub gateway_message_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub message_type: MessageType,
    pub metadata: MessageMetadata,
    /// Whether this message has been through the triage pipeline.
    pub processed: bool,
}

/// Structured fields carried alongside a message for trend analysis, so the
/// scoring engine never has to re-parse historical text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub pain_score: Option<u8>,
    pub bleeding: Option<bool>,
    pub triage_level: Option<u8>,
    pub checkin_day: Option<i64>,
    pub observation_id: Option<Uuid>,
}
