use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Actor;

/// Append-only audit record. Every pipeline and scheduler outcome, success
/// or failure, writes one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub actor: Actor,
    /// Entity kind, e.g. "response" or "checkin".
    pub entity: String,
    pub entity_id: String,
    /// Event name, e.g. "patient_response_processed".
    pub event: String,
    pub timestamp: DateTime<Utc>,
    pub meta: serde_json::Value,
}

impl AuditEvent {
    pub fn system(
        entity: &str,
        entity_id: String,
        event: &str,
        timestamp: DateTime<Utc>,
        meta: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor: Actor::System,
            entity: entity.to_string(),
            entity_id,
            event: event.to_string(),
            timestamp,
            meta,
        }
    }
}
