use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row per (patient, day-index) prompt attempt.
///
/// Invariant: at most one completed entry per (patient, calendar day). An
/// entry with `completed_at: None` records a send that was started but not
/// confirmed; the next scheduler tick may retry it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinScheduleEntry {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub day_index: i64,
    /// When the send was initiated.
    pub sent_at: DateTime<Utc>,
    /// Set once the gateway confirmed the send.
    pub completed_at: Option<DateTime<Utc>>,
    pub gateway_message_id: Option<String>,
    /// True when created by the admin force-send path rather than the
    /// scheduled bulk run.
    pub manual_trigger: bool,
}
