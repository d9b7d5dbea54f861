use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PatientStatus;

/// An enrolled post-surgical patient. Created at enrollment, mutated only by
/// status transitions, never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub practice_id: Uuid,
    pub first_name: String,
    pub last_initial: String,
    pub phone_e164: String,
    pub procedure_type: String,
    /// Calendar date of surgery. Day-index 0 is this date.
    pub surgery_date: NaiveDate,
    /// IANA timezone name, recorded at enrollment. Scheduling currently runs
    /// against the reference clock, not this field (see DESIGN.md).
    pub timezone: String,
    pub status: PatientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Whole days elapsed since surgery at `now` (reference clock).
    /// 0 on surgery day; negative if surgery is still in the future.
    pub fn day_index(&self, now: DateTime<Utc>) -> i64 {
        (now.date_naive() - self.surgery_date).num_days()
    }
}
