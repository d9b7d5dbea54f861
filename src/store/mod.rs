pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::PatientStatus;
use crate::models::{
    AuditEvent, CheckinScheduleEntry, Conversation, Message, Observation, Patient, RiskScore,
    Triage,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Narrow persistence contract the core depends on. All writes are
/// append-only except patient status transitions and check-in completion.
/// Storage technology is the collaborator's concern; [`MemoryStore`] is the
/// reference implementation.
#[async_trait]
pub trait Store: Send + Sync {
    // -- patients ----------------------------------------------------------

    async fn insert_patient(&self, patient: Patient) -> Result<(), StoreError>;

    async fn update_patient_status(
        &self,
        patient_id: Uuid,
        status: PatientStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn get_patient(&self, patient_id: Uuid) -> Result<Option<Patient>, StoreError>;

    /// Resolve an inbound sender. Only `active` patients match.
    async fn find_active_patient_by_phone(
        &self,
        phone_e164: &str,
    ) -> Result<Option<Patient>, StoreError>;

    async fn list_active_patients(&self) -> Result<Vec<Patient>, StoreError>;

    // -- clinical records --------------------------------------------------

    async fn insert_observation(&self, observation: Observation) -> Result<(), StoreError>;

    /// All observations for a patient, oldest first.
    async fn observations_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Observation>, StoreError>;

    async fn insert_risk_score(&self, score: RiskScore) -> Result<(), StoreError>;

    async fn insert_triage(&self, triage: Triage) -> Result<(), StoreError>;

    // -- conversations -----------------------------------------------------

    async fn get_or_create_conversation(
        &self,
        patient_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Conversation, StoreError>;

    /// Append a message and bump the owning conversation's counters.
    async fn append_message(&self, message: Message) -> Result<(), StoreError>;

    /// Message history for a patient, oldest first.
    async fn messages_for_patient(&self, patient_id: Uuid) -> Result<Vec<Message>, StoreError>;

    // -- check-in schedule -------------------------------------------------

    async fn insert_checkin_entry(&self, entry: CheckinScheduleEntry) -> Result<(), StoreError>;

    /// The (patient, day) entry whose send started at or after `since`, if
    /// any. Drives the at-most-once-per-calendar-day guarantee.
    async fn checkin_sent_since(
        &self,
        patient_id: Uuid,
        day_index: i64,
        since: DateTime<Utc>,
    ) -> Result<Option<CheckinScheduleEntry>, StoreError>;

    async fn complete_checkin_entry(
        &self,
        entry_id: Uuid,
        completed_at: DateTime<Utc>,
        gateway_message_id: String,
    ) -> Result<(), StoreError>;

    // -- audit -------------------------------------------------------------

    async fn append_audit(&self, event: AuditEvent) -> Result<(), StoreError>;

    async fn audit_events(&self) -> Result<Vec<AuditEvent>, StoreError>;
}
