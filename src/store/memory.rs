//! Reference store backed by in-process maps. Used by the test suite and as
//! the contract documentation for real store adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::enums::{ConversationStatus, PatientStatus};
use crate::models::{
    AuditEvent, CheckinScheduleEntry, Conversation, Message, Observation, Patient, RiskScore,
    Triage,
};

use super::{Store, StoreError};

#[derive(Default)]
struct Inner {
    patients: HashMap<Uuid, Patient>,
    observations: Vec<Observation>,
    risk_scores: Vec<RiskScore>,
    triages: Vec<Triage>,
    conversations: HashMap<Uuid, Conversation>,
    messages: Vec<Message>,
    checkin_entries: HashMap<Uuid, CheckinScheduleEntry>,
    audit: Vec<AuditEvent>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn risk_scores(&self) -> Vec<RiskScore> {
        self.inner.read().await.risk_scores.clone()
    }

    pub async fn triages(&self) -> Vec<Triage> {
        self.inner.read().await.triages.clone()
    }

    pub async fn checkin_entries(&self) -> Vec<CheckinScheduleEntry> {
        self.inner
            .read()
            .await
            .checkin_entries
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_patient(&self, patient: Patient) -> Result<(), StoreError> {
        self.inner.write().await.patients.insert(patient.id, patient);
        Ok(())
    }

    async fn update_patient_status(
        &self,
        patient_id: Uuid,
        status: PatientStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let patient = inner
            .patients
            .get_mut(&patient_id)
            .ok_or_else(|| StoreError::NotFound {
                entity_type: "patient".into(),
                id: patient_id.to_string(),
            })?;
        patient.status = status;
        patient.updated_at = updated_at;
        Ok(())
    }

    async fn get_patient(&self, patient_id: Uuid) -> Result<Option<Patient>, StoreError> {
        Ok(self.inner.read().await.patients.get(&patient_id).cloned())
    }

    async fn find_active_patient_by_phone(
        &self,
        phone_e164: &str,
    ) -> Result<Option<Patient>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .patients
            .values()
            .find(|p| p.phone_e164 == phone_e164 && p.status == PatientStatus::Active)
            .cloned())
    }

    async fn list_active_patients(&self) -> Result<Vec<Patient>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .patients
            .values()
            .filter(|p| p.status == PatientStatus::Active)
            .cloned()
            .collect())
    }

    async fn insert_observation(&self, observation: Observation) -> Result<(), StoreError> {
        self.inner.write().await.observations.push(observation);
        Ok(())
    }

    async fn observations_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Observation>, StoreError> {
        let inner = self.inner.read().await;
        let mut observations: Vec<Observation> = inner
            .observations
            .iter()
            .filter(|o| o.patient_id == patient_id)
            .cloned()
            .collect();
        observations.sort_by_key(|o| o.received_at);
        Ok(observations)
    }

    async fn insert_risk_score(&self, score: RiskScore) -> Result<(), StoreError> {
        self.inner.write().await.risk_scores.push(score);
        Ok(())
    }

    async fn insert_triage(&self, triage: Triage) -> Result<(), StoreError> {
        self.inner.write().await.triages.push(triage);
        Ok(())
    }

    async fn get_or_create_conversation(
        &self,
        patient_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Conversation, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner
            .conversations
            .values()
            .find(|c| c.patient_id == patient_id && c.status == ConversationStatus::Active)
        {
            return Ok(existing.clone());
        }

        let conversation = Conversation {
            id: Uuid::new_v4(),
            patient_id,
            created_at: now,
            updated_at: now,
            message_count: 0,
            last_message_at: now,
            status: ConversationStatus::Active,
        };
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn append_message(&self, message: Message) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let conversation = inner
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or_else(|| StoreError::NotFound {
                entity_type: "conversation".into(),
                id: message.conversation_id.to_string(),
            })?;
        conversation.message_count += 1;
        conversation.last_message_at = message.timestamp;
        conversation.updated_at = message.timestamp;
        inner.messages.push(message);
        Ok(())
    }

    async fn messages_for_patient(&self, patient_id: Uuid) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.patient_id == patient_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn insert_checkin_entry(&self, entry: CheckinScheduleEntry) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .checkin_entries
            .insert(entry.id, entry);
        Ok(())
    }

    async fn checkin_sent_since(
        &self,
        patient_id: Uuid,
        day_index: i64,
        since: DateTime<Utc>,
    ) -> Result<Option<CheckinScheduleEntry>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .checkin_entries
            .values()
            .find(|e| {
                e.patient_id == patient_id && e.day_index == day_index && e.sent_at >= since
            })
            .cloned())
    }

    async fn complete_checkin_entry(
        &self,
        entry_id: Uuid,
        completed_at: DateTime<Utc>,
        gateway_message_id: String,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .checkin_entries
            .get_mut(&entry_id)
            .ok_or_else(|| StoreError::NotFound {
                entity_type: "checkin_schedule".into(),
                id: entry_id.to_string(),
            })?;
        entry.completed_at = Some(completed_at);
        entry.gateway_message_id = Some(gateway_message_id);
        Ok(())
    }

    async fn append_audit(&self, event: AuditEvent) -> Result<(), StoreError> {
        self.inner.write().await.audit.push(event);
        Ok(())
    }

    async fn audit_events(&self) -> Result<Vec<AuditEvent>, StoreError> {
        Ok(self.inner.read().await.audit.clone())
    }
}
