//! Daily check-in scheduler. Each tick is a short-lived, stateless unit of
//! work driven by an external trigger (cron, cloud scheduler); there is no
//! persistent in-process timer thread.
//!
//! Patients are processed concurrently and independently: one patient's
//! store or gateway failure is audited and swallowed so it can never block a
//! sibling. The at-most-once-per-calendar-day guarantee rests on a
//! check-then-act against the schedule entries; two racing ticks can in
//! principle both pass the check — an accepted, non-corrupting duplicate
//! rather than a reason for a distributed lock.

use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::gateway::{send_with_timeout, GatewayError, MessagingGateway};
use crate::models::{AuditEvent, CheckinScheduleEntry, Patient};
use crate::redact::redact_phone;
use crate::replies::ReplyTemplates;
use crate::store::{Store, StoreError};

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),
}

/// Outcome counts for one scheduled run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub considered: usize,
    pub sent: usize,
    pub already_sent: usize,
    pub out_of_window: usize,
    pub failed: usize,
}

/// Receipt returned by the admin force-send path.
#[derive(Debug)]
pub struct ForceSendReceipt {
    pub patient_id: Uuid,
    pub day_index: i64,
    pub gateway_message_id: String,
    pub body: String,
}

enum PatientOutcome {
    Sent,
    AlreadySent,
    OutOfWindow,
    Failed,
}

pub struct CheckinScheduler {
    store: Arc<dyn Store>,
    gateway: Arc<dyn MessagingGateway>,
    clock: Arc<dyn Clock>,
    config: AppConfig,
}

impl CheckinScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<dyn MessagingGateway>,
        clock: Arc<dyn Clock>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            clock,
            config,
        }
    }

    /// One scheduled run over every active patient. Only a failure to list
    /// the patients aborts the tick; everything after that is per-patient.
    pub async fn run_tick(&self) -> Result<TickSummary, StoreError> {
        if !self.config.scheduler_enabled {
            tracing::info!("Scheduler disabled via config - skipping tick");
            return Ok(TickSummary::default());
        }

        let patients = self.store.list_active_patients().await?;
        tracing::info!(count = patients.len(), "Daily check-in tick starting");

        let outcomes = join_all(
            patients
                .iter()
                .map(|patient| self.process_patient(patient)),
        )
        .await;

        let mut summary = TickSummary {
            considered: patients.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                PatientOutcome::Sent => summary.sent += 1,
                PatientOutcome::AlreadySent => summary.already_sent += 1,
                PatientOutcome::OutOfWindow => summary.out_of_window += 1,
                PatientOutcome::Failed => summary.failed += 1,
            }
        }

        tracing::info!(
            sent = summary.sent,
            already_sent = summary.already_sent,
            out_of_window = summary.out_of_window,
            failed = summary.failed,
            "Daily check-in tick complete"
        );
        Ok(summary)
    }

    /// Bulk-path wrapper: failures are audited and absorbed into the
    /// summary so they cannot affect sibling patients.
    async fn process_patient(&self, patient: &Patient) -> PatientOutcome {
        let day_index = patient.day_index(self.clock.now());
        if day_index < 0 || day_index > self.config.program_days {
            return PatientOutcome::OutOfWindow;
        }

        match self.send_checkin(patient, day_index, false).await {
            Ok(Some(_)) => PatientOutcome::Sent,
            Ok(None) => PatientOutcome::AlreadySent,
            Err(err) => {
                tracing::error!(
                    patient_id = %patient.id,
                    day = day_index,
                    error = %err,
                    "Daily check-in failed"
                );
                PatientOutcome::Failed
            }
        }
    }

    /// Admin-triggered send for one patient. Skips the program window and
    /// idempotency checks and surfaces every failure to the caller.
    pub async fn force_send(&self, patient_id: Uuid) -> Result<ForceSendReceipt, SchedulerError> {
        let patient = self
            .store
            .get_patient(patient_id)
            .await?
            .ok_or(SchedulerError::PatientNotFound(patient_id))?;

        let day_index = patient.day_index(self.clock.now()).max(0);
        let body = ReplyTemplates::daily_checkin(&patient.first_name, day_index);
        let entry_id = self.create_entry(&patient, day_index, true).await?;

        let message_id = self.deliver(&patient, entry_id, day_index, &body).await?;

        Ok(ForceSendReceipt {
            patient_id,
            day_index,
            gateway_message_id: message_id,
            body,
        })
    }

    /// Returns `Ok(None)` when today's prompt was already sent.
    async fn send_checkin(
        &self,
        patient: &Patient,
        day_index: i64,
        manual: bool,
    ) -> Result<Option<String>, SchedulerError> {
        let since = self.clock.start_of_today();
        if let Some(existing) = self
            .store
            .checkin_sent_since(patient.id, day_index, since)
            .await?
        {
            tracing::debug!(
                patient_id = %patient.id,
                entry_id = %existing.id,
                "Check-in already sent today"
            );
            return Ok(None);
        }

        let body = ReplyTemplates::daily_checkin(&patient.first_name, day_index);
        let entry_id = self.create_entry(patient, day_index, manual).await?;
        let message_id = self.deliver(patient, entry_id, day_index, &body).await?;
        Ok(Some(message_id))
    }

    async fn create_entry(
        &self,
        patient: &Patient,
        day_index: i64,
        manual_trigger: bool,
    ) -> Result<Uuid, SchedulerError> {
        let entry = CheckinScheduleEntry {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            day_index,
            sent_at: self.clock.now(),
            completed_at: None,
            gateway_message_id: None,
            manual_trigger,
        };
        let entry_id = entry.id;
        self.store.insert_checkin_entry(entry).await?;
        Ok(entry_id)
    }

    /// Send the prompt and complete the schedule entry. On failure the
    /// entry stays incomplete (so the next tick retries) and a failure
    /// audit record is written.
    async fn deliver(
        &self,
        patient: &Patient,
        entry_id: Uuid,
        day_index: i64,
        body: &str,
    ) -> Result<String, SchedulerError> {
        let now = self.clock.now();
        let send_result = send_with_timeout(
            &self.gateway,
            self.config.gateway_timeout,
            &patient.phone_e164,
            body,
        )
        .await;

        let message_id = match send_result {
            Ok(id) => id,
            Err(err) => {
                self.audit_best_effort(AuditEvent::system(
                    "checkin",
                    entry_id.to_string(),
                    "daily_checkin_failed",
                    now,
                    json!({
                        "patient_id": patient.id,
                        "day_index": day_index,
                        "error": err.to_string(),
                    }),
                ))
                .await;
                return Err(err.into());
            }
        };

        self.store
            .complete_checkin_entry(entry_id, now, message_id.clone())
            .await?;

        self.store
            .append_audit(AuditEvent::system(
                "checkin",
                entry_id.to_string(),
                "daily_checkin_sent",
                now,
                json!({
                    "patient_id": patient.id,
                    "day_index": day_index,
                    "message_id": message_id,
                }),
            ))
            .await?;

        tracing::info!(
            patient_id = %patient.id,
            to = %redact_phone(&patient.phone_e164),
            day = day_index,
            "Daily check-in sent"
        );
        Ok(message_id)
    }

    async fn audit_best_effort(&self, event: AuditEvent) {
        if let Err(err) = self.store.append_audit(event).await {
            tracing::error!(error = %err, "Failed to write failure audit record");
        }
    }
}
