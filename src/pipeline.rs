//! Inbound message orchestrator: parse → score → classify → reply → audit.
//!
//! Each stage up to the final gateway/store calls is a pure function; this
//! module owns the sequencing and the error policy between stages. One
//! inbound SMS is one unit of work — a dependency failure here is fatal for
//! this message only and never affects other patients' messages.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::gateway::{send_with_timeout, GatewayError, MessagingGateway};
use crate::models::enums::{MessageDirection, MessageType};
use crate::models::{
    AuditEvent, Message, MessageMetadata, Observation, RiskLevel, RiskScore, Triage,
};
use crate::parser::parse_patient_response;
use crate::redact::{redact_body, redact_phone};
use crate::replies::{ReplyTemplates, COURTESY_REPLY};
use crate::scoring::{calculate_risk, RiskInputs};
use crate::store::{Store, StoreError};
use crate::triage::classify;

/// One normalized event per received SMS, as handed over by the transport
/// webhook. Signature verification happens before this point.
#[derive(Debug, Clone)]
pub struct InboundSms {
    pub from: String,
    pub body: String,
    pub external_message_id: String,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// What happened to one inbound message.
#[derive(Debug)]
pub enum InboundOutcome {
    /// Full pipeline ran; reply was sent.
    Processed(ProcessedReceipt),
    /// No active patient matched the sender; courtesy reply sent, nothing
    /// recorded.
    UnknownSender,
}

#[derive(Debug)]
pub struct ProcessedReceipt {
    pub patient_id: Uuid,
    pub observation_id: Uuid,
    pub day_index: i64,
    pub risk_level: RiskLevel,
    pub overall_score: u8,
    pub reply_message_id: String,
}

pub struct Pipeline {
    store: Arc<dyn Store>,
    gateway: Arc<dyn MessagingGateway>,
    clock: Arc<dyn Clock>,
    config: AppConfig,
}

impl Pipeline {
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

    /// Process one inbound SMS end to end.
    pub async fn handle_inbound(&self, sms: InboundSms) -> Result<InboundOutcome, PipelineError> {
        let Some(patient) = self
            .store
            .find_active_patient_by_phone(&sms.from)
            .await?
        else {
            tracing::info!(from = %redact_phone(&sms.from), "No active patient for sender");
            send_with_timeout(
                &self.gateway,
                self.config.gateway_timeout,
                &sms.from,
                COURTESY_REPLY,
            )
            .await?;
            return Ok(InboundOutcome::UnknownSender);
        };

        let now = self.clock.now();
        // Messages from before the surgery date carry a negative day-index;
        // clamp to day 0 rather than rejecting them.
        let day_index = patient.day_index(now).max(0);

        tracing::info!(
            patient_id = %patient.id,
            day = day_index,
            body = %redact_body(&sms.body),
            "Processing patient response"
        );

        // Stage 1: parse. Never fails; unrecognized fields stay unset.
        let parsed = parse_patient_response(&sms.body, day_index);

        let observation = Observation {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            day_index,
            pain_score: parsed.pain_score,
            bleeding: parsed.bleeding,
            concerns_text: parsed.concerns.clone(),
            received_at: now,
            external_message_id: sms.external_message_id.clone(),
        };
        let observation_id = observation.id;
        self.store.insert_observation(observation).await?;

        // Stage 2: score against the prior conversation window.
        let history = self.store.messages_for_patient(patient.id).await?;
        let risk = calculate_risk(&RiskInputs {
            pain_score: parsed.pain_score,
            bleeding: parsed.bleeding,
            concerns: &parsed.concerns,
            day_index,
            history: &history,
        });

        // Stage 3: classify with both rule sets unified.
        let classification = classify(&parsed, &risk);

        self.store
            .insert_risk_score(RiskScore {
                id: Uuid::new_v4(),
                observation_id,
                overall_score: risk.overall_score,
                pain_risk: risk.pain_risk,
                bleeding_risk: risk.bleeding_risk,
                infection_risk: risk.infection_risk,
                complications_risk: risk.complications_risk,
                trend_risk: risk.trend_risk,
                flags: risk.flags.clone(),
                confidence: risk.confidence,
                computed_at: now,
            })
            .await?;

        self.store
            .insert_triage(Triage {
                id: Uuid::new_v4(),
                observation_id,
                risk_level: classification.level,
                flags: classification.flags.clone(),
                reasons: classification.reasons.clone(),
                computed_at: now,
            })
            .await?;

        // Stage 4: thread the exchange into the conversation log.
        let conversation = self
            .store
            .get_or_create_conversation(patient.id, now)
            .await?;
        self.store
            .append_message(Message {
                id: Uuid::new_v4(),
                conversation_id: conversation.id,
                patient_id: patient.id,
                direction: MessageDirection::Inbound,
                content: parsed.concerns.clone(),
                gateway_message_id: Some(sms.external_message_id.clone()),
                timestamp: now,
                message_type: MessageType::CheckinResponse,
                metadata: MessageMetadata {
                    pain_score: parsed.pain_score,
                    bleeding: parsed.bleeding,
                    triage_level: Some(classification.level.as_u8()),
                    checkin_day: Some(day_index),
                    observation_id: Some(observation_id),
                },
                processed: true,
            })
            .await?;

        // Stage 5: reply. A gateway failure past this point leaves the
        // clinical records in place and produces a failure audit record.
        let reply = ReplyTemplates::auto_reply(
            classification.level,
            &classification.flags,
            day_index,
            &patient.first_name,
        );

        let reply_message_id = match send_with_timeout(
            &self.gateway,
            self.config.gateway_timeout,
            &patient.phone_e164,
            &reply,
        )
        .await
        {
            Ok(id) => id,
            Err(err) => {
                self.audit_best_effort(AuditEvent::system(
                    "response",
                    observation_id.to_string(),
                    "auto_reply_failed",
                    now,
                    json!({
                        "patient_id": patient.id,
                        "risk_level": classification.level.as_u8(),
                        "error": err.to_string(),
                    }),
                ))
                .await;
                return Err(err.into());
            }
        };

        self.store
            .append_message(Message {
                id: Uuid::new_v4(),
                conversation_id: conversation.id,
                patient_id: patient.id,
                direction: MessageDirection::Outbound,
                content: reply,
                gateway_message_id: Some(reply_message_id.clone()),
                timestamp: now,
                message_type: MessageType::AutoReply,
                metadata: MessageMetadata {
                    triage_level: Some(classification.level.as_u8()),
                    checkin_day: Some(day_index),
                    observation_id: Some(observation_id),
                    ..Default::default()
                },
                processed: true,
            })
            .await?;

        self.store
            .append_audit(AuditEvent::system(
                "response",
                observation_id.to_string(),
                "patient_response_processed",
                now,
                json!({
                    "patient_id": patient.id,
                    "risk_level": classification.level.as_u8(),
                    "flags": classification.flags,
                }),
            ))
            .await?;

        tracing::info!(
            patient_id = %patient.id,
            observation_id = %observation_id,
            risk_level = classification.level.as_u8(),
            overall = risk.overall_score,
            "Patient response processed"
        );

        Ok(InboundOutcome::Processed(ProcessedReceipt {
            patient_id: patient.id,
            observation_id,
            day_index,
            risk_level: classification.level,
            overall_score: risk.overall_score,
            reply_message_id,
        }))
    }

    /// Audit writes on failure paths must not mask the original error.
    async fn audit_best_effort(&self, event: AuditEvent) {
        if let Err(err) = self.store.append_audit(event).await {
            tracing::error!(error = %err, "Failed to write failure audit record");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::clock::FixedClock;
    use crate::gateway::testing::{FailingGateway, RecordingGateway};
    use crate::models::enums::PatientStatus;
    use crate::models::Patient;
    use crate::store::MemoryStore;

    fn patient(phone: &str, surgery_date: NaiveDate) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            practice_id: Uuid::new_v4(),
            first_name: "Maya".into(),
            last_initial: "R".into(),
            phone_e164: phone.into(),
            procedure_type: "wisdom_teeth".into(),
            surgery_date,
            timezone: "America/Denver".into(),
            status: PatientStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sms(from: &str, body: &str) -> InboundSms {
        InboundSms {
            from: from.into(),
            body: body.into(),
            external_message_id: "SMIN01".into(),
        }
    }

    struct Harness {
        store: Arc<MemoryStore>,
        gateway: Arc<RecordingGateway>,
        pipeline: Pipeline,
    }

    fn harness(now: chrono::DateTime<Utc>) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(RecordingGateway::new());
        let pipeline = Pipeline::new(
            store.clone(),
            gateway.clone(),
            Arc::new(FixedClock(now)),
            AppConfig::default(),
        );
        Harness {
            store,
            gateway,
            pipeline,
        }
    }

    /// Scenario D: structured extraction plus triage over one real message.
    #[tokio::test]
    async fn full_pipeline_for_day_three_response() {
        let now = Utc.with_ymd_and_hms(2026, 3, 13, 15, 0, 0).unwrap();
        let h = harness(now);
        h.store
            .insert_patient(patient(
                "+18015550101",
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            ))
            .await
            .unwrap();

        let outcome = h
            .pipeline
            .handle_inbound(sms(
                "+18015550101",
                "Pain level 8, some bleeding, worried about swelling",
            ))
            .await
            .unwrap();

        let InboundOutcome::Processed(receipt) = outcome else {
            panic!("expected processed outcome");
        };
        assert_eq!(receipt.day_index, 3);
        assert!(receipt.risk_level >= RiskLevel::ReviewToday);

        let observations = h
            .store
            .observations_for_patient(receipt.patient_id)
            .await
            .unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].pain_score, Some(8));
        assert_eq!(observations[0].bleeding, Some(true));
        assert_eq!(
            observations[0].concerns_text,
            "pain level 8, some bleeding, worried about swelling"
        );

        assert_eq!(h.store.risk_scores().await.len(), 1);
        assert_eq!(h.store.triages().await.len(), 1);

        // Inbound and outbound both threaded into the conversation.
        let messages = h.store.messages_for_patient(receipt.patient_id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].direction, MessageDirection::Inbound);
        assert_eq!(messages[1].direction, MessageDirection::Outbound);

        // Reply went to the patient.
        let sent = h.gateway.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "+18015550101");
        assert!(sent[0].body.contains("Hi Maya"));

        let audit = h.store.audit_events().await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].event, "patient_response_processed");
    }

    /// Scenario F: unknown sender gets exactly one courtesy reply and no
    /// clinical records.
    #[tokio::test]
    async fn unknown_sender_gets_courtesy_reply_only() {
        let now = Utc.with_ymd_and_hms(2026, 3, 13, 15, 0, 0).unwrap();
        let h = harness(now);

        let outcome = h
            .pipeline
            .handle_inbound(sms("+19995550000", "hello?"))
            .await
            .unwrap();
        assert!(matches!(outcome, InboundOutcome::UnknownSender));

        let sent = h.gateway.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, COURTESY_REPLY);

        assert!(h.store.risk_scores().await.is_empty());
        assert!(h.store.triages().await.is_empty());
        assert!(h.store.audit_events().await.unwrap().is_empty());
    }

    /// Paused patients do not match the phone lookup.
    #[tokio::test]
    async fn paused_patient_is_treated_as_unknown() {
        let now = Utc.with_ymd_and_hms(2026, 3, 13, 15, 0, 0).unwrap();
        let h = harness(now);
        let mut p = patient("+18015550101", NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        p.status = PatientStatus::Paused;
        h.store.insert_patient(p).await.unwrap();

        let outcome = h
            .pipeline
            .handle_inbound(sms("+18015550101", "pain 9"))
            .await
            .unwrap();
        assert!(matches!(outcome, InboundOutcome::UnknownSender));
        assert!(h.store.risk_scores().await.is_empty());
    }

    /// Pre-surgery messages are clamped to day 0 rather than rejected.
    #[tokio::test]
    async fn negative_day_index_clamps_to_zero() {
        let now = Utc.with_ymd_and_hms(2026, 3, 8, 9, 0, 0).unwrap();
        let h = harness(now);
        h.store
            .insert_patient(patient(
                "+18015550101",
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            ))
            .await
            .unwrap();

        let outcome = h
            .pipeline
            .handle_inbound(sms("+18015550101", "already sore, pain 4"))
            .await
            .unwrap();
        let InboundOutcome::Processed(receipt) = outcome else {
            panic!("expected processed outcome");
        };
        assert_eq!(receipt.day_index, 0);
    }

    /// A gateway failure after the records are written surfaces the error
    /// and leaves a failure audit record behind.
    #[tokio::test]
    async fn reply_send_failure_is_audited_and_surfaced() {
        let now = Utc.with_ymd_and_hms(2026, 3, 13, 15, 0, 0).unwrap();
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(
            store.clone(),
            Arc::new(FailingGateway::all()),
            Arc::new(FixedClock(now)),
            AppConfig::default(),
        );
        store
            .insert_patient(patient(
                "+18015550101",
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            ))
            .await
            .unwrap();

        let result = pipeline
            .handle_inbound(sms("+18015550101", "pain 9"))
            .await;
        assert!(matches!(result, Err(PipelineError::Gateway(_))));

        // Clinical records survive; the failed send is audited.
        assert_eq!(store.risk_scores().await.len(), 1);
        let audit = store.audit_events().await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].event, "auto_reply_failed");
    }

    /// Two near-simultaneous messages from the same patient each get their
    /// own observation, score, and reply.
    #[tokio::test]
    async fn concurrent_messages_from_same_patient_both_process() {
        let now = Utc.with_ymd_and_hms(2026, 3, 13, 15, 0, 0).unwrap();
        let h = harness(now);
        h.store
            .insert_patient(patient(
                "+18015550101",
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            ))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            h.pipeline.handle_inbound(sms("+18015550101", "pain 6")),
            h.pipeline.handle_inbound(sms("+18015550101", "no bleeding today")),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(h.store.risk_scores().await.len(), 2);
        assert_eq!(h.store.triages().await.len(), 2);
        assert_eq!(h.gateway.sent().await.len(), 2);
    }
}
