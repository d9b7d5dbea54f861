use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discrete risk tier for staff queues. Ordering is severity ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Normal recovery, no action needed.
    #[default]
    Routine,
    /// Worth noting, routine queue.
    Low,
    /// Staff review the same day.
    ReviewToday,
    /// Immediate clinician attention.
    Urgent,
}

impl RiskLevel {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Routine => 0,
            Self::Low => 1,
            Self::ReviewToday => 2,
            Self::Urgent => 3,
        }
    }

    /// Map a continuous 0-100 overall risk score to a tier.
    pub fn from_overall_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Urgent,
            50..=79 => Self::ReviewToday,
            25..=49 => Self::Low,
            _ => Self::Routine,
        }
    }
}

/// Triage decision derived from one observation; one per observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triage {
    pub id: Uuid,
    pub observation_id: Uuid,
    pub risk_level: RiskLevel,
    pub flags: Vec<String>,
    /// Human-readable reason trail, semicolon-joined.
    pub reasons: String,
    pub computed_at: DateTime<Utc>,
}
