use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Composite risk assessment for one observation. Immutable once stored.
///
/// Sub-scores are 0-100. The overall score is the weighted sum of the five
/// dimensions (weights in [`crate::scoring`]). Flags are ordered by detection
/// and may repeat when multiple keywords of the same signal fire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    pub id: Uuid,
    pub observation_id: Uuid,
    pub overall_score: u8,
    pub pain_risk: u8,
    pub bleeding_risk: u8,
    pub infection_risk: u8,
    pub complications_risk: u8,
    pub trend_risk: u8,
    pub flags: Vec<String>,
    /// 0.0-1.0, reflects completeness of the underlying data.
    pub confidence: f64,
    pub computed_at: DateTime<Utc>,
}

/// Machine-readable clinical signal tags attached to risk scores and triage
/// records. Kept as plain strings in storage; the constants below are the
/// canonical spellings.
pub mod flags {
    pub const SEVERE_PAIN: &str = "SEVERE_PAIN";
    pub const HIGH_PAIN: &str = "HIGH_PAIN";
    pub const MODERATE_PAIN: &str = "MODERATE_PAIN";
    pub const PROLONGED_PAIN: &str = "PROLONGED_PAIN";
    pub const ACTIVE_BLEEDING: &str = "ACTIVE_BLEEDING";
    pub const DELAYED_BLEEDING: &str = "DELAYED_BLEEDING";

    pub const FEVER_REPORTED: &str = "FEVER_REPORTED";
    pub const HEAT_REPORTED: &str = "HEAT_REPORTED";
    pub const HIGH_FEVER: &str = "HIGH_FEVER";
    pub const CHILLS: &str = "CHILLS";
    pub const PURULENT_DISCHARGE: &str = "PURULENT_DISCHARGE";
    pub const INFECTION_CONCERN: &str = "INFECTION_CONCERN";
    pub const MALODOROUS: &str = "MALODOROUS";
    pub const DISCHARGE_CONCERN: &str = "DISCHARGE_CONCERN";

    pub const HEAVY_BLEEDING: &str = "HEAVY_BLEEDING";
    pub const EXCESSIVE_BLEEDING: &str = "EXCESSIVE_BLEEDING";
    pub const UNCONTROLLED_BLEEDING: &str = "UNCONTROLLED_BLEEDING";
    pub const RESPIRATORY_DISTRESS: &str = "RESPIRATORY_DISTRESS";
    pub const CHEST_PAIN: &str = "CHEST_PAIN";
    pub const BREATHING_DIFFICULTY: &str = "BREATHING_DIFFICULTY";
    pub const WORSENING_SWELLING: &str = "WORSENING_SWELLING";
    pub const SIGNIFICANT_SWELLING: &str = "SIGNIFICANT_SWELLING";
    pub const NUMBNESS: &str = "NUMBNESS";
    pub const LOSS_OF_SENSATION: &str = "LOSS_OF_SENSATION";
    pub const VISION_CHANGES: &str = "VISION_CHANGES";
    pub const VISION_LOSS: &str = "VISION_LOSS";

    // Legacy discrete rule set (triage classifier).
    pub const PAIN_HIGH: &str = "PAIN_HIGH";
    pub const PAIN_MODERATE: &str = "PAIN_MODERATE";
    pub const BLEEDING_YES: &str = "BLEEDING_YES";
    pub const BLEEDING_HEAVY: &str = "BLEEDING_HEAVY";
    pub const BLEEDING_LIGHT: &str = "BLEEDING_LIGHT";
    pub const FEVER_HIGH: &str = "FEVER_HIGH";
    pub const FEVER_MILD: &str = "FEVER_MILD";
    pub const FEVER_MENTIONED: &str = "FEVER_MENTIONED";
    pub const SWELLING_INCREASED: &str = "SWELLING_INCREASED";
    pub const CONCERNING_SYMPTOMS: &str = "CONCERNING_SYMPTOMS";
}
