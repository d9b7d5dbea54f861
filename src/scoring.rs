//! Risk scoring engine. Pure and deterministic: the same inputs always
//! produce the same breakdown, so every rule is unit-testable in isolation.
//!
//! Five dimensions (pain, bleeding, infection, complications, trend), each
//! 0-100. Within a dimension the triggered rules combine by maximum, never by
//! sum; the overall score is the weighted sum across dimensions. Every
//! triggered keyword appends its flag even when it loses the max.

use crate::models::conversation::Message;
use crate::models::enums::MessageDirection;
use crate::models::risk::flags;

const PAIN_WEIGHT: f64 = 0.25;
const BLEEDING_WEIGHT: f64 = 0.20;
const INFECTION_WEIGHT: f64 = 0.30;
const COMPLICATIONS_WEIGHT: f64 = 0.20;
const TREND_WEIGHT: f64 = 0.05;

/// (keyword, risk, flag)
const INFECTION_KEYWORDS: &[(&str, u8, &str)] = &[
    ("fever", 80, flags::FEVER_REPORTED),
    ("hot", 60, flags::HEAT_REPORTED),
    ("burning up", 85, flags::HIGH_FEVER),
    ("chills", 70, flags::CHILLS),
    ("pus", 90, flags::PURULENT_DISCHARGE),
    ("infection", 75, flags::INFECTION_CONCERN),
    ("smells bad", 85, flags::MALODOROUS),
    ("green discharge", 85, flags::PURULENT_DISCHARGE),
    ("yellow discharge", 60, flags::DISCHARGE_CONCERN),
];

const COMPLICATION_KEYWORDS: &[(&str, u8, &str)] = &[
    ("heavy bleeding", 95, flags::HEAVY_BLEEDING),
    ("soaked bandage", 85, flags::EXCESSIVE_BLEEDING),
    ("won't stop bleeding", 90, flags::UNCONTROLLED_BLEEDING),
    ("shortness of breath", 95, flags::RESPIRATORY_DISTRESS),
    ("chest pain", 90, flags::CHEST_PAIN),
    ("difficulty breathing", 95, flags::BREATHING_DIFFICULTY),
    ("swelling worse", 50, flags::WORSENING_SWELLING),
    ("much more swollen", 60, flags::SIGNIFICANT_SWELLING),
    ("numb", 40, flags::NUMBNESS),
    ("can't feel", 50, flags::LOSS_OF_SENSATION),
    ("vision problems", 80, flags::VISION_CHANGES),
    ("can't see", 90, flags::VISION_LOSS),
];

/// Escalating concern language scanned across the conversation history.
const URGENCY_WORDS: &[&str] = &[
    "worse",
    "bad",
    "terrible",
    "emergency",
    "help",
    "scared",
    "worried",
];

/// Everything the engine needs for one observation. `history` is the
/// patient's prior message log, oldest first.
pub struct RiskInputs<'a> {
    pub pain_score: Option<u8>,
    pub bleeding: Option<bool>,
    pub concerns: &'a str,
    pub day_index: i64,
    pub history: &'a [Message],
}

/// Output of the engine; the pipeline wraps this into a stored
/// [`crate::models::RiskScore`].
#[derive(Debug, Clone, PartialEq)]
pub struct RiskBreakdown {
    pub overall_score: u8,
    pub pain_risk: u8,
    pub bleeding_risk: u8,
    pub infection_risk: u8,
    pub complications_risk: u8,
    pub trend_risk: u8,
    pub flags: Vec<String>,
    pub confidence: f64,
}

pub fn calculate_risk(input: &RiskInputs) -> RiskBreakdown {
    let mut flags: Vec<String> = Vec::new();

    let pain_risk = score_pain(input.pain_score, input.day_index, &mut flags);
    let bleeding_risk = score_bleeding(input.bleeding, input.day_index, &mut flags);

    let concerns_lower = input.concerns.to_lowercase();
    let infection_risk = score_keywords(&concerns_lower, INFECTION_KEYWORDS, &mut flags);
    let complications_risk = score_keywords(&concerns_lower, COMPLICATION_KEYWORDS, &mut flags);

    let trend_risk = if input.history.len() >= 2 {
        score_trend(input.history)
    } else {
        0
    };

    let overall = f64::from(pain_risk) * PAIN_WEIGHT
        + f64::from(bleeding_risk) * BLEEDING_WEIGHT
        + f64::from(infection_risk) * INFECTION_WEIGHT
        + f64::from(complications_risk) * COMPLICATIONS_WEIGHT
        + f64::from(trend_risk) * TREND_WEIGHT;

    let mut confidence: f64 = 0.5;
    if input.pain_score.is_some() {
        confidence += 0.2;
    }
    if input.bleeding.is_some() {
        confidence += 0.15;
    }
    if input.concerns.len() > 10 {
        confidence += 0.15;
    }

    RiskBreakdown {
        overall_score: overall.round() as u8,
        pain_risk,
        bleeding_risk,
        infection_risk,
        complications_risk,
        trend_risk,
        flags,
        confidence: confidence.min(1.0),
    }
}

fn score_pain(pain_score: Option<u8>, day_index: i64, flags: &mut Vec<String>) -> u8 {
    let Some(pain) = pain_score else {
        return 0;
    };

    let mut risk: u8 = match pain {
        9..=u8::MAX => {
            flags.push(flags::SEVERE_PAIN.into());
            90
        }
        7..=8 => {
            flags.push(flags::HIGH_PAIN.into());
            70
        }
        5..=6 => {
            flags.push(flags::MODERATE_PAIN.into());
            40
        }
        3..=4 => 20,
        _ => 0,
    };

    // Day-based expectations: high pain right after surgery is less alarming
    // than the same pain a week out.
    if day_index <= 2 && pain >= 8 {
        risk = risk.saturating_add(10).min(100);
    } else if day_index >= 7 && pain >= 6 {
        risk = risk.saturating_add(20).min(100);
        flags.push(flags::PROLONGED_PAIN.into());
    }

    risk
}

fn score_bleeding(bleeding: Option<bool>, day_index: i64, flags: &mut Vec<String>) -> u8 {
    if bleeding != Some(true) {
        return 0;
    }

    flags.push(flags::ACTIVE_BLEEDING.into());
    if day_index >= 3 {
        flags.push(flags::DELAYED_BLEEDING.into());
        80
    } else {
        60
    }
}

fn score_keywords(text: &str, table: &[(&str, u8, &str)], flags: &mut Vec<String>) -> u8 {
    let mut risk = 0;
    for (keyword, keyword_risk, flag) in table {
        if text.contains(keyword) {
            risk = risk.max(*keyword_risk);
            flags.push((*flag).to_string());
        }
    }
    risk
}

/// Trend analysis over the prior message log. Only reached with >=2 prior
/// messages; each sub-rule sets its own floor, max wins.
fn score_trend(history: &[Message]) -> u8 {
    let mut trend: u8 = 0;

    // Worsening pain: the two most recent scored entries, by check-in day.
    let mut pain_series: Vec<(i64, u8)> = history
        .iter()
        .filter_map(|m| {
            m.metadata
                .pain_score
                .map(|score| (m.metadata.checkin_day.unwrap_or(0), score))
        })
        .collect();
    pain_series.sort_by_key(|(day, _)| *day);

    if pain_series.len() >= 2 {
        let previous = pain_series[pain_series.len() - 2].1;
        let latest = pain_series[pain_series.len() - 1].1;
        if latest > previous.saturating_add(2) {
            trend = trend.max(40);
        }
    }

    // Recurring bleeding reports.
    let bleeding_reports = history
        .iter()
        .filter(|m| m.metadata.bleeding == Some(true))
        .count();
    if bleeding_reports >= 2 {
        trend = trend.max(30);
    }

    // Escalating concern language across substantive inbound messages.
    let concern_texts: Vec<String> = history
        .iter()
        .filter(|m| m.direction == MessageDirection::Inbound && m.content.len() > 20)
        .map(|m| m.content.to_lowercase())
        .collect();

    if concern_texts.len() >= 2 {
        let urgent_count: usize = concern_texts
            .iter()
            .map(|text| URGENCY_WORDS.iter().filter(|w| text.contains(*w)).count())
            .sum();
        if urgent_count >= 3 {
            trend = trend.max(35);
        }
    }

    trend
}
