//! Triage classifier. Two historically separate policies are evaluated for
//! every observation and unified here:
//!
//! 1. the continuous mapping from the weighted overall risk score, and
//! 2. the legacy discrete rule set (pain thresholds, bleeding, red/yellow
//!    keyword lists, fever temperature extraction).
//!
//! The final level is the maximum of the two, and it never decreases once a
//! higher-severity rule has matched. Reasons from both evaluations are
//! concatenated uniquely in the order: pain rules, bleeding rules, keyword
//! rules, then the score summary.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::risk::flags;
use crate::models::RiskLevel;
use crate::parser::ParsedResponse;
use crate::scoring::RiskBreakdown;

const RED_PAIN_THRESHOLD: u8 = 9;
const YELLOW_PAIN_MIN: u8 = 7;
const YELLOW_PAIN_MAX: u8 = 8;
const RED_FEVER_TEMP: f64 = 101.0;

const RED_BLEEDING_KEYWORDS: &[&str] = &[
    "heavy bleeding",
    "soaked bandage",
    "blood pooling",
    "bleeding won't stop",
    "bright red blood",
    "large blood clots",
    "bleeding through dressing",
];

const YELLOW_SWELLING_KEYWORDS: &[&str] = &[
    "swelling worse",
    "swelling increasing",
    "more swollen",
    "swelling getting bigger",
    "face more swollen",
    "swelling not going down",
    "new swelling",
];

const YELLOW_BLEEDING_KEYWORDS: &[&str] = &[
    "light bleeding",
    "spotting",
    "pink drainage",
    "some blood",
    "bleeding",
    "small amount of blood",
    "blood on bandage",
];

/// Symptoms outside the bleeding/swelling lists that still warrant same-day
/// review when mentioned.
const CONCERNING_KEYWORDS: &[&str] = &[
    "fever",
    "hot",
    "burning up",
    "chills",
    "infection",
    "pus",
    "discharge",
    "smell",
    "odor",
    "oozing",
    "difficulty breathing",
    "chest pain",
    "shortness of breath",
    "nausea",
    "vomiting",
    "can't keep down",
    "throwing up",
    "dizzy",
    "lightheaded",
    "faint",
    "passed out",
    "rash",
    "allergic reaction",
    "itching all over",
    "hives",
];

static FEVER_TEMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)\s*(?:degrees?|°|f\b|fahrenheit)").unwrap());

/// Terminal triage output for one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub level: RiskLevel,
    pub flags: Vec<String>,
    pub reasons: String,
}

/// Classify one observation given its parse and risk breakdown.
pub fn classify(parsed: &ParsedResponse, risk: &RiskBreakdown) -> Classification {
    let continuous = RiskLevel::from_overall_score(risk.overall_score);

    let mut level = continuous;
    let mut discrete_flags: Vec<String> = Vec::new();
    let mut pain_reasons: Vec<String> = Vec::new();
    let mut bleeding_reasons: Vec<String> = Vec::new();
    let mut keyword_reasons: Vec<String> = Vec::new();

    // Pain rules.
    if let Some(pain) = parsed.pain_score {
        if pain >= RED_PAIN_THRESHOLD {
            level = level.max(RiskLevel::Urgent);
            discrete_flags.push(flags::PAIN_HIGH.into());
            pain_reasons.push(format!("Severe pain reported ({pain}/10)"));
        } else if (YELLOW_PAIN_MIN..=YELLOW_PAIN_MAX).contains(&pain) {
            level = level.max(RiskLevel::ReviewToday);
            discrete_flags.push(flags::PAIN_MODERATE.into());
            pain_reasons.push(format!("Moderate pain reported ({pain}/10)"));
        }
    }

    // Bleeding rule.
    if parsed.bleeding == Some(true) {
        level = level.max(RiskLevel::Low);
        discrete_flags.push(flags::BLEEDING_YES.into());
        bleeding_reasons.push("Patient reports bleeding".into());
    }

    // Keyword rules over the free text.
    let text = parsed.concerns.to_lowercase();
    if !text.is_empty() {
        for keyword in RED_BLEEDING_KEYWORDS {
            if text.contains(keyword) {
                level = level.max(RiskLevel::Urgent);
                discrete_flags.push(flags::BLEEDING_HEAVY.into());
                keyword_reasons.push(format!("Concerning bleeding keywords: \"{keyword}\""));
            }
        }

        if text.contains("fever") || text.contains("temperature") {
            match extract_temperature(&text) {
                Some(temp) if temp >= RED_FEVER_TEMP => {
                    level = level.max(RiskLevel::Urgent);
                    discrete_flags.push(flags::FEVER_HIGH.into());
                    keyword_reasons.push(format!("High fever reported ({temp}\u{b0}F)"));
                }
                Some(temp) if temp > 99.0 => {
                    level = level.max(RiskLevel::ReviewToday);
                    discrete_flags.push(flags::FEVER_MILD.into());
                    keyword_reasons.push(format!("Mild fever reported ({temp}\u{b0}F)"));
                }
                Some(_) => {}
                None => {
                    level = level.max(RiskLevel::ReviewToday);
                    discrete_flags.push(flags::FEVER_MENTIONED.into());
                    keyword_reasons.push("Fever mentioned without temperature".into());
                }
            }
        }

        for keyword in YELLOW_SWELLING_KEYWORDS {
            if text.contains(keyword) {
                level = level.max(RiskLevel::ReviewToday);
                discrete_flags.push(flags::SWELLING_INCREASED.into());
                keyword_reasons.push(format!("Increased swelling: \"{keyword}\""));
            }
        }

        for keyword in YELLOW_BLEEDING_KEYWORDS {
            if text.contains(keyword) {
                level = level.max(RiskLevel::ReviewToday);
                discrete_flags.push(flags::BLEEDING_LIGHT.into());
                keyword_reasons.push(format!("Light bleeding: \"{keyword}\""));
            }
        }

        for keyword in CONCERNING_KEYWORDS {
            if text.contains(keyword) {
                level = level.max(RiskLevel::ReviewToday);
                discrete_flags.push(flags::CONCERNING_SYMPTOMS.into());
                keyword_reasons.push(format!("Concerning symptom mentioned: \"{keyword}\""));
            }
        }
    }

    // The unified level can only be raised by a rule, never lowered.
    debug_assert!(level >= continuous);

    let mut reasons: Vec<String> = Vec::new();
    for reason in pain_reasons
        .into_iter()
        .chain(bleeding_reasons)
        .chain(keyword_reasons)
    {
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }
    reasons.push(format!(
        "Overall: {}% | Pain: {}% | Bleeding: {}% | Infection: {}% | Complications: {}%",
        risk.overall_score,
        risk.pain_risk,
        risk.bleeding_risk,
        risk.infection_risk,
        risk.complications_risk,
    ));

    let mut all_flags: Vec<String> = Vec::new();
    for flag in risk.flags.iter().cloned().chain(discrete_flags) {
        if !all_flags.contains(&flag) {
            all_flags.push(flag);
        }
    }

    Classification {
        level,
        flags: all_flags,
        reasons: reasons.join("; "),
    }
}

fn extract_temperature(text: &str) -> Option<f64> {
    FEVER_TEMP
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
