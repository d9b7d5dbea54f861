//! Inbound message parser. Turns raw SMS text into the structured fields of
//! an [`crate::models::Observation`]. Deterministic keyword/regex matching
//! only; parsing never fails — an unrecognized pattern just leaves the field
//! unset.

use std::sync::LazyLock;

use regex::Regex;

/// A number 0-10 within 20 characters after "pain", "hurt", or "sore".
static PAIN_AFTER_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:pain|hurt|sore).{0,20}?(\d+)").unwrap());

/// A number at the very start of the message ("7, no bleeding").
static PAIN_AT_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)").unwrap());

/// Affirmative bleeding indicators. Checked before the negative set, so
/// "yes" wins when a message matches both.
static BLEEDING_YES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(yes|bleeding|blood|bleed)\b").unwrap());

static BLEEDING_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(no|none|not bleeding)\b").unwrap());

/// Structured fields extracted from one inbound message. The normalized text
/// is always retained in full as `concerns`; extraction never discards it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub pain_score: Option<u8>,
    pub bleeding: Option<bool>,
    pub concerns: String,
}

/// Parse one inbound message body. `day_index` is computed by the caller and
/// carried through unmodified; it does not affect extraction.
pub fn parse_patient_response(body: &str, _day_index: i64) -> ParsedResponse {
    let text = body.to_lowercase().trim().to_string();

    let pain_score = extract_pain_score(&text);
    let bleeding = extract_bleeding(&text);

    ParsedResponse {
        pain_score,
        bleeding,
        concerns: text,
    }
}

fn extract_pain_score(text: &str) -> Option<u8> {
    let captures = PAIN_AFTER_KEYWORD
        .captures(text)
        .or_else(|| PAIN_AT_START.captures(text))?;

    // Out-of-range numbers are discarded, not clamped.
    let score: u8 = captures.get(1)?.as_str().parse().ok()?;
    (score <= 10).then_some(score)
}

fn extract_bleeding(text: &str) -> Option<bool> {
    if BLEEDING_YES.is_match(text) {
        Some(true)
    } else if BLEEDING_NO.is_match(text) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_pain_after_keyword() {
        let parsed = parse_patient_response("Pain level 8, some bleeding", 3);
        assert_eq!(parsed.pain_score, Some(8));
    }

    #[test]
    fn extracts_leading_number_without_keyword() {
        let parsed = parse_patient_response("7, no new bleeding today", 2);
        assert_eq!(parsed.pain_score, Some(7));
    }

    #[test]
    fn out_of_range_score_is_discarded() {
        let parsed = parse_patient_response("pain is 15 today", 2);
        assert_eq!(parsed.pain_score, None);
    }

    #[test]
    fn hurt_and_sore_also_anchor_the_score() {
        assert_eq!(
            parse_patient_response("it hurts about a 6", 4).pain_score,
            Some(6)
        );
        assert_eq!(
            parse_patient_response("sore today, maybe 3", 4).pain_score,
            Some(3)
        );
    }

    #[test]
    fn bleeding_yes_from_whole_words() {
        assert_eq!(
            parse_patient_response("there is some blood", 1).bleeding,
            Some(true)
        );
        assert_eq!(parse_patient_response("yes", 1).bleeding, Some(true));
    }

    #[test]
    fn bleeding_no_from_negations() {
        assert_eq!(parse_patient_response("no", 1).bleeding, Some(false));
        assert_eq!(
            parse_patient_response("none at all today", 1).bleeding,
            Some(false)
        );
    }

    #[test]
    fn yes_wins_over_no_when_both_match() {
        // "not bleeding" contains the affirmative whole word "bleeding";
        // the affirmative set is checked first, matching the source policy.
        assert_eq!(
            parse_patient_response("not bleeding", 1).bleeding,
            Some(true)
        );
    }

    #[test]
    fn unknown_when_not_mentioned() {
        assert_eq!(
            parse_patient_response("feeling okay today", 1).bleeding,
            None
        );
    }

    #[test]
    fn concerns_retain_full_normalized_text() {
        let parsed =
            parse_patient_response("Pain level 8, some bleeding, worried about swelling", 3);
        assert_eq!(
            parsed.concerns,
            "pain level 8, some bleeding, worried about swelling"
        );
        assert_eq!(parsed.pain_score, Some(8));
        assert_eq!(parsed.bleeding, Some(true));
    }

    #[test]
    fn empty_message_yields_empty_observation() {
        let parsed = parse_patient_response("   ", 0);
        assert_eq!(parsed.pain_score, None);
        assert_eq!(parsed.bleeding, None);
        assert_eq!(parsed.concerns, "");
    }
}
