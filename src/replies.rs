//! Outbound message templates. Every function here is a pure function of
//! (triage level, flags, day-index, first name) — no clock, no store, no
//! gateway — so the exact patient-facing wording is locked down by tests.

use crate::models::risk::flags;
use crate::models::RiskLevel;

/// Day-keyed recovery tips for routine replies. `day` here is 1-based
/// (day-index + 1), matching the wording "Day N".
const RECOVERY_TIPS: &[(i64, &str)] = &[
    (1, " Keep head elevated, ice regularly, and rest."),
    (2, " Peak swelling is normal. Continue icing and stay hydrated."),
    (3, " Swelling should start improving. Light walks are okay."),
    (4, " You might feel more energy returning. Don't overdo it yet."),
    (5, " Most patients feel significantly better by now."),
    (7, " Week 1 complete! You're doing great."),
    (10, " Most restrictions are lifting. Follow your doctor's guidance."),
    (14, " Two weeks post-op! Most patients feel nearly normal."),
];

/// Day-indexed intro lines for the daily check-in prompt.
const CHECKIN_INTROS: &[(i64, &str)] = &[
    (1, "Hope you rested well."),
    (2, "Some swelling is normal today."),
    (3, "Peak swelling typically occurs around now."),
    (4, "You should start feeling a bit better."),
    (5, "Most patients see improvement by now."),
    (6, "Almost one week - great progress!"),
    (7, "One week milestone reached!"),
    (10, "You're doing great - keep it up!"),
    (14, "Final check-in - congratulations on your recovery!"),
];

const THREE_QUESTIONS: &str = "1. Pain level 0-10?\n2. Any new bleeding/swelling? (YES/NO)\n3. Any concerns?";

/// Fixed reply for senders with no active monitoring program. Produced
/// without creating any clinical record.
pub const COURTESY_REPLY: &str = "Thank you for your message. We don't have an active \
monitoring program for this number. Please contact your clinic directly if you need assistance.";

pub struct ReplyTemplates;

impl ReplyTemplates {
    /// Auto-reply to a processed check-in response.
    pub fn auto_reply(
        level: RiskLevel,
        reply_flags: &[String],
        day_index: i64,
        first_name: &str,
    ) -> String {
        match level {
            RiskLevel::Urgent => Self::urgent_reply(reply_flags, day_index, first_name),
            RiskLevel::ReviewToday => Self::review_reply(reply_flags, day_index, first_name),
            RiskLevel::Routine | RiskLevel::Low => Self::routine_reply(day_index, first_name),
        }
    }

    fn urgent_reply(reply_flags: &[String], day_index: i64, first_name: &str) -> String {
        let day = day_index + 1;
        let mut message = format!("\u{1f6a8} Hi {first_name}, thank you for your Day {day} update. ");

        let has = |f: &str| reply_flags.iter().any(|x| x == f);
        let mut symptoms: Vec<&str> = Vec::new();
        if has(flags::SEVERE_PAIN) || has(flags::PAIN_HIGH) {
            symptoms.push("severe pain");
        }
        if has(flags::HEAVY_BLEEDING) || has(flags::UNCONTROLLED_BLEEDING) {
            symptoms.push("heavy bleeding");
        }
        if has(flags::FEVER_REPORTED) || has(flags::HIGH_FEVER) || has(flags::FEVER_HIGH) {
            symptoms.push("fever");
        }
        if has(flags::CONCERNING_SYMPTOMS) {
            symptoms.push("concerning symptoms");
        }

        if !symptoms.is_empty() {
            message.push_str(&format!(
                "Your symptoms ({}) need medical attention. ",
                symptoms.join(", ")
            ));
        }

        message.push_str(
            "**PLEASE CONTACT YOUR DOCTOR IMMEDIATELY** or visit urgent care. \
             Our medical team has been alerted. If you feel unsafe, go to the ER right away.",
        );
        message
    }

    fn review_reply(reply_flags: &[String], day_index: i64, first_name: &str) -> String {
        let day = day_index + 1;
        let mut message = format!("\u{26a0}\u{fe0f} Hi {first_name}, thank you for your Day {day} update. ");

        let has = |f: &str| reply_flags.iter().any(|x| x == f);
        if has(flags::HIGH_PAIN) || has(flags::MODERATE_PAIN) || has(flags::PAIN_MODERATE) {
            message.push_str(&format!(
                "Moderate pain on Day {day} can be normal, but please monitor it. \
                 Take your pain medication as prescribed and apply ice 20 min on/20 min off. "
            ));
        }
        if has(flags::ACTIVE_BLEEDING) {
            message.push_str("Some light bleeding can be normal, but keep an eye on it. ");
        }
        if has(flags::WORSENING_SWELLING) || has(flags::SWELLING_INCREASED) {
            message.push_str("Monitor swelling - keep head elevated and continue icing. ");
        }

        message.push_str(
            "**Your doctor will review this update today** and may contact you. \
             Call if symptoms worsen.",
        );
        message
    }

    fn routine_reply(day_index: i64, first_name: &str) -> String {
        let day = day_index + 1;
        let mut message =
            format!("\u{2705} Hi {first_name}, great job with your Day {day} check-in! ");

        message.push_str(if day <= 2 {
            "Your recovery sounds normal for early post-op. Rest is your best medicine right now."
        } else if day <= 5 {
            "You're doing well! This sounds like typical healing progress."
        } else if day <= 10 {
            "Excellent progress! You're well on your way to full recovery."
        } else {
            "Outstanding! You're in the final stretch of recovery."
        });

        let tip = RECOVERY_TIPS
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, tip)| *tip)
            .unwrap_or(" Keep following your post-op instructions.");
        message.push_str(tip);

        message.push_str(" **No action needed** - continue your current care routine. \u{1f31f}");
        message
    }

    /// Daily check-in prompt. Day 0 gets the welcome-and-orientation
    /// template; later days get a day-specific intro over the same
    /// 3-question block.
    pub fn daily_checkin(first_name: &str, day_index: i64) -> String {
        if day_index == 0 {
            return format!(
                "Hi {first_name}! I'm your recovery companion. Each day I'll ask 3 quick \
                 questions to help monitor your healing. Let's start:\n\n{THREE_QUESTIONS}\n\n\
                 Reply STOP to opt out anytime."
            );
        }

        let intro = CHECKIN_INTROS
            .iter()
            .find(|(d, _)| *d == day_index)
            .map(|(_, intro)| *intro)
            .unwrap_or("How are you feeling today?");

        format!(
            "Hi {first_name}! Day {day_index} check-in. {intro}\n\n{THREE_QUESTIONS}\n\n\
             You can reply with all answers in one message or separately."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgent_reply_names_matched_symptoms() {
        let reply = ReplyTemplates::auto_reply(
            RiskLevel::Urgent,
            &[flags::SEVERE_PAIN.into(), flags::FEVER_REPORTED.into()],
            3,
            "Maya",
        );
        assert!(reply.contains("Hi Maya"));
        assert!(reply.contains("Day 4"));
        assert!(reply.contains("severe pain, fever"));
        assert!(reply.contains("CONTACT YOUR DOCTOR IMMEDIATELY"));
    }

    #[test]
    fn urgent_reply_without_known_flags_still_escalates() {
        let reply = ReplyTemplates::auto_reply(RiskLevel::Urgent, &[], 1, "Ana");
        assert!(!reply.contains("Your symptoms ("));
        assert!(reply.contains("urgent care"));
    }

    #[test]
    fn review_reply_conditions_self_care_on_flags() {
        let reply = ReplyTemplates::auto_reply(
            RiskLevel::ReviewToday,
            &[flags::HIGH_PAIN.into(), flags::ACTIVE_BLEEDING.into()],
            2,
            "Sam",
        );
        assert!(reply.contains("ice 20 min on/20 min off"));
        assert!(reply.contains("light bleeding can be normal"));
        assert!(reply.contains("review this update today"));
    }

    #[test]
    fn routine_reply_uses_day_tip_table() {
        let reply = ReplyTemplates::auto_reply(RiskLevel::Routine, &[], 1, "Kim");
        assert!(reply.contains("Day 2"));
        assert!(reply.contains("Peak swelling is normal."));
        assert!(reply.contains("No action needed"));
    }

    #[test]
    fn routine_reply_falls_back_to_generic_tip() {
        // Day-index 5 -> Day 6, which has no entry in the tip table.
        let reply = ReplyTemplates::auto_reply(RiskLevel::Low, &[], 5, "Kim");
        assert!(reply.contains("Keep following your post-op instructions."));
    }

    #[test]
    fn day_zero_checkin_is_the_welcome_template() {
        let prompt = ReplyTemplates::daily_checkin("Maya", 0);
        assert!(prompt.contains("recovery companion"));
        assert!(prompt.contains("Pain level 0-10?"));
        assert!(prompt.contains("Reply STOP"));
    }

    #[test]
    fn later_checkins_use_day_intro_with_fallback() {
        let day3 = ReplyTemplates::daily_checkin("Maya", 3);
        assert!(day3.contains("Day 3 check-in"));
        assert!(day3.contains("Peak swelling typically occurs around now."));

        let day8 = ReplyTemplates::daily_checkin("Maya", 8);
        assert!(day8.contains("How are you feeling today?"));
        assert!(day8.contains("Pain level 0-10?"));
    }

    #[test]
    fn courtesy_reply_mentions_no_active_program() {
        assert!(COURTESY_REPLY.contains("active monitoring program"));
    }
}
