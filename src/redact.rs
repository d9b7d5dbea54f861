//! Redaction helpers for log output. Phone numbers and message bodies are
//! patient data; nothing goes to the log unredacted.

/// Mask the tail of a phone number, keeping enough of the prefix to
/// correlate log lines. E.164 US numbers keep country code + area code.
/// Counts characters, not bytes: the sender value arrives from the wire
/// unvalidated and may contain anything.
pub fn redact_phone(phone: &str) -> String {
    let len = phone.chars().count();
    if len < 10 {
        return phone.to_string();
    }

    // +1 E.164, e.g. +18015550101 -> +1801***
    let visible = if phone.starts_with("+1") && len == 12 {
        5
    } else {
        usize::min(7, len.saturating_sub(3))
    };

    let prefix: String = phone.chars().take(visible).collect();
    format!("{prefix}***")
}

/// Truncate a message body for logging. Short bodies pass through.
pub fn redact_body(body: &str) -> String {
    const MAX: usize = 60;
    if body.chars().count() <= MAX {
        return body.to_string();
    }
    let truncated: String = body.chars().take(MAX).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn e164_us_number_masked_after_area_code() {
        assert_eq!(redact_phone("+18015550101"), "+1801***");
    }

    #[test]
    fn short_values_pass_through() {
        assert_eq!(redact_phone("12345"), "12345");
        assert_eq!(redact_body("hi"), "hi");
    }

    #[test]
    fn long_body_truncated_with_ellipsis() {
        let body = "a".repeat(100);
        let redacted = redact_body(&body);
        assert!(redacted.starts_with(&"a".repeat(60)));
        assert!(redacted.ends_with('…'));
    }

    #[test]
    fn non_us_number_keeps_seven_chars() {
        assert_eq!(redact_phone("+447911123456"), "+447911***");
    }

    #[test]
    fn multibyte_sender_is_masked_without_panic() {
        // 12 characters, multibyte from position 2 on. Wire input is not
        // validated before it reaches the log path.
        assert_eq!(redact_phone("+1αβγδεζηθικ"), "+1αβγ***");
        // 7 characters but 12 bytes; too short to mask, passes through.
        assert_eq!(redact_phone("+1ααααα"), "+1ααααα");
    }
}
