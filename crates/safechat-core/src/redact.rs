//! Scrubs credentials from text before it reaches the log file.

use std::sync::LazyLock;

use regex::Regex;

static QUERY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([?&](?:key|api_key)=)[^&\s)]+").unwrap());
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[A-Za-z0-9\-._~+/]+=*").unwrap());
static SECRET_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:sk-[A-Za-z0-9_\-]{16,}|AIza[0-9A-Za-z_\-]{30,})").unwrap());

pub fn redact_secrets(input: &str) -> String {
    let redacted = QUERY_KEY_RE.replace_all(input, "${1}[REDACTED]");
    let redacted = BEARER_RE.replace_all(&redacted, "Bearer [REDACTED]");
    SECRET_KEY_RE
        .replace_all(&redacted, "[REDACTED_KEY]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_query_key() {
        let raw = "error sending request for url (https://example.com/v1/models/x:generateContent?key=abc123&alt=json)";
        let clean = redact_secrets(raw);
        assert!(!clean.contains("abc123"));
        assert!(clean.contains("?key=[REDACTED]&alt=json"));
    }

    #[test]
    fn test_redacts_tokens() {
        let raw = "sent Bearer eyJhbGciOiJIUzI1NiJ9 and sk-abcdefghijklmnopqrstuvwx";
        let clean = redact_secrets(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert!(!clean.contains("sk-abcdefghijklmnopqrstuvwx"));
    }

    #[test]
    fn test_plain_text_untouched() {
        let raw = "Gemini API error 503: model overloaded";
        assert_eq!(redact_secrets(raw), raw);
    }
}
