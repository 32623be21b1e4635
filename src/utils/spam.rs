use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(https?://|www\.)").unwrap());

// Tokens that show up in the junk this form attracts. Lowercase only;
// the scan lowercases its input.
const SPAM_TOKENS: &[&str] = &[
    "viagra",
    "cialis",
    "casino",
    "crypto",
    "bitcoin",
    "forex",
    "backlinks",
    "seo service",
    "seo services",
    "guest post",
    "loan approval",
    "work from home",
    "click here",
    "free money",
];

// Longest run of one repeated character we accept in free text.
const MAX_CHAR_RUN: usize = 6;

/// True when the hidden field is untouched. Humans never see it, so any
/// value means a bot filled the whole form.
pub fn validate_honeypot(value: &str) -> bool {
    value.trim().is_empty()
}

/// Heuristic scan over the free-text fields. Permissive on purpose:
/// missing a spammer is fine, blocking a real lead is not.
pub fn detect_suspicious_activity(name: &str, message: &str) -> bool {
    for text in [name, message] {
        if URL_PATTERN.is_match(text) {
            return true;
        }
        if has_long_char_run(text) {
            return true;
        }
        let lowered = text.to_lowercase();
        if SPAM_TOKENS.iter().any(|token| lowered.contains(token)) {
            return true;
        }
    }
    false
}

fn has_long_char_run(text: &str) -> bool {
    let mut run = 0usize;
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if c.is_whitespace() {
            run = 0;
            prev = None;
            continue;
        }
        if Some(c) == prev {
            run += 1;
        } else {
            run = 1;
            prev = Some(c);
        }
        if run > MAX_CHAR_RUN {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_honeypot_empty_passes() {
        assert!(validate_honeypot(""));
        assert!(validate_honeypot("   "));
    }

    #[test]
    fn test_honeypot_filled_fails() {
        assert!(!validate_honeypot("http://spam.example"));
        assert!(!validate_honeypot("x"));
    }

    #[test]
    fn test_clean_message_not_flagged() {
        assert!(!detect_suspicious_activity(
            "Jane Doe",
            "Interested in your service"
        ));
    }

    #[test]
    fn test_url_in_message_flagged() {
        assert!(detect_suspicious_activity("Jane", "visit https://spam.example now"));
        assert!(detect_suspicious_activity("Jane", "see www.spam.example"));
        assert!(detect_suspicious_activity("Jane", "HTTP://SHOUTY.EXAMPLE"));
    }

    #[test]
    fn test_repeated_characters_flagged() {
        assert!(detect_suspicious_activity("Jane", "aaaaaaaaaa"));
        // Whitespace runs are formatting, not spam.
        assert!(!detect_suspicious_activity("Jane", "Hello        world"));
    }

    #[test]
    fn test_denylist_token_flagged() {
        assert!(detect_suspicious_activity("Jane", "Cheap SEO Services for your site"));
        assert!(detect_suspicious_activity("CryptoKing", "hello"));
    }

    #[test]
    fn test_short_runs_allowed() {
        assert!(!detect_suspicious_activity("Jane", "soooo interested in this!"));
    }
}
