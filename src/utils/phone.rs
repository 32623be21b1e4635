use std::fmt;

use crate::config::countries::DOMESTIC_CALLING_CODE;

// Longest number we render for non-domestic codes before truncating.
const MAX_INTERNATIONAL_DIGITS: usize = 12;
const DOMESTIC_DIGITS: usize = 10;
const MIN_DIALABLE_DIGITS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    TooShort,
    Invalid,
}

impl fmt::Display for PhoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneError::TooShort => {
                write!(f, "Invalid phone number format. Phone number is too short.")
            }
            PhoneError::Invalid => write!(
                f,
                "Invalid phone number format. Please use international format (e.g., +1234567890)."
            ),
        }
    }
}

impl std::error::Error for PhoneError {}

pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Display mask for the phone input, re-derived from the digit sequence on
/// every keystroke. Deriving from the previous display string instead would
/// compound punctuation when the country selection changes.
pub fn format_for_display(raw: &str, country_code: &str) -> String {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return String::new();
    }
    if country_code == DOMESTIC_CALLING_CODE {
        let digits = &digits[..digits.len().min(DOMESTIC_DIGITS)];
        match digits.len() {
            1..=3 => digits.to_string(),
            4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
            _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        }
    } else {
        let digits = &digits[..digits.len().min(MAX_INTERNATIONAL_DIGITS)];
        digits
            .as_bytes()
            .chunks(3)
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Canonical dialable string used at submit time: every non-digit in the
/// display value is dropped and the selected calling code is prepended.
pub fn to_dialable(display: &str, country_code: &str) -> String {
    format!("{}{}", country_code, digits_only(display))
}

/// Normalizes a raw number to international form for the telephony API.
/// Accepts `+`-prefixed numbers as-is, converts a leading `00` to `+`, and
/// assumes anything else is a bare national number.
pub fn normalize_international(raw: &str) -> Result<String, PhoneError> {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    let candidate = if stripped.starts_with('+') {
        stripped
    } else if let Some(rest) = stripped.strip_prefix("00") {
        format!("+{}", rest)
    } else {
        let digits = digits_only(&stripped);
        if digits.len() < MIN_DIALABLE_DIGITS {
            return Err(PhoneError::TooShort);
        }
        format!("+{}", digits)
    };

    let digit_count = candidate.chars().filter(|c| c.is_ascii_digit()).count();
    if !candidate.starts_with('+') || digit_count < MIN_DIALABLE_DIGITS {
        return Err(PhoneError::Invalid);
    }
    Ok(candidate)
}
