use std::fmt;

use crate::models::lead_models::LeadPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    NameRequired,
    EmailRequired,
    EmailInvalid,
    MessageRequired,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ValidationError::NameRequired => "Please enter your name.",
            ValidationError::EmailRequired => "Please enter your email address.",
            ValidationError::EmailInvalid => "Please enter a valid email address.",
            ValidationError::MessageRequired => "Please enter a message.",
        };
        write!(f, "{}", msg)
    }
}

/// Checks run in order and the first failure wins; the form surfaces one
/// error at a time.
pub fn validate(payload: &LeadPayload) -> Result<(), ValidationError> {
    if payload.name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    // An @ is enough here; stricter shapes reject addresses that real
    // people actually use.
    if !email.contains('@') {
        return Err(ValidationError::EmailInvalid);
    }
    if payload.message.trim().is_empty() {
        return Err(ValidationError::MessageRequired);
    }
    Ok(())
}
