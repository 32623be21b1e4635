use serde::{Deserialize, Serialize};

fn default_country_code() -> String {
    "+1".to_string()
}

#[derive(Debug, Deserialize)]
pub struct LeadPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    pub message: String,
    // Honeypot. Hidden from humans by the form layout, so a non-empty
    // value means a bot filled it.
    #[serde(default)]
    pub website: String,
}

#[derive(Debug, Clone)]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub phone: String, // dialable form, e.g. +14695551234
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CallPayload {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub phone: String,
    pub timestamp: i64,
    pub date: String, // YYYY-MM-DD, local time
}

#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    pub count: Option<u32>,
}

impl RateLimitDecision {
    pub fn allow(count: Option<u32>) -> Self {
        RateLimitDecision {
            allowed: true,
            reason: None,
            count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailOutcome {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub call_id: String,
    pub message: String,
}
