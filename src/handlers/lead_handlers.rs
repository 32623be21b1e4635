use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::api::emailjs::GENERIC_FAILURE_MESSAGE;
use crate::api::retell::spawn_call;
use crate::config::countries::COUNTRY_CALLING_CODES;
use crate::models::lead_models::{LeadPayload, LeadSubmission};
use crate::utils::{phone, spam, validation};
use crate::AppState;

/// Country calling codes for the contact form's selector.
pub async fn list_countries() -> Json<Value> {
    Json(json!({ "countries": &*COUNTRY_CALLING_CODES }))
}

#[derive(Deserialize)]
pub struct PhonePreviewQuery {
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_preview_code")]
    pub country_code: String,
}

fn default_preview_code() -> String {
    "+1".to_string()
}

/// Live display mask for the phone input. The form calls this as the user
/// types so the grouping rules live in one place.
pub async fn preview_phone(Query(query): Query<PhonePreviewQuery>) -> Json<Value> {
    let formatted = phone::format_for_display(&query.phone, &query.country_code);
    let dialable = if formatted.is_empty() {
        String::new()
    } else {
        phone::to_dialable(&formatted, &query.country_code)
    };
    Json(json!({ "formatted": formatted, "dialable": dialable }))
}

pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LeadPayload>,
) -> (StatusCode, Json<Value>) {
    process_submission(&state, payload).await
}

/// The whole pipeline: validate, honeypot, content scan, rate limit, email
/// dispatch, then the fire-and-forget call trigger. Split out of the axum
/// handler so tests can drive it with fake dispatchers.
pub(crate) async fn process_submission(
    state: &AppState,
    payload: LeadPayload,
) -> (StatusCode, Json<Value>) {
    if let Err(e) = validation::validate(&payload) {
        return reject(StatusCode::BAD_REQUEST, &e.to_string());
    }

    // Policy rejections get the generic message on purpose; telling a bot
    // which tripwire it hit just trains it.
    if !spam::validate_honeypot(&payload.website) {
        warn!("honeypot field populated, dropping submission");
        return reject(StatusCode::BAD_REQUEST, GENERIC_FAILURE_MESSAGE);
    }
    if spam::detect_suspicious_activity(&payload.name, &payload.message) {
        warn!("suspicious content detected, dropping submission");
        return reject(StatusCode::BAD_REQUEST, GENERIC_FAILURE_MESSAGE);
    }

    let digits = phone::digits_only(&payload.phone);
    let dialable = if digits.is_empty() {
        String::new()
    } else {
        phone::to_dialable(&payload.phone, &payload.country_code)
    };

    if !dialable.is_empty() {
        let decision = state.rate_limiter.can_submit(&dialable);
        if !decision.allowed {
            warn!(
                "rate limit exceeded for {} ({} submissions today)",
                dialable,
                decision.count.unwrap_or(0)
            );
            let message = decision
                .reason
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
            return reject(StatusCode::TOO_MANY_REQUESTS, &message);
        }
    }

    let lead = LeadSubmission {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        phone: dialable.clone(),
        message: payload.message.trim().to_string(),
    };

    let outcome = state.email_sender.send(&lead).await;
    if !outcome.success {
        return reject(StatusCode::BAD_GATEWAY, &outcome.message);
    }

    if !dialable.is_empty() {
        state.rate_limiter.record_submission(&dialable);
        spawn_call(state.call_trigger.clone(), lead);
    }

    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": outcome.message })),
    )
}

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "success": false, "message": message })))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::api::emailjs::{EmailSender, THANK_YOU_MESSAGE};
    use crate::api::retell::CallTrigger;
    use crate::models::lead_models::{CallOutcome, EmailOutcome};
    use crate::utils::rate_limit::{MemoryStore, PhoneRateLimiter};

    struct FakeEmailSender {
        succeed: bool,
        sent: Mutex<Vec<LeadSubmission>>,
    }

    #[async_trait]
    impl EmailSender for FakeEmailSender {
        async fn send(&self, lead: &LeadSubmission) -> EmailOutcome {
            self.sent.lock().unwrap().push(lead.clone());
            if self.succeed {
                EmailOutcome {
                    success: true,
                    message: THANK_YOU_MESSAGE.to_string(),
                }
            } else {
                EmailOutcome {
                    success: false,
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                }
            }
        }
    }

    struct FakeCallTrigger {
        fail: bool,
        calls: Mutex<Vec<LeadSubmission>>,
    }

    #[async_trait]
    impl CallTrigger for FakeCallTrigger {
        async fn trigger_call(&self, lead: &LeadSubmission) -> anyhow::Result<CallOutcome> {
            self.calls.lock().unwrap().push(lead.clone());
            if self.fail {
                anyhow::bail!("provider exploded");
            }
            Ok(CallOutcome {
                call_id: "call_123".to_string(),
                message: "Call initiated successfully".to_string(),
            })
        }
    }

    fn test_state(
        email_succeeds: bool,
        call_fails: bool,
    ) -> (Arc<FakeEmailSender>, Arc<FakeCallTrigger>, AppState) {
        let email = Arc::new(FakeEmailSender {
            succeed: email_succeeds,
            sent: Mutex::new(Vec::new()),
        });
        let call = Arc::new(FakeCallTrigger {
            fail: call_fails,
            calls: Mutex::new(Vec::new()),
        });
        let state = AppState {
            email_sender: email.clone(),
            call_trigger: call.clone(),
            rate_limiter: PhoneRateLimiter::new(Arc::new(MemoryStore::new())),
        };
        (email, call, state)
    }

    fn jane_doe() -> LeadPayload {
        LeadPayload {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: "(469) 555-1234".to_string(),
            country_code: "+1".to_string(),
            message: "Interested in your service".to_string(),
            website: String::new(),
        }
    }

    // Lets the spawned call task run before the test inspects the fakes.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_happy_path_end_to_end() {
        let (email, call, state) = test_state(true, false);

        let (status, Json(body)) = process_submission(&state, jane_doe()).await;
        settle().await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], THANK_YOU_MESSAGE);

        let sent = email.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].phone, "+14695551234");

        let calls = call.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "Jane Doe");
        assert_eq!(calls[0].phone, "+14695551234");

        assert_eq!(state.rate_limiter.submission_count("+14695551234"), 1);
    }

    #[tokio::test]
    async fn test_call_failure_never_touches_email_outcome() {
        let (_, call, state) = test_state(true, true);

        let (status, Json(body)) = process_submission(&state, jane_doe()).await;
        settle().await;

        // The trigger ran and failed, yet the user still sees success.
        assert_eq!(call.calls.lock().unwrap().len(), 1);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_validation_failure_stops_pipeline() {
        let (email, call, state) = test_state(true, false);
        let mut payload = jane_doe();
        payload.name = "   ".to_string();

        let (status, Json(body)) = process_submission(&state, payload).await;
        settle().await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Please enter your name.");
        assert!(email.sent.lock().unwrap().is_empty());
        assert!(call.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_honeypot_rejection_is_generic() {
        let (email, _, state) = test_state(true, false);
        let mut payload = jane_doe();
        payload.website = "http://filled.by.bot".to_string();

        let (status, Json(body)) = process_submission(&state, payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        // No hint about the honeypot in the message.
        assert_eq!(body["message"], GENERIC_FAILURE_MESSAGE);
        assert!(email.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_suspicious_content_rejected() {
        let (email, _, state) = test_state(true, false);
        let mut payload = jane_doe();
        payload.message = "Buy backlinks at https://spam.example".to_string();

        let (status, Json(body)) = process_submission(&state, payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], GENERIC_FAILURE_MESSAGE);
        assert!(email.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited_submission_rejected() {
        let (email, _, state) = test_state(true, false);
        state.rate_limiter.record_submission("+14695551234");
        state.rate_limiter.record_submission("+14695551234");

        let (status, Json(body)) = process_submission(&state, jane_doe()).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("daily submission limit"));
        assert!(email.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_email_failure_skips_call_and_record() {
        let (email, call, state) = test_state(false, false);

        let (status, Json(body)) = process_submission(&state, jane_doe()).await;
        settle().await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert_eq!(email.sent.lock().unwrap().len(), 1);
        assert!(call.calls.lock().unwrap().is_empty());
        assert_eq!(state.rate_limiter.submission_count("+14695551234"), 0);
    }

    #[tokio::test]
    async fn test_missing_phone_sends_email_without_call() {
        let (email, call, state) = test_state(true, false);
        let mut payload = jane_doe();
        payload.phone = String::new();

        let (status, _) = process_submission(&state, payload).await;
        settle().await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(email.sent.lock().unwrap()[0].phone, "");
        assert!(call.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_phone_preview_round_trip() {
        let Json(body) = preview_phone(Query(PhonePreviewQuery {
            phone: "4695551234".to_string(),
            country_code: "+1".to_string(),
        }))
        .await;
        assert_eq!(body["formatted"], "(469) 555-1234");
        assert_eq!(body["dialable"], "+14695551234");
    }

    #[tokio::test]
    async fn test_country_list_served() {
        let Json(body) = list_countries().await;
        let countries = body["countries"].as_array().unwrap();
        assert!(countries.iter().any(|c| c["code"] == "+44"));
    }
}
