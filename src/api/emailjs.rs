use std::env;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::environment::Environment;
use crate::models::lead_models::{EmailOutcome, LeadSubmission};

const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

pub const THANK_YOU_MESSAGE: &str =
    "Thank you for your message! We will get back to you soon.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, there was an error sending your message. Please try again later.";

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, lead: &LeadSubmission) -> EmailOutcome;
}

#[derive(Clone, Debug)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl EmailJsConfig {
    /// None when any of the three EmailJS values is unset. Development runs
    /// fine without them; production logs a configuration error per send.
    pub fn from_env() -> Option<Self> {
        Some(EmailJsConfig {
            service_id: env::var("EMAILJS_SERVICE_ID").ok()?,
            template_id: env::var("EMAILJS_TEMPLATE_ID").ok()?,
            public_key: env::var("EMAILJS_PUBLIC_KEY").ok()?,
        })
    }
}

pub struct EmailJsDispatcher {
    client: Client,
    config: Option<EmailJsConfig>,
    to_email: String,
    environment: Environment,
}

impl EmailJsDispatcher {
    pub fn new(config: Option<EmailJsConfig>, to_email: String, environment: Environment) -> Self {
        EmailJsDispatcher {
            client: Client::new(),
            config,
            to_email,
            environment,
        }
    }

    fn failure() -> EmailOutcome {
        EmailOutcome {
            success: false,
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    fn success() -> EmailOutcome {
        EmailOutcome {
            success: true,
            message: THANK_YOU_MESSAGE.to_string(),
        }
    }
}

#[async_trait]
impl EmailSender for EmailJsDispatcher {
    async fn send(&self, lead: &LeadSubmission) -> EmailOutcome {
        let config = match &self.config {
            Some(config) => config,
            None if self.environment.is_development() => {
                warn!("EmailJS configuration missing; development mode simulates a successful send");
                return Self::success();
            }
            None => {
                error!(
                    "EmailJS configuration missing; set EMAILJS_SERVICE_ID, \
                     EMAILJS_TEMPLATE_ID and EMAILJS_PUBLIC_KEY"
                );
                return Self::failure();
            }
        };

        let body = json!({
            "service_id": config.service_id,
            "template_id": config.template_id,
            "user_id": config.public_key,
            "template_params": {
                "from_name": lead.name,
                "from_email": lead.email,
                "phone": lead.phone,
                "message": lead.message,
                "to_email": self.to_email,
            }
        });

        match self.client.post(EMAILJS_SEND_URL).json(&body).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!("lead email dispatched for {}", lead.email);
                Self::success()
            }
            Ok(response) => {
                error!("EmailJS rejected the send with status {}", response.status());
                Self::failure()
            }
            Err(e) => {
                error!("EmailJS request failed: {}", e);
                Self::failure()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead() -> LeadSubmission {
        LeadSubmission {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: "+14695551234".to_string(),
            message: "Interested in your service".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_config_simulates_success_in_development() {
        let dispatcher = EmailJsDispatcher::new(
            None,
            "leads@example.com".to_string(),
            Environment::Development,
        );
        let outcome = dispatcher.send(&lead()).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, THANK_YOU_MESSAGE);
    }

    #[tokio::test]
    async fn test_missing_config_fails_in_production() {
        let dispatcher = EmailJsDispatcher::new(
            None,
            "leads@example.com".to_string(),
            Environment::Production,
        );
        let outcome = dispatcher.send(&lead()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, GENERIC_FAILURE_MESSAGE);
    }
}
