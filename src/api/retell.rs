use std::env;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::models::lead_models::{CallOutcome, LeadSubmission};
use crate::utils::phone::normalize_international;

const RETELL_CREATE_CALL_URL: &str = "https://api.retellai.com/v2/create-phone-call";

#[async_trait]
pub trait CallTrigger: Send + Sync {
    async fn trigger_call(&self, lead: &LeadSubmission) -> Result<CallOutcome>;
}

#[derive(Clone, Debug)]
pub struct RetellConfig {
    pub api_key: String,
    pub agent_id: String,
    pub from_number: String,
}

impl RetellConfig {
    pub fn from_env() -> Self {
        RetellConfig {
            api_key: env::var("RETELL_API_KEY").expect("RETELL_API_KEY must be set"),
            agent_id: env::var("RETELL_AGENT_ID").expect("RETELL_AGENT_ID must be set"),
            from_number: env::var("RETELL_FROM_NUMBER").expect("RETELL_FROM_NUMBER must be set"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatePhoneCallResponse {
    call_id: Option<String>,
}

pub struct RetellDispatcher {
    client: Client,
    config: RetellConfig,
}

impl RetellDispatcher {
    pub fn new(config: RetellConfig) -> Self {
        RetellDispatcher {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CallTrigger for RetellDispatcher {
    async fn trigger_call(&self, lead: &LeadSubmission) -> Result<CallOutcome> {
        // Bad numbers fail here, before any request leaves the box.
        let to_number = normalize_international(&lead.phone)?;

        // The agent interpolates these into its script as {{user_name}} etc.
        let mut dynamic_variables = serde_json::Map::new();
        if !lead.name.is_empty() {
            dynamic_variables.insert("user_name".to_string(), json!(lead.name));
        }
        if !lead.email.is_empty() {
            dynamic_variables.insert("user_email".to_string(), json!(lead.email));
        }
        dynamic_variables.insert("user_phone".to_string(), json!(to_number));
        if !lead.message.is_empty() {
            dynamic_variables.insert("user_message".to_string(), json!(lead.message));
        }

        let body = json!({
            "from_number": self.config.from_number,
            "to_number": to_number,
            "override_agent_id": self.config.agent_id,
            "retell_llm_dynamic_variables": dynamic_variables,
        });

        let response = self
            .client
            .post(RETELL_CREATE_CALL_URL)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Retell returned {}: {}", status, detail);
        }

        let parsed: CreatePhoneCallResponse = response.json().await?;
        match parsed.call_id {
            Some(call_id) => {
                info!("Retell call initiated: {}", call_id);
                Ok(CallOutcome {
                    call_id,
                    message: "Call initiated successfully".to_string(),
                })
            }
            None => anyhow::bail!("Retell response carried no call_id"),
        }
    }
}

/// Fire-and-forget call trigger. The submission outcome already shown to the
/// user never waits on this; a failure here ends up in the logs and nowhere
/// else.
pub fn spawn_call(trigger: Arc<dyn CallTrigger>, lead: LeadSubmission) {
    tokio::spawn(async move {
        match trigger.trigger_call(&lead).await {
            Ok(outcome) => info!("outbound call {} queued for {}", outcome.call_id, lead.phone),
            Err(e) => error!("failed to initiate outbound call: {:#}", e),
        }
    });
}
