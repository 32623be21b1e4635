use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

mod handlers {
    pub mod call_handlers;
    pub mod lead_handlers;
}
mod api {
    pub mod emailjs;
    pub mod retell;
}
mod models {
    pub mod lead_models;
}
mod config {
    pub mod countries;
    pub mod environment;
}
mod utils {
    pub mod phone;
    pub mod rate_limit;
    pub mod spam;
    pub mod validation;
}

use api::emailjs::{EmailJsConfig, EmailJsDispatcher, EmailSender};
use api::retell::{CallTrigger, RetellConfig, RetellDispatcher};
use config::environment::Environment;
use handlers::{call_handlers, lead_handlers};
use utils::rate_limit::{FileStore, PhoneRateLimiter};

pub struct AppState {
    pub email_sender: Arc<dyn EmailSender>,
    pub call_trigger: Arc<dyn CallTrigger>,
    pub rate_limiter: PhoneRateLimiter,
}

async fn health_check() -> &'static str {
    "OK"
}

pub fn validate_env() {
    let _ = std::env::var("ENVIRONMENT") // 'development' for dev, anything else for prod
        .expect("ENVIRONMENT must be set");
    let _ = std::env::var("RETELL_API_KEY").expect("RETELL_API_KEY must be set");
    let _ = std::env::var("RETELL_AGENT_ID").expect("RETELL_AGENT_ID must be set");
    let _ = std::env::var("RETELL_FROM_NUMBER").expect("RETELL_FROM_NUMBER must be set");
    let _ = std::env::var("CONTACT_EMAIL").expect("CONTACT_EMAIL must be set");
    // EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID and EMAILJS_PUBLIC_KEY may be
    // unset in development; production dispatches fail loudly without them.
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    validate_env();

    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let environment = Environment::from_env();
    let to_email = std::env::var("CONTACT_EMAIL").expect("CONTACT_EMAIL must be set");

    let email_config = EmailJsConfig::from_env();
    if email_config.is_none() && !environment.is_development() {
        tracing::warn!("EmailJS configuration missing; lead emails will fail until it is set");
    }
    let email_sender: Arc<dyn EmailSender> =
        Arc::new(EmailJsDispatcher::new(email_config, to_email, environment));
    let call_trigger: Arc<dyn CallTrigger> =
        Arc::new(RetellDispatcher::new(RetellConfig::from_env()));

    let storage_dir = std::env::var("STORAGE_DIR").unwrap_or_else(|_| "storage".to_string());
    let rate_limiter = PhoneRateLimiter::new(Arc::new(FileStore::new(storage_dir)));

    let state = Arc::new(AppState {
        email_sender,
        call_trigger,
        rate_limiter,
    });

    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/countries", get(lead_handlers::list_countries))
        .route("/api/phone/format", get(lead_handlers::preview_phone))
        .route("/api/leads", post(lead_handlers::submit_lead))
        .route("/api/calls", post(call_handlers::trigger_call))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_origin(Any)
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .with_state(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .unwrap();
    tracing::info!("leadcall listening on 127.0.0.1:{}", port);
    axum::serve(listener, app.into_make_service()).await.unwrap();
}
