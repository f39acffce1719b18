//! HTTP surface of the admissions assistant.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness acknowledgement |
//! | `GET`  | `/health` | Catalog and generator status |
//! | `POST` | `/whatsapp` | Twilio WhatsApp webhook, replies with TwiML |
//!
//! The webhook always answers `200` with a TwiML message once the form decodes; internal
//! failures turn into an apology message, never an error status.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::catalog::CatalogStore;
use crate::context::format_context;
use crate::responder::Responder;
use crate::search;
use crate::twiml;

pub const SERVICE_NAME: &str = "UAF WhatsApp Admissions Assistant";
pub const UNEXPECTED_APOLOGY: &str =
    "I'm sorry, an unexpected error occurred. Please try your question again.";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub responder: Arc<Responder>,
    pub gemini_configured: bool,
}

impl AppState {
    /// Retrieve, format and generate for one inbound message.
    pub async fn answer(&self, question: &str) -> String {
        let catalog = self.catalog.snapshot().await;
        let ranked = search::rank(question, &catalog);
        info!(programs = ranked.len(), "found relevant programs");
        let context = format_context(&ranked);
        self.responder.generate(question, &context).await
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/whatsapp", post(handle_whatsapp))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Fields Twilio posts for an inbound WhatsApp message (subset).
#[derive(Debug, Deserialize)]
struct InboundMessage {
    #[serde(rename = "From")]
    from: String,
    #[serde(rename = "Body")]
    body: String,
}

async fn handle_whatsapp(
    State(state): State<AppState>,
    Form(message): Form<InboundMessage>,
) -> Response {
    info!(from = %message.from, body = %message.body, "received message");

    let text = match AssertUnwindSafe(state.answer(&message.body))
        .catch_unwind()
        .await
    {
        Ok(text) => text,
        Err(panic) => {
            error!(
                from = %message.from,
                error = panic_message(panic.as_ref()),
                "unexpected error while answering message"
            );
            UNEXPECTED_APOLOGY.to_string()
        }
    };

    (
        [(header::CONTENT_TYPE, twiml::CONTENT_TYPE)],
        twiml::message_response(&text),
    )
        .into_response()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: String,
    status: &'static str,
}

async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{SERVICE_NAME} is running"),
        status: "healthy",
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    programs_loaded: bool,
    gemini_configured: bool,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        programs_loaded: state.catalog.is_loaded().await,
        gemini_configured: state.gemini_configured,
    })
}
