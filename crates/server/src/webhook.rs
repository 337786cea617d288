use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use retrobot_slack::commands::{CommandRouter, SlashCommandPayload};
use retrobot_slack::response::SlackResponse;
use retrobot_store::client::RecordStore;

use crate::retro::{store_unavailable_message, RetroService};
use crate::sweep::FollowUpNotifier;

/// Shared, read-only request state assembled once at bootstrap.
#[derive(Clone)]
pub struct AppState {
    pub slack_token: SecretString,
    pub setup_notice: Option<String>,
    pub store: Arc<dyn RecordStore>,
    pub notifier: Arc<dyn FollowUpNotifier>,
}

/// Form body of a slash-command notification. Every field defaults so a
/// malformed request degrades to a token mismatch instead of a 422.
#[derive(Debug, Deserialize)]
pub struct SlackNotification {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub response_url: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub configured: bool,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/handle_slack_notification", post(handle_slack_notification))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let status = match &state.setup_notice {
        Some(notice) => format!("❗️{notice}"),
        None => "✅".to_string(),
    };
    Html(format!(
        "Integration to store /retro Slack commands in a record store.<br>\n\
         Status: {status}<br>\n\
         Link the Slack webhook to post to /handle_slack_notification"
    ))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let configured = state.setup_notice.is_none();
    Json(HealthResponse {
        status: if configured { "ready" } else { "setup_required" },
        configured,
        checked_at: Utc::now().to_rfc3339(),
    })
}

async fn handle_slack_notification(
    State(state): State<AppState>,
    Form(notification): Form<SlackNotification>,
) -> Response {
    if let Some(notice) = &state.setup_notice {
        return (StatusCode::OK, notice.clone()).into_response();
    }

    if notification.token != state.slack_token.expose_secret() {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    info!(
        event_name = "retro.webhook.command_received",
        command = %notification.command,
        user_name = %notification.user_name,
        "slash command accepted"
    );

    let payload = SlashCommandPayload {
        command: notification.command,
        text: notification.text,
        user_name: notification.user_name,
        response_url: notification.response_url,
    };

    let command_router =
        CommandRouter::new(RetroService::new(state.store.clone(), state.notifier.clone()));
    match command_router.route(&payload).await {
        Ok(response) => Json(response).into_response(),
        Err(route_error) => {
            error!(
                event_name = "retro.webhook.route_failed",
                error = %route_error,
                "slash command routing failed"
            );
            Json(SlackResponse::broadcast(store_unavailable_message())).into_response()
        }
    }
}
