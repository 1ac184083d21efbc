use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::mail::models::SendEmailCommand;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn send_email(
    State(state): State<AppState>,
    Extension(authenticated): Extension<AuthenticatedUser>,
    body: Result<Json<SendEmailRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<SendEmailResponseData>, ApiError> {
    let Json(body) = body?;

    let command = SendEmailCommand::new(
        &body.to,
        &body.subject,
        &body.body,
        body.reply_to.as_deref(),
    )?;

    state
        .mail_service
        .send_email(&authenticated.user.id, command)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, SendEmailResponseData { status: "sent" }))
}

/// HTTP request body for sending an e-mail (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendEmailRequestBody {
    #[serde(default)]
    to: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    reply_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendEmailResponseData {
    pub status: &'static str,
}
