//! Error kinds returned by the auth handlers and the middleware that turns
//! propagated errors into JSON responses.
//!
//! Validation, conflict and unknown-login failures are answered directly by
//! the handler. Everything else is tagged with an [`ErrorReport`] and left for
//! [`handle_errors`] to log and format, so those failures are logged in one
//! place with one shape.

use super::context::DeploymentMode;
use crate::directory::DirectoryError;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{error::Error as StdError, fmt::Write};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

pub const INTERNAL_ERROR_MESSAGE: &str = "Внутренняя ошибка сервера";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Неверные учетные данные";
pub const USER_EXISTS_MESSAGE: &str = "Пользователь уже существует";

/// Body of every failed response.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    #[schema(example = false)]
    pub ok: bool,
    #[schema(example = "Неправильные данные")]
    pub message: String,
    /// Error cause chain, development mode and status 500 only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            stack: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("login already registered")]
    Conflict,

    #[error("unknown login")]
    UnknownLogin,

    #[error("wrong password")]
    WrongPassword,

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::UnknownLogin | Self::WrongPassword => StatusCode::UNAUTHORIZED,
            Self::Directory(DirectoryError::Remote { status, .. }) => StatusCode::from_u16(*status)
                .ok()
                .filter(|status| status.is_client_error() || status.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Directory(DirectoryError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Both 401 cases share one message so the
    /// response does not reveal which half of the credentials was wrong.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation(message) => (*message).to_string(),
            Self::Conflict => USER_EXISTS_MESSAGE.to_string(),
            Self::UnknownLogin | Self::WrongPassword => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Self::Directory(DirectoryError::Remote { body, .. }) => {
                upstream_message(body).unwrap_or_else(|| self.to_string())
            }
            Self::Directory(err) => {
                let message = err.to_string();
                if message.is_empty() {
                    INTERNAL_ERROR_MESSAGE.to_string()
                } else {
                    message
                }
            }
        }
    }

    /// Whether the error is handed to [`handle_errors`] instead of being
    /// answered by the handler itself.
    #[must_use]
    pub const fn is_propagated(&self) -> bool {
        matches!(self, Self::WrongPassword | Self::Directory(_))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        if !self.is_propagated() {
            return (status, Json(ErrorBody::new(self.client_message()))).into_response();
        }

        let report = ErrorReport {
            message: self.client_message(),
            reason: self.to_string(),
            detail: error_chain(&self),
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Attached to responses whose body still has to be written by
/// [`handle_errors`].
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub reason: String,
    pub detail: String,
}

/// Message carried by an upstream error body.
///
/// Looks at `response.data.message` then `response.data.error` when a
/// `response.data` object exists, otherwise at `data.message`.
#[must_use]
pub fn upstream_message(body: &Value) -> Option<String> {
    let non_empty = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(data) = body.pointer("/response/data") {
        return non_empty(data.get("message")).or_else(|| non_empty(data.get("error")));
    }

    non_empty(body.pointer("/data/message"))
}

fn error_chain(err: &dyn StdError) -> String {
    let mut chain = format!("{err:?}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(chain, "\ncaused by: {cause}");
        source = cause.source();
    }
    chain
}

/// Formats and logs errors propagated by the handlers.
///
/// Responses without an [`ErrorReport`] already carry their final body and
/// are passed through untouched.
pub async fn handle_errors(
    State(mode): State<DeploymentMode>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    let status = response.status();

    if mode.is_development() {
        error!(
            status = status.as_u16(),
            message = %report.message,
            reason = %report.reason,
            path = %path,
            method = %method,
            stack = %report.detail,
            "API error"
        );
    } else {
        error!(
            status = status.as_u16(),
            message = %report.message,
            reason = %report.reason,
            path = %path,
            method = %method,
            "API error"
        );
    }

    let body = ErrorBody {
        ok: false,
        message: report.message,
        stack: (mode.is_development() && status == StatusCode::INTERNAL_SERVER_ERROR)
            .then_some(report.detail),
    };

    let (parts, _) = response.into_parts();
    (parts, Json(body)).into_response()
}
