use crate::{
    api::{
        context::AppContext,
        error::{AuthError, ErrorBody},
    },
    directory::UserRecord,
};
use axum::{extract::Extension, Json};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

pub const INVALID_DATA_MESSAGE: &str = "Неправильные данные";
pub const CREDENTIALS_REQUIRED_MESSAGE: &str = "Логин и пароль обязательны";

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    #[schema(example = true)]
    pub ok: bool,
}

impl Ack {
    #[must_use]
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct RegisterRequest {
    /// Логин пользователя
    #[serde(default)]
    #[schema(required = true, example = "user123")]
    login: Option<String>,

    /// Email пользователя (опционально)
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Email, example = "user@example.com")]
    email: Option<Value>,

    /// Пароль пользователя
    #[serde(default)]
    #[schema(value_type = String, required = true, example = "password123")]
    password: Option<SecretString>,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct LoginRequest {
    /// Логин пользователя
    #[serde(default)]
    #[schema(required = true, example = "nikita")]
    login: Option<String>,

    /// Пароль пользователя
    #[serde(default)]
    #[schema(value_type = String, required = true, example = "123")]
    password: Option<SecretString>,
}

// Empty strings count as missing.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// Email is not validated; non-string values are dropped.
fn email(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(email)) => Some(email),
        _ => None,
    }
}

fn present_secret(value: Option<SecretString>) -> Option<SecretString> {
    value.filter(|v| !v.expose_secret().is_empty())
}

#[utoipa::path(
    post,
    path = "/auth",
    summary = "Регистрация нового пользователя",
    request_body(content = RegisterRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Успешная регистрация", body = Ack),
        (status = 400, description = "Неправильные данные", body = ErrorBody),
        (status = 409, description = "Пользователь уже существует", body = ErrorBody),
    ),
    tag = "Auth"
)]
#[instrument(skip(ctx, payload))]
pub async fn register(
    Extension(ctx): Extension<Arc<AppContext>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<Json<Ack>, AuthError> {
    let Some(Json(request)) = payload else {
        debug!("Missing or malformed payload");
        return Err(AuthError::Validation(INVALID_DATA_MESSAGE));
    };

    let (Some(login), Some(password)) = (present(request.login), present_secret(request.password))
    else {
        debug!("Missing login or password");
        return Err(AuthError::Validation(INVALID_DATA_MESSAGE));
    };

    // Stored as received: no hashing, see the crate-level security notice.
    let record = UserRecord {
        login: login.clone(),
        email: email(request.email),
        password,
    };

    if !ctx.directory().insert_if_absent(record)? {
        debug!(login = %login, "Login already registered");
        return Err(AuthError::Conflict);
    }

    info!(login = %login, "User registered");

    Ok(Json(Ack::ok()))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    summary = "Авторизация пользователя",
    request_body(content = LoginRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Успешная авторизация", body = Ack),
        (status = 400, description = "Логин и пароль обязательны", body = ErrorBody),
        (status = 401, description = "Неверные учетные данные", body = ErrorBody),
    ),
    tag = "Auth"
)]
#[instrument(skip(ctx, payload))]
pub async fn login(
    Extension(ctx): Extension<Arc<AppContext>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<Ack>, AuthError> {
    let Some(Json(request)) = payload else {
        debug!("Missing or malformed payload");
        return Err(AuthError::Validation(CREDENTIALS_REQUIRED_MESSAGE));
    };

    let (Some(login), Some(password)) = (present(request.login), present_secret(request.password))
    else {
        debug!("Missing login or password");
        return Err(AuthError::Validation(CREDENTIALS_REQUIRED_MESSAGE));
    };

    let Some(record) = ctx.directory().get(&login)? else {
        debug!(login = %login, "Unknown login");
        return Err(AuthError::UnknownLogin);
    };

    if !record.password_matches(password.expose_secret()) {
        return Err(AuthError::WrongPassword);
    }

    debug!(login = %login, "Login successful");

    Ok(Json(Ack::ok()))
}
