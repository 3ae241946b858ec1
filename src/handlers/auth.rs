use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::{
    error::{AppError, Result},
    handlers::json::json_response,
    middleware_layer::auth::{extract_session_token, SESSION_COOKIE},
    repositories::session as session_repo,
    services::auth as auth_service,
    state::AppState,
    validation::auth::*,
};

/// Form fields for registration and login. Every field is optional at the
/// extractor level so a missing one is reported by name.
#[derive(Deserialize, Debug, Default)]
pub struct CredentialsForm {
    pub login: Option<String>,
    pub passwd: Option<String>,
    pub name: Option<String>,
}

/// The response payload for a registration.
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: i32,
}

fn credentials(form: std::result::Result<Form<CredentialsForm>, FormRejection>) -> Result<(String, String, Option<String>)> {
    let Form(form) = form.map_err(|e| {
        tracing::debug!("Form rejected: {}", e);
        AppError::Validation("wrong form data".to_string())
    })?;

    let login = form
        .login
        .ok_or_else(|| AppError::Validation("login required".to_string()))?;
    let password = form
        .passwd
        .ok_or_else(|| AppError::Validation("password required".to_string()))?;

    Ok((login, password, form.name))
}

/// Creates the session cookie.
fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_path("/");
    cookie
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    form: std::result::Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response> {
    let (login, password, name) = credentials(form)?;
    tracing::info!("📝 Register attempt: {}", login);

    validate_login(&login)?;
    validate_password(&password)?;
    let name = name.unwrap_or_default();
    validate_display_name(&name)?;

    let user = auth_service::register(&state.db, &login, &password, name.trim()).await?;

    json_response(StatusCode::CREATED, &RegisterResponse { id: user.id })
}

/// Handles user login. A new login replaces the user's previous session.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    form: std::result::Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Response> {
    let (login, password, _) = credentials(form)?;
    tracing::info!("🔐 Login attempt: {}", login);

    let (user, token) = auth_service::login(&state.db, &login, &password).await?;

    cookies.add(session_cookie(token, state.config.secure_cookies));
    tracing::info!("✅ User logged in: {}", user.id);

    Ok(StatusCode::OK.into_response())
}

/// Handles user logout. Succeeds whether or not a session was open.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response> {
    if let Some(token) = extract_session_token(&cookies) {
        if let Some(user_id) = session_repo::resolve(&state.db, &token).await? {
            session_repo::destroy(&state.db, user_id).await?;
            tracing::info!("👋 Session closed for user: {}", user_id);
        }
    }

    let mut expired = Cookie::new(SESSION_COOKIE, "");
    expired.set_max_age(Duration::seconds(0));
    expired.set_path("/");
    cookies.remove(expired);

    Ok(StatusCode::OK.into_response())
}
