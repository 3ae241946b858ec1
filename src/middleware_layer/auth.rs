use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{
    crypto::token,
    error::AppError,
    models::session::Session,
    repositories::session as session_repo,
    state::AppState,
};

/// The cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Extracts the session token from the request cookies.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
///
/// # Returns
///
/// An `Option` containing the token if present and well formed.
pub fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| token::is_well_formed(value))
}

/// A middleware that requires a valid session to be present.
///
/// Runs before any extractor of the handler, so a missing session is reported
/// ahead of any parameter error.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking authentication...");

    let Some(token) = extract_session_token(&cookies) else {
        return AppError::Unauthenticated("no session cookie".to_string()).into_response();
    };

    let user_id = match session_repo::resolve(&state.db, &token).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            return AppError::Unauthenticated("unknown session".to_string()).into_response();
        }
        Err(e) => return e.into_response(),
    };

    tracing::debug!("✅ User authenticated: {}", user_id);

    request.extensions_mut().insert(Session { user_id });

    next.run(request).await
}
