use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    error::{AppError, Result},
    handlers, middleware_layer,
    state::AppState,
};

/// Builds the application router.
///
/// The server must be run with `into_make_service_with_connect_info::<SocketAddr>()`:
/// the register/login limiter keys on the peer address.
pub fn build_router(state: AppState) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400));

    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(state.config.auth_rate_per_second)
            .burst_size(state.config.auth_burst)
            .use_headers()
            .finish()
            .ok_or_else(|| AppError::Internal("Invalid rate limiter configuration".to_string()))?,
    );

    let auth_routes = Router::new()
        .route("/api/auth/register", put(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .layer(GovernorLayer::new(auth_governor_conf))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .with_state(state.clone());

    let upload_routes = Router::new()
        .route("/api/tracks/upload", put(handlers::tracks::upload_track))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/tracks", get(handlers::tracks::list_tracks))
        .route("/api/tracks/share", post(handlers::tracks::share_track))
        .route("/api/tracks/revoke", post(handlers::tracks::revoke_track))
        .route("/api/tracks/content", get(handlers::tracks::download_track))
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/users/sharing", get(handlers::users::list_sharing_users))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    Ok(Router::new()
        .merge(auth_routes)
        .merge(upload_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors))
}
