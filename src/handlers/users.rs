use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    handlers::json::json_response,
    models::user::{SharingUserList, UserList},
    repositories::{record as record_repo, user as user_repo},
    state::AppState,
    validation::params::page_window,
};

/// Paging parameters of the user listings.
#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    pub page_no: Option<String>,
    pub on_page: Option<String>,
}

fn page_query(query: std::result::Result<Query<PageQuery>, QueryRejection>) -> Result<PageQuery> {
    query.map(|Query(q)| q).map_err(|e| {
        tracing::debug!("Query rejected: {}", e);
        AppError::Validation("wrong form data".to_string())
    })
}

/// Lists registered users.
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response> {
    let query = page_query(query)?;
    let window = page_window(query.page_no.as_deref(), query.on_page.as_deref());

    let users = user_repo::list_users(&state.db, window.offset, window.limit).await?;
    if users.is_empty() {
        return Err(AppError::NotFound);
    }

    json_response(StatusCode::OK, &UserList { users })
}

/// Lists owners that share records, with how many records each one shares.
#[axum::debug_handler]
pub async fn list_sharing_users(
    State(state): State<AppState>,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response> {
    let query = page_query(query)?;
    let window = page_window(query.page_no.as_deref(), query.on_page.as_deref());

    let total_count = record_repo::count_sharing_users(&state.db).await?;
    let users = record_repo::list_sharing_users(&state.db, window.offset, window.limit).await?;
    if users.is_empty() {
        return Err(AppError::NotFound);
    }

    json_response(StatusCode::OK, &SharingUserList { total_count, users })
}
