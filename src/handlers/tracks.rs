use axum::{
    body::Body,
    extract::{
        multipart::MultipartRejection,
        rejection::{FormRejection, QueryRejection},
        Multipart, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Form,
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use crate::{
    error::{AppError, Result},
    handlers::json::json_response,
    models::{record::NewRecord, session::Session},
    repositories::{grant as grant_repo, record as record_repo},
    services::visibility::{self, Listing},
    state::AppState,
    validation::params::{page_window, required_id, sort_key},
};

/// Query parameters of the catalog listing.
#[derive(Deserialize, Debug, Default)]
pub struct ListTracksQuery {
    pub page_no: Option<String>,
    pub on_page: Option<String>,
    pub order_by: Option<String>,
}

/// Form fields of share/revoke.
#[derive(Deserialize, Debug, Default)]
pub struct GrantForm {
    pub track: Option<String>,
    pub user: Option<String>,
}

/// Query parameters of the content download.
#[derive(Deserialize, Debug, Default)]
pub struct TrackQuery {
    pub track: Option<String>,
}

/// The response payload for an upload.
#[derive(Serialize)]
pub struct UploadResponse {
    pub id: i32,
}

fn wrong_form<E: std::fmt::Display>(e: E) -> AppError {
    tracing::debug!("Request data rejected: {}", e);
    AppError::Validation("wrong form data".to_string())
}

/// Lists the records visible to the caller.
#[axum::debug_handler]
pub async fn list_tracks(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    query: std::result::Result<Query<ListTracksQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query.map_err(wrong_form)?;

    let window = page_window(query.page_no.as_deref(), query.on_page.as_deref());
    let sort = sort_key(query.order_by.as_deref())?;

    match visibility::list(&state.db, session.user_id, sort, window).await? {
        Listing::Page(page) => json_response(StatusCode::OK, &page),
        Listing::Empty => Err(AppError::NotFound),
        Listing::OutOfRange { total_count } => {
            tracing::debug!(
                "📂 Page past the end for user {} ({} visible)",
                session.user_id,
                total_count
            );
            Err(AppError::NotFound)
        }
    }
}

/// Parses the form and checks, before anything is written, that the caller owns
/// the record.
async fn owned_grant_target(
    state: &AppState,
    session: &Session,
    form: std::result::Result<Form<GrantForm>, FormRejection>,
) -> Result<(i32, i32)> {
    let Form(form) = form.map_err(wrong_form)?;

    let track = required_id(form.track.as_deref(), "track")?;
    let user = required_id(form.user.as_deref(), "user")?;

    if !grant_repo::is_owner(&state.db, track, session.user_id).await? {
        tracing::warn!(
            "❌ User {} is not the owner of record {}",
            session.user_id,
            track
        );
        return Err(AppError::Forbidden);
    }

    Ok((track, user))
}

/// Shares a record the caller owns with another user.
#[axum::debug_handler]
pub async fn share_track(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    form: std::result::Result<Form<GrantForm>, FormRejection>,
) -> Result<Response> {
    let (track, user) = owned_grant_target(&state, &session, form).await?;

    grant_repo::grant(&state.db, track, user).await?;

    Ok(StatusCode::OK.into_response())
}

/// Withdraws a grant on a record the caller owns.
#[axum::debug_handler]
pub async fn revoke_track(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    form: std::result::Result<Form<GrantForm>, FormRejection>,
) -> Result<Response> {
    let (track, user) = owned_grant_target(&state, &session, form).await?;

    if grant_repo::revoke(&state.db, track, user).await? == 0 {
        tracing::debug!("Nothing to revoke for record {} and user {}", track, user);
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::OK.into_response())
}

fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Streams the content of a record visible to the caller.
#[axum::debug_handler]
pub async fn download_track(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    query: std::result::Result<Query<TrackQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query.map_err(wrong_form)?;
    let track = required_id(query.track.as_deref(), "track")?;

    let file = record_repo::resolve_for_read(&state.db, track, session.user_id).await?;
    let reader = state.blobs.open(&file.file_handle).await?;

    tracing::info!("📥 Streaming record {} to user {}", track, session.user_id);

    let mut headers = HeaderMap::new();
    let content_type = file
        .mime_type
        .as_deref()
        .and_then(|m| HeaderValue::from_str(m).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);

    let disposition = HeaderValue::from_str(&format!(
        r#"attachment; filename="{}""#,
        sanitize_filename(&file.description)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", file.checksum)) {
        headers.insert(header::ETAG, etag);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.size_bytes));

    let body = Body::from_stream(ReaderStream::new(reader));

    Ok((StatusCode::OK, headers, body).into_response())
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Uploads a new record owned by the caller.
///
/// Multipart fields: `file` (required), `name` and `duration` (optional). The
/// description defaults to the uploaded file name, the duration to zero.
#[axum::debug_handler]
pub async fn upload_track(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let mut multipart = multipart.map_err(|e| AppError::Multipart(format!("wrong form data: {}", e)))?;

    let mut content = None;
    let mut file_name = None;
    let mut name = None;
    let mut duration = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(format!("wrong form data: {}", e)))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Multipart(format!("file upload error: {}", e)))?;
                content = Some(bytes);
            }
            Some("name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Multipart(format!("wrong form data: {}", e)))?;
                name = non_blank(text);
            }
            Some("duration") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Multipart(format!("wrong form data: {}", e)))?;
                duration = non_blank(text);
            }
            other => {
                tracing::debug!("Ignoring multipart field {:?}", other);
            }
        }
    }

    let content = content.ok_or_else(|| AppError::Multipart("file required".to_string()))?;
    let description = name
        .or_else(|| file_name.and_then(non_blank))
        .unwrap_or_else(|| "untitled".to_string());

    tracing::info!(
        "📤 Upload by user {}: {:?} ({} bytes)",
        session.user_id,
        description,
        content.len()
    );

    let blob = state.blobs.put(content).await?;

    let record = NewRecord {
        owner_id: session.user_id,
        file_handle: blob.handle.clone(),
        description,
        duration,
        mime_type: blob.mime_type,
        checksum: blob.checksum,
        size_bytes: blob.size,
    };

    let id = match record_repo::create_record(&state.db, &record).await {
        Ok(id) => id,
        Err(e) => {
            if let Err(cleanup) = state.blobs.remove(&blob.handle).await {
                tracing::error!("❌ Failed to remove orphaned blob {}: {}", blob.handle, cleanup);
            }
            return Err(e);
        }
    };

    json_response(StatusCode::OK, &UploadResponse { id })
}
