//! HTTP Handlers for the Bookmarks API

use axum::{
    Json,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use super::payload::{CreateBookmarkPayload, UpdateBookmarkPayload};
use super::routes::BASE_PATH;
use super::sanitize::sanitize_bookmark;
use super::store::{Bookmark, BookmarkStore};
use crate::error::ApiError;
use crate::handler::{ApiJson, AppState};

// ============================================================================
// Extractors
// ============================================================================

/// The bookmark addressed by the `:id` path segment. Resolving it first
/// gives GET, DELETE and PATCH the same 404 for unknown (or non-numeric) ids.
pub struct FoundBookmark(pub Bookmark);

#[axum::async_trait]
impl FromRequestParts<AppState> for FoundBookmark {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;

        let Some(id) = parse_id(&raw_id) else {
            tracing::error!("Bookmark with id {} not found", raw_id);
            return Err(ApiError::NotFound);
        };

        match BookmarkStore::new(state.db.connection()).get_by_id(id).await? {
            Some(bookmark) => Ok(FoundBookmark(bookmark)),
            None => {
                tracing::error!("Bookmark with id {} not found", id);
                Err(ApiError::NotFound)
            }
        }
    }
}

/// Plain decimal ids only; `+1` and `01` do not alias bookmark 1.
fn parse_id(raw: &str) -> Option<i32> {
    let canonical = raw.bytes().all(|b| b.is_ascii_digit()) && !(raw.len() > 1 && raw.starts_with('0'));
    if !canonical {
        return None;
    }
    raw.parse().ok()
}

fn log_rejected(err: &ApiError) {
    tracing::error!("{}", err);
}

// ============================================================================
// Collection Handlers
// ============================================================================

pub async fn list_bookmarks(State(state): State<AppState>) -> Result<Response, ApiError> {
    let store = BookmarkStore::new(state.db.connection());

    let bookmarks: Vec<Bookmark> = store
        .list_all()
        .await?
        .into_iter()
        .map(sanitize_bookmark)
        .collect();

    Ok((StatusCode::OK, Json(bookmarks)).into_response())
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBookmarkPayload>,
) -> Result<Response, ApiError> {
    let input = payload.validate().inspect_err(log_rejected)?;
    let store = BookmarkStore::new(state.db.connection());

    let bookmark = store.insert(input).await?;
    tracing::info!("Bookmark with id {} created", bookmark.id);

    let location = format!("{}/{}", BASE_PATH, bookmark.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(sanitize_bookmark(bookmark)),
    )
        .into_response())
}

// ============================================================================
// Item Handlers
// ============================================================================

pub async fn get_bookmark(FoundBookmark(bookmark): FoundBookmark) -> Response {
    (StatusCode::OK, Json(sanitize_bookmark(bookmark))).into_response()
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    FoundBookmark(bookmark): FoundBookmark,
) -> Result<StatusCode, ApiError> {
    let store = BookmarkStore::new(state.db.connection());

    store.delete_by_id(bookmark.id).await?;
    tracing::info!("Bookmark with id {} deleted", bookmark.id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    FoundBookmark(bookmark): FoundBookmark,
    ApiJson(payload): ApiJson<UpdateBookmarkPayload>,
) -> Result<StatusCode, ApiError> {
    let changes = payload.validate().inspect_err(log_rejected)?;
    let store = BookmarkStore::new(state.db.connection());

    let affected = store.update(bookmark.id, changes).await?;
    tracing::info!(rows = affected, "Bookmark with id {} updated", bookmark.id);

    Ok(StatusCode::NO_CONTENT)
}
