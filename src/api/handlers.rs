use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use tracing::{error, info};

use super::error::ApiError;
use super::types::{DeleteResponse, SaveResponse, SearchParams, UserResponse};
use crate::auth::Identity;
use crate::db::{StoreError, WatchlistEntry, WatchlistStore};
use crate::server::AppState;
use crate::tmdb::{rich_movie, MovieRecord, MovieSummary};

/// GET /api/user
///
/// Answers for both signed-in and anonymous callers; this is how the
/// client decides which shell to render.
pub async fn get_user(identity: Option<Extension<Identity>>) -> Json<UserResponse> {
    match identity {
        Some(Extension(identity)) => Json(UserResponse {
            is_authenticated: true,
            user: Some(identity.into()),
        }),
        None => Json(UserResponse {
            is_authenticated: false,
            user: None,
        }),
    }
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<MovieSummary>>, ApiError> {
    let query = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return Err(ApiError::BadRequest("Query required".to_string())),
    };

    info!(query = %query, "Searching for movies");

    let results = state.tmdb.search_movies(&query).await.map_err(|e| {
        error!("Search failed: {}", e);
        ApiError::Upstream("Failed to fetch movies".to_string())
    })?;

    info!(count = results.len(), "Search finished");

    Ok(Json(results))
}

/// GET /api/movie/:id
pub async fn movie_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieRecord>, ApiError> {
    let movie_id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid movie id".to_string()))?;

    let record = rich_movie(&state.tmdb, movie_id).await.map_err(|e| {
        error!("Movie detail fetch failed: {}", e);
        ApiError::Upstream("Failed to get movie details".to_string())
    })?;

    Ok(Json(record))
}

/// GET /api/watchlist
pub async fn list_watchlist(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
) -> Result<Json<Vec<WatchlistEntry>>, ApiError> {
    let Extension(identity) = identity.ok_or(ApiError::Unauthorized)?;

    let entries = state.store.list(&identity.sub).await.map_err(|e| {
        error!("Watchlist fetch failed: {}", e);
        ApiError::Internal("Failed to fetch watchlist".to_string())
    })?;

    Ok(Json(entries))
}

/// POST /api/watchlist
///
/// The auth check runs before the body is looked at, so an anonymous
/// caller gets 401 even with a malformed payload.
pub async fn save_to_watchlist(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    payload: Result<Json<MovieRecord>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Extension(identity) = identity.ok_or(ApiError::Unauthorized)?;

    let Json(movie) =
        payload.map_err(|e| ApiError::BadRequest(format!("Invalid movie record: {}", e)))?;

    let id = state.store.create(&identity.sub, &movie).await.map_err(|e| {
        error!("Watchlist save failed: {}", e);
        ApiError::Internal("Failed to save movie".to_string())
    })?;

    info!(title = %movie.title, "Saved movie to watchlist");

    Ok(Json(SaveResponse { success: true, id }))
}

/// DELETE /api/watchlist/:doc_id/:rev_id
pub async fn delete_from_watchlist(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    Path((doc_id, rev_id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Extension(identity) = identity.ok_or(ApiError::Unauthorized)?;

    match state.store.delete(&identity.sub, &doc_id, &rev_id).await {
        Ok(()) => {
            info!(doc_id = %doc_id, "Deleted watchlist entry");
            Ok(Json(DeleteResponse { success: true }))
        }
        Err(StoreError::NotFound(_)) => {
            Err(ApiError::NotFound("Document not found".to_string()))
        }
        Err(StoreError::RevisionConflict(_)) => {
            Err(ApiError::Conflict("Revision conflict".to_string()))
        }
        Err(e) => {
            error!("Watchlist delete failed: {}", e);
            Err(ApiError::Internal("Failed to delete".to_string()))
        }
    }
}
