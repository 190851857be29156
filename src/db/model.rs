use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved movie, denormalized from the enriched record the user added.
/// The serialized names (`_id`, `_rev`, camelCase metadata) are the
/// document shape the web client was written against and must not
/// change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision token, required to delete the entry.
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub tagline: String,
    pub genres: Vec<String>,
    pub director: String,
    pub actors: Vec<String>,
    pub vote_average: f64,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Revision conflict: {0}")]
    RevisionConflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
