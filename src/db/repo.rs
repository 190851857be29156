use async_trait::async_trait;

use super::model::*;
use crate::tmdb::MovieRecord;

/// Per-user watchlist persistence. Every operation is scoped to the
/// owner's subject id; there is no way to read or delete another
/// user's entries through this interface.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// All entries belonging to `owner`.
    async fn list(&self, owner: &str) -> StoreResult<Vec<WatchlistEntry>>;

    /// Store `movie` as a new entry and return the generated document
    /// id. Saving the same movie twice creates two entries.
    async fn create(&self, owner: &str, movie: &MovieRecord) -> StoreResult<String>;

    /// Delete one entry. `rev` must match the stored revision token;
    /// a stale token is a [`StoreError::RevisionConflict`], an unknown
    /// or foreign document a [`StoreError::NotFound`].
    async fn delete(&self, owner: &str, doc_id: &str, rev: &str) -> StoreResult<()>;
}
