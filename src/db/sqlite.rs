use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;
use uuid::Uuid;

use super::model::*;
use super::repo::WatchlistStore;
use crate::tmdb::MovieRecord;

/// Columns of the watchlist table, in schema order.
type EntryRow = (
    String,         // id
    String,         // rev
    String,         // userid
    i64,            // movieid
    String,         // title
    Option<String>, // poster_path
    Option<String>, // release_date
    Option<String>, // overview
    String,         // tagline
    String,         // genres
    String,         // director
    String,         // actors
    f64,            // vote_average
    String,         // addedat
);

const ENTRY_COLUMNS: &str = "id, rev, userid, movieid, title, poster_path, release_date, \
     overview, tagline, genres, director, actors, vote_average, addedat";

pub struct SqliteWatchlistStore {
    pool: SqlitePool,
}

impl SqliteWatchlistStore {
    pub async fn new(db_path: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(db_path)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };

        store.init_schema().await?;

        info!("Watchlist database initialized at {}", db_path);

        Ok(store)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        let schema = include_str!("schema.sql");
        sqlx::raw_sql(schema).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl WatchlistStore for SqliteWatchlistStore {
    async fn list(&self, owner: &str) -> StoreResult<Vec<WatchlistEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {} FROM watchlist WHERE userid = ? ORDER BY addedat",
            ENTRY_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(entry_from_row).collect())
    }

    async fn create(&self, owner: &str, movie: &MovieRecord) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let rev = format!("1-{}", Uuid::new_v4().simple());
        let added_at = Utc::now();

        sqlx::query(&format!(
            "INSERT INTO watchlist ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            ENTRY_COLUMNS
        ))
        .bind(&id)
        .bind(&rev)
        .bind(owner)
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.poster_path)
        .bind(&movie.release_date)
        .bind(&movie.overview)
        .bind(&movie.tagline)
        .bind(encode_names(&movie.genres))
        .bind(&movie.director)
        .bind(encode_names(&movie.actors))
        .bind(movie.vote_average)
        .bind(added_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn delete(&self, owner: &str, doc_id: &str, rev: &str) -> StoreResult<()> {
        let current = sqlx::query_as::<_, (String,)>(
            "SELECT rev FROM watchlist WHERE id = ? AND userid = ?",
        )
        .bind(doc_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        let current_rev = match current {
            Some((rev,)) => rev,
            None => return Err(StoreError::NotFound(format!("Document not found: {}", doc_id))),
        };

        if current_rev != rev {
            return Err(StoreError::RevisionConflict(doc_id.to_string()));
        }

        // The revision is asserted again in the statement, so a writer
        // that replaced the row between the check and the delete loses.
        let result = sqlx::query("DELETE FROM watchlist WHERE id = ? AND userid = ? AND rev = ?")
            .bind(doc_id)
            .bind(owner)
            .bind(rev)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RevisionConflict(doc_id.to_string()));
        }

        Ok(())
    }
}

fn entry_from_row(row: EntryRow) -> WatchlistEntry {
    WatchlistEntry {
        id: row.0,
        rev: row.1,
        user_id: row.2,
        movie_id: row.3,
        title: row.4,
        poster_path: row.5,
        release_date: row.6,
        overview: row.7,
        tagline: row.8,
        genres: decode_names(&row.9),
        director: row.10,
        actors: decode_names(&row.11),
        vote_average: row.12,
        added_at: parse_added_at(&row.13),
    }
}

fn encode_names(names: &[String]) -> String {
    serde_json::to_string(names).unwrap_or_else(|_| "[]".to_string())
}

fn decode_names(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn parse_added_at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
