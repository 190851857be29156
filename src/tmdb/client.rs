use std::time::Duration;

use reqwest::header;
use tracing::debug;

use super::types::{MovieCredits, MovieDetails, MovieSummary, SearchResponse};
use crate::config::TmdbConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("TMDB request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("TMDB returned status {status}: {body}")]
    Api { status: u16, body: String },
}

pub type TmdbResult<T> = Result<T, TmdbError>;

/// Thin client for the TMDB REST API. Authenticates every request with
/// the configured read access token.
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> TmdbResult<Self> {
        let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);

        if let Some(addr) = config.resolve {
            // Pin the API host to a fixed address instead of system DNS.
            // TLS still verifies the certificate against the host name.
            if let Some(host) = host_of(&config.base_url) {
                builder = builder.resolve(&host, addr);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    pub async fn search_movies(&self, query: &str) -> TmdbResult<Vec<MovieSummary>> {
        let response: SearchResponse = self
            .get(
                "/search/movie",
                &[
                    ("query", query),
                    ("include_adult", "false"),
                    ("language", &self.language),
                    ("page", "1"),
                ],
            )
            .await?;
        Ok(response.results)
    }

    pub async fn movie_details(&self, movie_id: i64) -> TmdbResult<MovieDetails> {
        self.get(&format!("/movie/{}", movie_id), &[("language", &self.language)])
            .await
    }

    pub async fn movie_credits(&self, movie_id: i64) -> TmdbResult<MovieCredits> {
        self.get(
            &format!("/movie/{}/credits", movie_id),
            &[("language", &self.language)],
        )
        .await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> TmdbResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "TMDB request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TmdbError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Host part of a http(s) url, without port or path.
fn host_of(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let host = rest.split('/').next()?.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
