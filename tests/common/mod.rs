//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds a full [`AppState`] on a
//! temporary SQLite file, with the TMDB base url pointed at a wiremock
//! server, and starts Axum on a random port for HTTP-level testing.

use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;
use wiremock::MockServer;

use reelist::auth::{OidcClient, Sessions, SESSION_COOKIE};
use reelist::config::Config;
use reelist::db::SqliteWatchlistStore;
use reelist::server::{build_router, AppState};
use reelist::tmdb::TmdbClient;

pub struct TestHarness {
    pub state: AppState,
    pub addr: SocketAddr,
    /// Stands in for the TMDB API; unmatched requests answer 404.
    pub tmdb: MockServer,
    _dbdir: TempDir,
}

impl TestHarness {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start with extra config tweaks, e.g. pointing the identity
    /// provider at another mock server.
    pub async fn start_with(tweak: impl FnOnce(&mut Config)) -> Self {
        let tmdb_server = MockServer::start().await;

        let dbdir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dbdir.path().join("watchlist.db");

        let mut config = Config::default();
        config.tmdb.api_key = "test-key".to_string();
        config.tmdb.base_url = tmdb_server.uri();
        config.appid.oauth_server_url = "http://127.0.0.1:1/oauth/v4/tenant".to_string();
        config.appid.client_id = "test-client".to_string();
        config.appid.secret = "test-secret".to_string();
        config.appid.redirect_uri = "http://localhost:3000/ibm/cloud/appid/callback".to_string();
        config.session.secret = Some("integration-test-session-secret".to_string());
        tweak(&mut config);

        let store = Arc::new(
            SqliteWatchlistStore::new(db_path.to_str().expect("utf-8 path"))
                .await
                .expect("failed to open store"),
        );
        let tmdb = Arc::new(TmdbClient::new(&config.tmdb).expect("failed to build TMDB client"));
        let oidc = Arc::new(OidcClient::new(&config.appid).expect("failed to build OIDC client"));
        let sessions = Arc::new(Sessions::new(
            config.session.secret.clone(),
            config.session.timeout_hours,
        ));

        let state = AppState::new(config, store, tmdb, oidc, sessions);
        let app = build_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            state,
            addr,
            tmdb: tmdb_server,
            _dbdir: dbdir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Cookie header value for a signed-in test user.
    pub fn session_cookie(&self, sub: &str, name: &str) -> String {
        format!("{}={}", SESSION_COOKIE, self.state.sessions.issue(sub, name))
    }
}

/// Value of a named cookie from the response's Set-Cookie headers.
pub fn set_cookie_value(resp: &reqwest::Response, name: &str) -> Option<String> {
    resp.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| {
            let head = raw.split(';').next().unwrap_or(raw);
            let (cookie_name, value) = head.split_once('=')?;
            (cookie_name == name).then(|| value.to_string())
        })
}

/// Value of a query parameter in a url, undecoded.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}
