use axum::{
    extract::Request,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::auth::{OidcClient, Sessions};
use crate::config::Config;
use crate::db::SqliteWatchlistStore;
use crate::tmdb::TmdbClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<SqliteWatchlistStore>,
    pub tmdb: Arc<TmdbClient>,
    pub oidc: Arc<OidcClient>,
    pub sessions: Arc<Sessions>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<SqliteWatchlistStore>,
        tmdb: Arc<TmdbClient>,
        oidc: Arc<OidcClient>,
        sessions: Arc<Sessions>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            tmdb,
            oidc,
            sessions,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/user", get(crate::api::get_user))
        .route("/api/search", get(crate::api::search))
        .route("/api/movie/:id", get(crate::api::movie_detail))
        .route(
            "/api/watchlist",
            get(crate::api::list_watchlist).post(crate::api::save_to_watchlist),
        )
        .route(
            "/api/watchlist/:doc_id/:rev_id",
            delete(crate::api::delete_from_watchlist),
        );

    let auth_routes = Router::new()
        .route("/auth/login", get(crate::auth::login))
        .route("/auth/logout", get(crate::auth::logout))
        .route("/ibm/cloud/appid/callback", get(crate::auth::callback));

    let mut router = Router::new()
        .route("/robots.txt", get(robots_txt_handler))
        .merge(api_routes)
        .merge(auth_routes);

    if let Some(ref appdir) = state.config.appdir {
        // The web client owns every path the API doesn't claim; unknown
        // paths fall through to index.html for client-side routing.
        let index = PathBuf::from(appdir).join("index.html");
        router = router.fallback_service(
            ServeDir::new(appdir)
                .append_index_html_on_directories(true)
                .not_found_service(ServeFile::new(index)),
        );
    } else {
        router = router.fallback(fallback_handler);
    }

    router
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::session_middleware,
        ))
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn robots_txt_handler() -> &'static str {
    "User-agent: *\nDisallow: /\n"
}

async fn fallback_handler(req: Request) -> impl IntoResponse {
    // OPTIONS still answers 200 so CORS preflight works on any path.
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
