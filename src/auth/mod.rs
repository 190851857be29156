pub mod oidc;
pub mod session;

pub use oidc::{AuthError, AuthResult, OidcClient, TokenResponse, UserInfo};
pub use session::{SessionData, Sessions, SESSION_COOKIE};

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::{Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::server::AppState;

/// Nonce cookie set on /auth/login and checked at the callback.
const STATE_COOKIE: &str = "reelist_oidc_state";

/// Authenticated caller. Decoded from the session cookie and inserted
/// into request extensions by [`session_middleware`]; handlers that
/// require auth extract it, handlers that merely adapt to it take an
/// `Option`.
#[derive(Debug, Clone)]
pub struct Identity {
    pub sub: String,
    pub name: String,
}

/// Resolves the session cookie on every request. Never rejects; routes
/// decide for themselves whether an anonymous caller is acceptable.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(session) = state.sessions.decode(cookie.value()) {
            req.extensions_mut().insert(Identity {
                sub: session.sub,
                name: session.name,
            });
        }
    }
    next.run(req).await
}

/// GET /auth/login
///
/// Sends the browser to the identity provider with a fresh state nonce.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let nonce = Uuid::new_v4().simple().to_string();
    let url = state.oidc.authorize_url(&nonce);

    let cookie = Cookie::build((STATE_COOKIE, nonce))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(10))
        .build();

    (jar.add(cookie), Redirect::to(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// GET /ibm/cloud/appid/callback
///
/// Completes the authorization-code flow. On success a session cookie
/// is set and the browser returns to the app; any failure lands back
/// on /auth/login so the user can retry.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    match authenticate(&state, &jar, &params).await {
        Ok(cookie) => {
            let jar = jar.remove(expired_state_cookie()).add(cookie);
            (jar, Redirect::to("/"))
        }
        Err(e) => {
            warn!("Login callback failed: {}", e);
            (jar.remove(expired_state_cookie()), Redirect::to("/auth/login"))
        }
    }
}

async fn authenticate(
    state: &AppState,
    jar: &CookieJar,
    params: &CallbackParams,
) -> AuthResult<Cookie<'static>> {
    if let Some(e) = &params.error {
        return Err(AuthError::Flow(format!("provider returned error: {}", e)));
    }

    let code = params
        .code
        .as_deref()
        .ok_or_else(|| AuthError::Flow("missing code parameter".to_string()))?;
    let returned_state = params
        .state
        .as_deref()
        .ok_or_else(|| AuthError::Flow("missing state parameter".to_string()))?;
    let expected_state = jar
        .get(STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AuthError::Flow("missing state cookie".to_string()))?;

    if returned_state != expected_state {
        return Err(AuthError::Flow("state mismatch".to_string()));
    }

    let tokens = state.oidc.exchange_code(code).await?;
    let user = state.oidc.userinfo(&tokens.access_token).await?;

    info!(sub = %user.sub, "User logged in");

    let value = state.sessions.issue(&user.sub, &user.display_name());
    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(state.sessions.timeout_hours() as i64))
        .build();

    Ok(cookie)
}

/// GET /auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();

    (jar.remove(cookie), Redirect::to("/"))
}

fn expired_state_cookie() -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
