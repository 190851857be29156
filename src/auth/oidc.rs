use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::AppIdConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Identity provider returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Login flow error: {0}")]
    Flow(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Tokens returned by the authorization-code exchange.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Userinfo claims this application consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserInfo {
    /// Display name, falling back to email and then the subject id for
    /// providers that omit `name`.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.sub.clone())
    }
}

/// Client for the App ID OAuth server. Implements the server side of
/// the authorization-code flow: redirect url, code exchange, userinfo.
pub struct OidcClient {
    client: reqwest::Client,
    oauth_server_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OidcClient {
    pub fn new(config: &AppIdConfig) -> AuthResult<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            oauth_server_url: config.oauth_server_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        })
    }

    /// Authorization endpoint url the login route redirects to.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/authorization?response_type=code&client_id={}&redirect_uri={}&scope=openid&state={}",
            self.oauth_server_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for tokens. The client
    /// authenticates with HTTP basic credentials.
    pub async fn exchange_code(&self, code: &str) -> AuthResult<TokenResponse> {
        let url = format!("{}/token", self.oauth_server_url);
        debug!(url = %url, "exchanging authorization code");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        into_json(response).await
    }

    /// Fetch the subject's claims with the access token.
    pub async fn userinfo(&self, access_token: &str) -> AuthResult<UserInfo> {
        let url = format!("{}/userinfo", self.oauth_server_url);

        let response = self.client.get(&url).bearer_auth(access_token).send().await?;

        into_json(response).await
    }
}

async fn into_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> AuthResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppIdConfig;

    #[test]
    fn test_authorize_url_encodes_params() {
        let client = OidcClient::new(&AppIdConfig {
            oauth_server_url: "https://region.appid.test/oauth/v4/tenant/".to_string(),
            client_id: "my client".to_string(),
            secret: "shh".to_string(),
            redirect_uri: "http://localhost:3000/ibm/cloud/appid/callback".to_string(),
        })
        .unwrap();

        let url = client.authorize_url("abc&def");
        assert!(url.starts_with("https://region.appid.test/oauth/v4/tenant/authorization?"));
        assert!(url.contains("client_id=my%20client"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fibm%2Fcloud%2Fappid%2Fcallback"
        ));
        assert!(url.contains("state=abc%26def"));
        assert!(url.contains("scope=openid"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut info = UserInfo {
            sub: "sub-1".to_string(),
            name: Some("Ada".to_string()),
            email: Some("ada@example.test".to_string()),
        };
        assert_eq!(info.display_name(), "Ada");
        info.name = None;
        assert_eq!(info.display_name(), "ada@example.test");
        info.email = None;
        assert_eq!(info.display_name(), "sub-1");
    }
}
