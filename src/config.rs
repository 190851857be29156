use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    /// Directory with the built web client. When set, anything the API
    /// doesn't claim is served from here, falling back to index.html.
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default)]
    pub dbdir: Option<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub appid: AppIdConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// TMDB v4 read access token, sent as a bearer token.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_tmdb_language")]
    pub language: String,
    /// Fixed address for the API host, for networks where its DNS name
    /// does not resolve. Certificate validation is unaffected.
    #[serde(default)]
    pub resolve: Option<SocketAddr>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_tmdb_base_url(),
            language: default_tmdb_language(),
            resolve: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppIdConfig {
    /// OAuth server base url of the App ID instance, e.g.
    /// https://us-south.appid.cloud.ibm.com/oauth/v4/{tenant}.
    #[serde(default)]
    pub oauth_server_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub secret: String,
    /// Callback url registered with the provider.
    #[serde(default)]
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Cookie signing key. When unset a random key is generated at
    /// startup and sessions do not survive a restart.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_session_hours")]
    pub timeout_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            timeout_hours: default_session_hours(),
        }
    }
}

fn default_port() -> String {
    "3000".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_session_hours() -> u64 {
    24
}

/// One year. Session timeouts above this are configuration mistakes.
const MAX_SESSION_HOURS: u64 = 24 * 365;

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    /// Environment overrides for everything the hosting platform injects.
    /// A set variable always wins over the file.
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("PORT") {
            self.listen.port = v;
        }
        if let Ok(v) = std::env::var("TMDB_API_KEY") {
            self.tmdb.api_key = v;
        }
        if let Ok(v) = std::env::var("APPID_OAUTH_SERVER_URL") {
            self.appid.oauth_server_url = v;
        }
        if let Ok(v) = std::env::var("APPID_CLIENT_ID") {
            self.appid.client_id = v;
        }
        if let Ok(v) = std::env::var("APPID_SECRET") {
            self.appid.secret = v;
        }
        if let Ok(v) = std::env::var("REDIRECT_URI") {
            self.appid.redirect_uri = v;
        }
        if let Ok(v) = std::env::var("SESSION_SECRET") {
            self.session.secret = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.port.parse::<u16>().map(|p| p == 0).unwrap_or(true) {
            return Err(ConfigError::Invalid(format!(
                "listen.port is not a valid port: {}",
                self.listen.port
            )));
        }
        if self.tmdb.api_key.is_empty() {
            return Err(ConfigError::Invalid(
                "tmdb.api_key is not set (or set TMDB_API_KEY)".to_string(),
            ));
        }
        if self.appid.oauth_server_url.is_empty()
            || self.appid.client_id.is_empty()
            || self.appid.secret.is_empty()
            || self.appid.redirect_uri.is_empty()
        {
            return Err(ConfigError::Invalid(
                "appid section is incomplete: oauth_server_url, client_id, secret \
                 and redirect_uri are all required"
                    .to_string(),
            ));
        }
        // Bounded so the cookie max-age arithmetic cannot overflow.
        if self.session.timeout_hours == 0 || self.session.timeout_hours > MAX_SESSION_HOURS {
            return Err(ConfigError::Invalid(format!(
                "session.timeout_hours must be between 1 and {}: {}",
                MAX_SESSION_HOURS, self.session.timeout_hours
            )));
        }
        Ok(())
    }

    pub fn get_database_path(&self) -> Option<String> {
        if let Some(ref sqlite) = self.database.sqlite {
            return Some(sqlite.filename.clone());
        }

        if let Some(ref dbdir) = self.dbdir {
            let path = PathBuf::from(dbdir).join("reelist.db");
            return Some(path.to_string_lossy().to_string());
        }

        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
