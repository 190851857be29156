use serde::{Deserialize, Serialize};

use crate::auth::Identity;

/// Authentication probe for the web client shell.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
    pub user: Option<UserPayload>,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub sub: String,
    pub name: String,
}

impl From<Identity> for UserPayload {
    fn from(identity: Identity) -> Self {
        Self {
            sub: identity.sub,
            name: identity.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    /// Document id of the new entry.
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}
