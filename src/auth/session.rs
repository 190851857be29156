use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "reelist_session";

/// Claims carried by the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub sub: String,
    pub name: String,
    pub expires_at: i64,
}

impl SessionData {
    pub fn new(sub: &str, name: &str, timeout_hours: u64) -> Self {
        let expires_at = chrono::Utc::now().timestamp() + (timeout_hours as i64) * 3600;
        Self {
            sub: sub.to_string(),
            name: name.to_string(),
            expires_at,
        }
    }

    pub fn is_valid(&self) -> bool {
        chrono::Utc::now().timestamp() < self.expires_at
    }
}

/// Issues and verifies session cookie values. The value is base64 JSON
/// followed by a hex HMAC-SHA256 signature over the encoded payload.
pub struct Sessions {
    secret: Vec<u8>,
    timeout_hours: u64,
}

impl Sessions {
    pub fn new(secret: Option<String>, timeout_hours: u64) -> Self {
        let secret = match secret {
            Some(s) => s.into_bytes(),
            None => {
                warn!("No session secret configured, sessions will not survive a restart");
                generate_secret().to_vec()
            }
        };
        Self {
            secret,
            timeout_hours,
        }
    }

    /// Signed cookie value for a freshly authenticated subject.
    pub fn issue(&self, sub: &str, name: &str) -> String {
        self.encode(&SessionData::new(sub, name, self.timeout_hours))
    }

    pub fn encode(&self, session: &SessionData) -> String {
        let json = serde_json::to_string(session).unwrap_or_default();
        let payload = STANDARD.encode(json);
        let signature = self.sign(payload.as_bytes());
        format!("{}.{}", payload, hex::encode(signature))
    }

    /// None for anything tampered with, unsigned, or expired.
    pub fn decode(&self, value: &str) -> Option<SessionData> {
        let (payload, signature_hex) = value.split_once('.')?;
        let signature = hex::decode(signature_hex).ok()?;

        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = STANDARD.decode(payload).ok()?;
        let session: SessionData = serde_json::from_slice(&json).ok()?;
        if session.is_valid() {
            Some(session)
        } else {
            None
        }
    }

    pub fn timeout_hours(&self) -> u64 {
        self.timeout_hours
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(m) => m,
            Err(_) => return Vec::new(),
        };
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

fn generate_secret() -> [u8; 32] {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    rng.gen()
}
