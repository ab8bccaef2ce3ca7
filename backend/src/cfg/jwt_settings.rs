use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct JwtSettings {
    /// Signing secret; when shorter than 32 characters a persisted random secret is used instead.
    #[serde(default, skip_serializing)]
    pub secret: String,

    #[serde(default)]
    pub session_expiry: i64, // In seconds (e.g., 24 hours = 86400)
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            session_expiry: 24 * 60 * 60, // 24 hours
        }
    }
}
