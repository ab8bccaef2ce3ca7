use std::fs;

use axum::http;
use axum::http::HeaderMap;
use chrono::Utc;
use jsonwebtoken as jwt;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use thiserror::Error;
use uuid::Uuid;

use crate::cfg;
use crate::db::Role;

type TryRngError = <rand::rngs::OsRng as rand::TryRngCore>::Error;

#[rustfmt::skip]
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token")]
    EncodingFailed(jwt::errors::Error),

    #[error("Failed to decode JWT token")]
    DecodingFailed(jwt::errors::Error),

    #[error("File system operation failed")]
    FileSystemOperationFailed { #[from] source: std::io::Error },

    #[error("Random number generation operation failed")]
    RngOperationFailed { source: TryRngError },

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid authorization header")]
    InvalidAuthorizationHeader,
}

/// Claims carried by a session token. Tenant and role are bound at login.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SessionClaims {
    pub sub: String,    // Subject (user ID)
    pub tenant_id: i64, // Tenant the session is scoped to
    pub role: Role,     // Role at the time of login
    pub exp: i64,       // Expiration time
    pub iat: i64,       // Issued at
    pub jti: String,    // JWT ID, also the session row key
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub.parse::<i64>().map_err(|_| JwtError::InvalidToken)
    }
}

#[derive(Clone)]
pub struct JwtContext {
    pub encoding_key: jwt::EncodingKey,
    pub decoding_key: jwt::DecodingKey,
    pub validation: jwt::Validation,
    pub session_expiry: i64,
}

impl JwtContext {
    #[must_use]
    pub fn new(settings: &cfg::JwtSettings, secret: &str) -> Self {
        let encoding_key = jwt::EncodingKey::from_secret(secret.as_ref());
        let decoding_key = jwt::DecodingKey::from_secret(secret.as_ref());
        let mut validation = jwt::Validation::new(jwt::Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
            session_expiry: settings.session_expiry,
        }
    }
}

/// Generate a new session token and return it together with its claims
pub fn generate_session_token(
    ctx: &JwtContext,
    user_id: i64,
    tenant_id: i64,
    role: Role,
) -> Result<(String, SessionClaims), JwtError> {
    let now = Utc::now().timestamp();
    let header = jwt::Header::new(jwt::Algorithm::HS256);
    let claims = SessionClaims {
        sub: user_id.to_string(),
        tenant_id,
        role,
        exp: now + ctx.session_expiry,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };
    let token = jwt::encode(&header, &claims, &ctx.encoding_key).map_err(JwtError::EncodingFailed)?;
    Ok((token, claims))
}

/// Validate and decode a session token
pub fn decode_session_token(ctx: &JwtContext, token: &str) -> Result<SessionClaims, JwtError> {
    let token_data = jwt::decode::<SessionClaims>(token, &ctx.decoding_key, &ctx.validation)?;
    Ok(token_data.claims)
}

/// Decode a session token checking only its signature, used to revoke expired sessions
pub fn decode_session_token_ignoring_expiry(ctx: &JwtContext, token: &str) -> Result<SessionClaims, JwtError> {
    let mut validation = ctx.validation.clone();
    validation.validate_exp = false;
    let token_data = jwt::decode::<SessionClaims>(token, &ctx.decoding_key, &validation)?;
    Ok(token_data.claims)
}

/// Extracts the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, JwtError> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(JwtError::InvalidAuthorizationHeader)
}

/// SHA-256 of a token, the only form in which tokens are stored
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(token);
    format!("{:x}", hasher.finalize())
}

/// Uses the configured secret when it is long enough, otherwise loads or creates a persisted one
pub fn resolve_jwt_secret(settings: &cfg::JwtSettings) -> Result<String, JwtError> {
    if settings.secret.len() >= 32 {
        return Ok(settings.secret.clone());
    }
    get_jwt_secret()
}

/// Loads or creates a JWT secret
pub fn get_jwt_secret() -> Result<String, JwtError> {
    // check persisted secret file
    let secret_file_path = cfg::AppSettings::get_config_path().join(".jwt_secret");
    if let Ok(file_secret) = fs::read_to_string(&secret_file_path) {
        let trimmed_secret = file_secret.trim();
        if trimmed_secret.len() >= 32 {
            return Ok(trimmed_secret.to_string());
        }
    }

    if let Some(parent) = &secret_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let new_secret = generate_secure_secret()?;
    fs::write(&secret_file_path, &new_secret)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&secret_file_path)?.permissions();
        perms.set_mode(0o600); // rw-------
        fs::set_permissions(&secret_file_path, perms)?;
    }

    tracing::info!("Generated new JWT secret in {}", secret_file_path.to_string_lossy());
    Ok(new_secret)
}

/// Generates a cryptographically secure random secret
fn generate_secure_secret() -> Result<String, JwtError> {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| JwtError::RngOperationFailed { source: e })?;
    Ok(hex::encode(bytes))
}

/// Maps jsonwebtoken errors to our custom `JwtError` type
#[allow(clippy::match_same_arms)]
impl From<jwt::errors::Error> for JwtError {
    fn from(e: jwt::errors::Error) -> Self {
        match e.kind() {
            jwt::errors::ErrorKind::ExpiredSignature => Self::TokenExpired,
            jwt::errors::ErrorKind::InvalidToken => Self::InvalidToken,
            jwt::errors::ErrorKind::Json(_) => Self::InvalidToken,
            _ => Self::DecodingFailed(e),
        }
    }
}
