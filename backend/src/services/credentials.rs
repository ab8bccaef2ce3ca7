use chrono::DateTime;
use serde::Serialize;

use crate::auth;
use crate::auth::{Caller, JwtError};
use crate::core::{Context, DbContext, DbError, ServiceError};
use crate::db;
use crate::services::tenants;

/// Result of a successful login
#[derive(Debug, Serialize)]
pub struct IssuedSession {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64, // Seconds until the session expires
    pub user: db::User,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates a user in a tenant with an Argon2id password hash
pub async fn register(
    db: &DbContext,
    tenant_id: i64,
    email: &str,
    password: &str,
    role: db::Role,
) -> Result<db::User, ServiceError> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
        return Err(ServiceError::invalid_input("a valid email is required"));
    }
    if password.is_empty() {
        return Err(ServiceError::invalid_input("password must not be empty"));
    }

    tenants::get_tenant(db, tenant_id).await?;

    let new_user = db::NewUser {
        tenant_id,
        email: email.clone(),
        password_hash: auth::hash_password(password)?,
        role,
    };
    let user = db::create_user(db, new_user).await.map_err(|e| match e {
        DbError::UniqueViolation(_) => ServiceError::conflict(format!("email '{email}' is already registered")),
        DbError::ForeignKeyViolation(_) => ServiceError::not_found(format!("tenant {tenant_id}")),
        other => other.into(),
    })?;

    tracing::info!(user_id = user.id, tenant_id, role = ?user.role, "User registered");
    Ok(user)
}

/// Verifies credentials within a tenant and issues a session bound to that tenant.
///
/// Unknown emails and wrong passwords fail with the same `Unauthorized` error.
pub async fn login(ctx: &Context, tenant_id: i64, email: &str, password: &str) -> Result<IssuedSession, ServiceError> {
    let email = normalize_email(email);
    let user = match db::get_user_by_email(&ctx.db, tenant_id, &email).await {
        Ok(user) => user,
        Err(DbError::RowNotFound(_)) => {
            auth::verify_dummy_password(password);
            tracing::warn!(tenant_id, "Login attempt for unknown account");
            return Err(ServiceError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    if !auth::verify_password(password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, tenant_id, "Invalid password");
        return Err(ServiceError::Unauthorized);
    }

    issue_session(ctx, user).await
}

/// Logs in when the email identifies exactly one account across all tenants
pub async fn login_without_tenant(ctx: &Context, email: &str, password: &str) -> Result<IssuedSession, ServiceError> {
    let email = normalize_email(email);
    let mut users = db::find_users_by_email(&ctx.db, &email, 2).await?;
    if users.len() != 1 {
        auth::verify_dummy_password(password);
        tracing::warn!(matches = users.len(), "Login without tenant could not resolve a single account");
        return Err(ServiceError::Unauthorized);
    }
    let tenant_id = users.remove(0).tenant_id;
    login(ctx, tenant_id, &email, password).await
}

async fn issue_session(ctx: &Context, user: db::User) -> Result<IssuedSession, ServiceError> {
    let (access_token, claims) = auth::generate_session_token(&ctx.jwt, user.id, user.tenant_id, user.role)?;
    let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(JwtError::InvalidToken)?;

    let new_session = db::NewSession {
        jti: claims.jti,
        user_id: user.id,
        tenant_id: user.tenant_id,
        token_hash: auth::hash_token(&access_token),
        expires_at: expires_at.naive_utc(),
    };
    db::create_session(&ctx.db, new_session).await?;

    tracing::info!(user_id = user.id, tenant_id = user.tenant_id, "Session issued");
    Ok(IssuedSession {
        access_token,
        token_type: "bearer",
        expires_in: ctx.jwt.session_expiry,
        user,
    })
}

/// Resolves a bearer token to the caller it was issued to
pub async fn authenticate(ctx: &Context, token: &str) -> Result<Caller, ServiceError> {
    let claims = auth::decode_session_token(&ctx.jwt, token).map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        ServiceError::Unauthorized
    })?;
    let user_id = claims.user_id().map_err(|_| ServiceError::Unauthorized)?;

    let session = db::get_active_session(&ctx.db, &claims.jti).await.map_err(|e| match e {
        DbError::RowNotFound(_) => ServiceError::Unauthorized,
        other => other.into(),
    })?;

    let matches = session.user_id == user_id
        && session.tenant_id == claims.tenant_id
        && session.token_hash == auth::hash_token(token);
    if !matches {
        tracing::warn!(jti = %claims.jti, "Session token does not match its stored session");
        return Err(ServiceError::Unauthorized);
    }

    Ok(Caller {
        user_id,
        tenant_id: claims.tenant_id,
        role: claims.role,
    })
}

/// Revokes the session behind a token. Unknown, expired, or already revoked tokens are a no-op.
pub async fn logout(ctx: &Context, token: &str) -> Result<(), ServiceError> {
    let Ok(claims) = auth::decode_session_token_ignoring_expiry(&ctx.jwt, token) else {
        tracing::debug!("Logout with an unreadable token ignored");
        return Ok(());
    };

    let result = db::revoke_session(&ctx.db, &claims.jti).await?;
    tracing::info!(user_id = claims.sub, jti = %claims.jti, revoked = result.rows_affected(), "Logout");
    Ok(())
}

/// The profile behind an authenticated caller
pub async fn current_user(db: &DbContext, caller: &Caller) -> Result<db::User, ServiceError> {
    db::get_user_by_id(db, caller.tenant_id, caller.user_id).await.map_err(|e| match e {
        DbError::RowNotFound(_) => ServiceError::Unauthorized,
        other => other.into(),
    })
}
