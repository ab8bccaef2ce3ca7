use chrono::NaiveDateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::sqlite::SqliteQueryResult;

use crate::core::{DbContext, DbError};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub jti: String,
    pub user_id: i64,
    pub tenant_id: i64,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub revoked_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewSession {
    pub jti: String,
    pub user_id: i64,
    pub tenant_id: i64,
    pub token_hash: String,
    pub expires_at: NaiveDateTime,
}

pub async fn create_session(db: &DbContext, new_session: NewSession) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO sessions (jti, user_id, tenant_id, token_hash, issued_at, expires_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new_session.jti)
    .bind(new_session.user_id)
    .bind(new_session.tenant_id)
    .bind(new_session.token_hash)
    .bind(Utc::now().naive_utc())
    .bind(new_session.expires_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Returns the session only while it is neither revoked nor expired
pub async fn get_active_session(db: &DbContext, jti: &str) -> Result<Session, DbError> {
    let now = Utc::now().naive_utc();
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT jti, user_id, tenant_id, token_hash, issued_at, expires_at, revoked_at
        FROM sessions
        WHERE jti = ? AND revoked_at IS NULL AND expires_at > ?
        "#,
    )
    .bind(jti)
    .bind(now)
    .fetch_one(db)
    .await?;
    Ok(session)
}

pub async fn revoke_session(db: &DbContext, jti: &str) -> Result<SqliteQueryResult, DbError> {
    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"
        UPDATE sessions
        SET revoked_at = ?
        WHERE jti = ? AND revoked_at IS NULL
        "#,
    )
    .bind(now)
    .bind(jti)
    .execute(db)
    .await?;
    Ok(result)
}
