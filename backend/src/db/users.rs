use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{DbContext, DbError};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Member,
    Admin,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub tenant_id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewUser {
    pub tenant_id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

pub async fn create_user(db: &DbContext, new_user: NewUser) -> Result<User, DbError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (tenant_id, email, password_hash, role, created_at)
        VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
        RETURNING id, tenant_id, email, password_hash, role, created_at
        "#,
    )
    .bind(new_user.tenant_id)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.role)
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn get_user_by_id(db: &DbContext, tenant_id: i64, id: i64) -> Result<User, DbError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, tenant_id, email, password_hash, role, created_at
        FROM users
        WHERE id = ? AND tenant_id = ?
        "#,
    )
    .bind(id)
    .bind(tenant_id)
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn get_user_by_email(db: &DbContext, tenant_id: i64, email: &str) -> Result<User, DbError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, tenant_id, email, password_hash, role, created_at
        FROM users
        WHERE tenant_id = ? AND email = ?
        "#,
    )
    .bind(tenant_id)
    .bind(email)
    .fetch_one(db)
    .await?;
    Ok(user)
}

/// Users sharing an email across tenants, at most `limit` of them
pub async fn find_users_by_email(db: &DbContext, email: &str, limit: i64) -> Result<Vec<User>, DbError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, tenant_id, email, password_hash, role, created_at
        FROM users
        WHERE email = ?
        ORDER BY id
        LIMIT ?
        "#,
    )
    .bind(email)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(users)
}
