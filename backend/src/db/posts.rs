use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{DbContext, DbError};

/// Triage status of a post. Admins may move a post between any two states.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
}

impl PostStatus {
    pub const ALL: [Self; 3] = [Self::Planned, Self::InProgress, Self::Completed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownPostStatus(pub String);

impl fmt::Display for UnknownPostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown post status '{}', expected one of: planned, in_progress, completed", self.0)
    }
}

impl FromStr for PostStatus {
    type Err = UnknownPostStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownPostStatus(s.to_string()))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub tenant_id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
    pub status: PostStatus,
    pub vote_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewPost {
    pub tenant_id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
}

pub async fn create_post(db: &DbContext, new_post: NewPost) -> Result<Post, DbError> {
    let now = Utc::now().naive_utc();
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (tenant_id, author_id, title, description, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, tenant_id, author_id, title, description, status, 0 AS vote_count, created_at, updated_at
        "#,
    )
    .bind(new_post.tenant_id)
    .bind(new_post.author_id)
    .bind(new_post.title)
    .bind(new_post.description)
    .bind(PostStatus::Planned)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await?;
    Ok(post)
}

/// Posts of one tenant in creation order, each with its current vote count
pub async fn list_posts(db: &DbContext, tenant_id: i64, skip: i64, limit: i64) -> Result<Vec<Post>, DbError> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT
            p.id,
            p.tenant_id,
            p.author_id,
            p.title,
            p.description,
            p.status,
            (SELECT COUNT(*) FROM votes v WHERE v.post_id = p.id) AS vote_count,
            p.created_at,
            p.updated_at
        FROM posts p
        WHERE p.tenant_id = ?
        ORDER BY p.created_at, p.id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(tenant_id)
    .bind(limit)
    .bind(skip)
    .fetch_all(db)
    .await?;
    Ok(posts)
}

pub async fn get_post(db: &DbContext, tenant_id: i64, id: i64) -> Result<Post, DbError> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT
            p.id,
            p.tenant_id,
            p.author_id,
            p.title,
            p.description,
            p.status,
            (SELECT COUNT(*) FROM votes v WHERE v.post_id = p.id) AS vote_count,
            p.created_at,
            p.updated_at
        FROM posts p
        WHERE p.id = ? AND p.tenant_id = ?
        "#,
    )
    .bind(id)
    .bind(tenant_id)
    .fetch_one(db)
    .await?;
    Ok(post)
}

/// Sets the status; returns false when no such post exists in the tenant
pub async fn update_post_status(db: &DbContext, tenant_id: i64, id: i64, status: PostStatus) -> Result<bool, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET status = ?, updated_at = ?
        WHERE id = ? AND tenant_id = ?
        "#,
    )
    .bind(status)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .bind(tenant_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Rewrites title and description only while the post is still planned and owned by `author_id`
pub async fn update_post_content(
    db: &DbContext,
    tenant_id: i64,
    id: i64,
    author_id: i64,
    title: &str,
    description: &str,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, description = ?, updated_at = ?
        WHERE id = ? AND tenant_id = ? AND author_id = ? AND status = 'planned'
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .bind(tenant_id)
    .bind(author_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
