use serde::Deserialize;

use crate::auth::Caller;
use crate::core::{DbContext, DbError, ServiceError};
use crate::db;
use crate::db::PostStatus;

pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Offset pagination over a tenant's posts
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn post_not_found(post_id: i64) -> ServiceError {
    ServiceError::not_found(format!("post {post_id}"))
}

/// Creates a post authored by the caller. New posts always start as `planned`.
pub async fn create_post(
    db: &DbContext,
    tenant_id: i64,
    caller: &Caller,
    title: &str,
    description: &str,
) -> Result<db::Post, ServiceError> {
    if !caller.belongs_to(tenant_id) {
        return Err(ServiceError::Unauthorized);
    }
    let new_post = db::NewPost {
        tenant_id,
        author_id: caller.user_id,
        title: require_text("title", title)?,
        description: require_text("description", description)?,
    };

    let post = db::create_post(db, new_post).await.map_err(|e| match e {
        // the author row must exist in the same tenant
        DbError::ForeignKeyViolation(_) => ServiceError::Unauthorized,
        other => other.into(),
    })?;

    tracing::info!(post_id = post.id, tenant_id, author_id = caller.user_id, "Post created");
    Ok(post)
}

pub async fn list_posts(db: &DbContext, tenant_id: i64, page: Page, max_page_size: i64) -> Result<Vec<db::Post>, ServiceError> {
    if page.skip < 0 || page.limit < 0 {
        return Err(ServiceError::invalid_input("skip and limit must not be negative"));
    }
    let limit = page.limit.min(max_page_size);
    Ok(db::list_posts(db, tenant_id, page.skip, limit).await?)
}

pub async fn get_post(db: &DbContext, tenant_id: i64, post_id: i64) -> Result<db::Post, ServiceError> {
    db::get_post(db, tenant_id, post_id).await.map_err(|e| match e {
        DbError::RowNotFound(_) => post_not_found(post_id),
        other => other.into(),
    })
}

/// Lets the author rewrite a post while it is still `planned`
pub async fn update_post(
    db: &DbContext,
    tenant_id: i64,
    post_id: i64,
    caller: &Caller,
    title: &str,
    description: &str,
) -> Result<db::Post, ServiceError> {
    if !caller.belongs_to(tenant_id) {
        return Err(post_not_found(post_id));
    }
    let title = require_text("title", title)?;
    let description = require_text("description", description)?;

    let updated = db::update_post_content(db, tenant_id, post_id, caller.user_id, &title, &description).await?;
    let post = get_post(db, tenant_id, post_id).await?;
    if updated {
        tracing::info!(post_id, tenant_id, "Post content updated");
        return Ok(post);
    }

    if post.author_id != caller.user_id {
        Err(ServiceError::forbidden("only the author can edit a post"))
    } else {
        Err(ServiceError::conflict(format!("post {post_id} is {} and can no longer be edited", post.status)))
    }
}

/// Moves a post to any of the three statuses. Only admins of the post's tenant may do this.
pub async fn update_status(
    db: &DbContext,
    tenant_id: i64,
    post_id: i64,
    new_status: &str,
    caller: &Caller,
) -> Result<db::Post, ServiceError> {
    if !caller.is_admin() || !caller.belongs_to(tenant_id) {
        return Err(ServiceError::forbidden("only admins can update post status"));
    }
    let status = new_status
        .trim()
        .parse::<PostStatus>()
        .map_err(|e| ServiceError::invalid_input(e.to_string()))?;

    if !db::update_post_status(db, tenant_id, post_id, status).await? {
        return Err(post_not_found(post_id));
    }

    tracing::info!(post_id, tenant_id, status = %status, admin_id = caller.user_id, "Post status updated");
    get_post(db, tenant_id, post_id).await
}
