use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Caller;
use crate::core;
use crate::core::ServiceError;
use crate::services::posts;
use crate::services::posts::Page;
use crate::services::votes;

#[derive(Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub description: String,
    /// Accepted for client compatibility; new posts always start as planned.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePost {
    pub title: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub status: Option<String>,
}

// Every handler here runs behind the session middleware; the tenant always comes from the caller.

pub async fn list(
    State(context): State<core::ArcContext>,
    Extension(caller): Extension<Caller>,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, ServiceError> {
    let max_page_size = context.settings.board.max_page_size;
    let posts = posts::list_posts(&context.db, caller.tenant_id, page, max_page_size).await?;
    Ok(Json(posts))
}

pub async fn create(
    State(context): State<core::ArcContext>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<CreatePost>,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(status) = request.status.as_deref().filter(|s| *s != "planned") {
        tracing::debug!(requested_status = status, "Ignoring client supplied status on new post");
    }
    let post = posts::create_post(&context.db, caller.tenant_id, &caller, &request.title, &request.description).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get(
    State(context): State<core::ArcContext>,
    Extension(caller): Extension<Caller>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let post = posts::get_post(&context.db, caller.tenant_id, post_id).await?;
    Ok(Json(post))
}

pub async fn update(
    State(context): State<core::ArcContext>,
    Extension(caller): Extension<Caller>,
    Path(post_id): Path<i64>,
    Json(request): Json<UpdatePost>,
) -> Result<impl IntoResponse, ServiceError> {
    let post = posts::update_post(
        &context.db,
        caller.tenant_id,
        post_id,
        &caller,
        &request.title,
        &request.description,
    )
    .await?;
    Ok(Json(post))
}

pub async fn update_status(
    State(context): State<core::ArcContext>,
    Extension(caller): Extension<Caller>,
    Path(post_id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = query.status.unwrap_or_default();
    let post = posts::update_status(&context.db, caller.tenant_id, post_id, &status, &caller).await?;
    Ok(Json(post))
}

/// Current tally for a post of the caller's tenant
pub async fn vote_total(
    State(context): State<core::ArcContext>,
    Extension(caller): Extension<Caller>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let post = posts::get_post(&context.db, caller.tenant_id, post_id).await?;
    let total = votes::count_votes(&context.db, post.id).await?;
    Ok(Json(json!({"post_id": post.id, "total": total})))
}

pub async fn upvote(
    State(context): State<core::ArcContext>,
    Extension(caller): Extension<Caller>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let policy = context.settings.board.duplicate_vote_policy;
    let outcome = votes::cast_vote(&context.db, caller.tenant_id, post_id, caller.user_id, policy).await?;
    Ok(Json(outcome))
}
