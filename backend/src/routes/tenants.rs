use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::core;
use crate::core::ServiceError;
use crate::services::tenants;

#[derive(Deserialize)]
pub struct CreateTenant {
    pub company_name: String,
    pub slug: String,
}

pub async fn list(State(context): State<core::ArcContext>) -> Result<impl IntoResponse, ServiceError> {
    let tenants = tenants::list_tenants(&context.db).await?;
    Ok(Json(tenants))
}

pub async fn create(
    State(context): State<core::ArcContext>,
    Json(request): Json<CreateTenant>,
) -> Result<impl IntoResponse, ServiceError> {
    tracing::info!(slug = %request.slug, "Creating tenant");
    let tenant = tenants::create_tenant(&context.db, &request.company_name, &request.slug).await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

pub async fn get_by_id(
    State(context): State<core::ArcContext>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenants::get_tenant(&context.db, id).await?;
    Ok(Json(tenant))
}

pub async fn get_by_slug(
    State(context): State<core::ArcContext>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let tenant = tenants::get_tenant_by_slug(&context.db, &slug).await?;
    Ok(Json(tenant))
}
