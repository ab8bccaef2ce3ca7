use axum::extract::{FromRequest, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Form, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::auth::Caller;
use crate::core;
use crate::core::ServiceError;
use crate::db;
use crate::services::credentials;

#[derive(Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub tenant_id: Option<i64>,
}

/// Login body sent either as JSON or as an OAuth2 password form
pub struct LoginRequest(pub Login);

impl<S: Send + Sync> FromRequest<S> for LoginRequest {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|content_type| content_type.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(login) = Form::<Login>::from_request(req, state).await.map_err(IntoResponse::into_response)?;
            Ok(Self(login))
        } else {
            let Json(login) = Json::<Login>::from_request(req, state).await.map_err(IntoResponse::into_response)?;
            Ok(Self(login))
        }
    }
}

#[derive(Deserialize)]
pub struct Register {
    pub tenant_id: i64,
    pub email: String,
    pub password: String,
}

/// Public sign-up, always as a member of the tenant
pub async fn register(
    State(context): State<core::ArcContext>,
    Json(request): Json<Register>,
) -> Result<impl IntoResponse, ServiceError> {
    tracing::info!(tenant_id = request.tenant_id, "Registering user");
    let user = credentials::register(
        &context.db,
        request.tenant_id,
        &request.email,
        &request.password,
        db::Role::Member,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login route, `username` carries the email address. Accepts JSON or form bodies.
pub async fn login(
    State(context): State<core::ArcContext>,
    LoginRequest(login): LoginRequest,
) -> Result<impl IntoResponse, ServiceError> {
    tracing::info!(tenant_id = ?login.tenant_id, "Logging in user");
    let session = match login.tenant_id {
        Some(tenant_id) => credentials::login(&context, tenant_id, &login.username, &login.password).await?,
        None => credentials::login_without_tenant(&context, &login.username, &login.password).await?,
    };
    Ok(Json(session))
}

/// Logout route; succeeds for tokens that are already invalid
pub async fn logout(
    State(context): State<core::ArcContext>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServiceError> {
    let token = auth::bearer_token(&headers).map_err(|_| ServiceError::Unauthorized)?;
    credentials::logout(&context, token).await?;
    Ok(Json(json!({"result": "ok"})))
}

/// Profile of the session owner
pub async fn me(
    State(context): State<core::ArcContext>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = credentials::current_user(&context.db, &caller).await?;
    Ok(Json(user))
}
