use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Method, Request, header};
use axum::middleware;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::cfg;
use crate::core;
use crate::core::ServiceError;
use crate::routes;
use crate::services::credentials;

/// Back end server built from routes that are either public or require a session
pub fn create_router(context: core::ArcContext) -> Router {
    // Routes that act on behalf of a caller; the tenant is taken from the session
    let session_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/posts", get(routes::posts::list).post(routes::posts::create))
        .route("/posts/{id}", get(routes::posts::get).put(routes::posts::update))
        .route("/posts/{id}/status", put(routes::posts::update_status))
        .route("/posts/{id}/upvote", post(routes::posts::upvote))
        .route("/posts/{id}/votes", get(routes::posts::vote_total))
        .layer(middleware::from_fn_with_state(context.clone(), session_middleware))
        .with_state(context.clone());

    let auth_routes = Router::new()
        .route("/auth/register", post(routes::auth::register)) // creates a member account
        .route("/auth/login", post(routes::auth::login)) // issues a session token
        .route("/auth/logout", post(routes::auth::logout)) // revokes the session token
        .with_state(context.clone());

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/tenants", get(routes::tenants::list).post(routes::tenants::create))
        .route("/tenants/{id}", get(routes::tenants::get_by_id))
        .route("/tenants/slug/{slug}", get(routes::tenants::get_by_slug))
        .with_state(context.clone());

    Router::new()
        .merge(auth_routes)
        .merge(session_routes)
        .merge(public_routes)
        .layer(create_cors_layer(&context.settings.server))
        .layer(TraceLayer::new_for_http())
}

fn create_cors_layer(settings: &cfg::ServerSettings) -> CorsLayer {
    let origins = settings
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Resolves the bearer token into a `Caller` and attaches it to the request
async fn session_middleware(
    State(context): State<core::ArcContext>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = auth::bearer_token(req.headers()).map_err(|e| {
        tracing::warn!("Unauthorized access attempt: {}", e);
        ServiceError::Unauthorized
    })?;
    let caller = credentials::authenticate(&context, token).await?;

    tracing::debug!(
        user_id = caller.user_id,
        tenant_id = caller.tenant_id,
        role = ?caller.role,
        "Authenticated caller");

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}
