use axum::http::{StatusCode, header};
use axum_test::TestServer;
use serde_json::{Value, json};

use crate::db::Role;
use crate::tests::support::*;

async fn login(server: &TestServer, tenant_id: i64, email: &str) -> String {
    let response = server
        .post("/auth/login")
        .json(&json!({
            "username": email,
            "password": TEST_PASSWORD,
            "tenant_id": tenant_id
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    body["access_token"].as_str().unwrap().to_string()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(create_default_context().await);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::OK);
    response.assert_text("OK");
}

#[tokio::test]
async fn test_feedback_board_flow() {
    let context = create_default_context().await;
    let server = create_test_server(context.clone());

    let response = server
        .post("/tenants")
        .json(&json!({"company_name": "Acme", "slug": "acme"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let tenant: Value = response.json();
    let tenant_id = tenant["id"].as_i64().unwrap();
    assert_eq!(tenant["slug"], "acme");

    let response = server
        .post("/auth/register")
        .json(&json!({"tenant_id": tenant_id, "email": "alice@acme.com", "password": TEST_PASSWORD}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let user: Value = response.json();
    assert_eq!(user["role"], "member");
    assert!(user.get("password_hash").is_none());

    let token = login(&server, tenant_id, "alice@acme.com").await;

    let response = server
        .post("/posts")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"title": "Dark Mode", "description": "eyes"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let post_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server.get("/posts").add_header(header::AUTHORIZATION, bearer(&token)).await;
    response.assert_status(StatusCode::OK);
    let posts: Value = response.json();
    assert_eq!(posts.as_array().unwrap().len(), 1);
    assert_eq!(posts[0]["status"], "planned");
    assert_eq!(posts[0]["vote_count"], 0);

    let response = server
        .post(&format!("/posts/{post_id}/upvote"))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({"post_id": post_id, "accepted": true, "total": 1}));

    let response = server
        .get(&format!("/posts/{post_id}/votes"))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    response.assert_json(&json!({"post_id": post_id, "total": 1}));

    // status changes need an admin of the same tenant
    seed_user(&context, tenant_id, "boss@acme.com", Role::Admin).await;
    let admin_token = login(&server, tenant_id, "boss@acme.com").await;

    let response = server
        .put(&format!("/posts/{post_id}/status"))
        .add_query_param("status", "completed")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .put(&format!("/posts/{post_id}/status"))
        .add_query_param("status", "completed")
        .add_header(header::AUTHORIZATION, bearer(&admin_token))
        .await;
    response.assert_status(StatusCode::OK);

    let response = server.get("/posts").add_header(header::AUTHORIZATION, bearer(&token)).await;
    let posts: Value = response.json();
    assert_eq!(posts[0]["status"], "completed");
    assert_eq!(posts[0]["vote_count"], 1);
}

#[tokio::test]
async fn test_posts_require_session() {
    let server = create_test_server(create_default_context().await);

    let response = server.get("/posts").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["result"], "error");

    let response = server
        .get("/posts")
        .add_header(header::AUTHORIZATION, "Bearer not-a-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    seed_user(&context, tenant.id, "alice@acme.com", Role::Member).await;
    let server = create_test_server(context);

    let wrong_password = server
        .post("/auth/login")
        .json(&json!({"username": "alice@acme.com", "password": "nope", "tenant_id": tenant.id}))
        .await;
    let unknown_email = server
        .post("/auth/login")
        .json(&json!({"username": "nobody@acme.com", "password": "nope", "tenant_id": tenant.id}))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.json::<Value>(), unknown_email.json::<Value>());
}

#[tokio::test]
async fn test_login_accepts_password_form() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    seed_user(&context, tenant.id, "alice@acme.com", Role::Member).await;
    let server = create_test_server(context);

    let response = server
        .post("/auth/login")
        .form(&[("username", "alice@acme.com"), ("password", TEST_PASSWORD)])
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let response = server.get("/auth/me").add_header(header::AUTHORIZATION, bearer(&token)).await;
    response.assert_status(StatusCode::OK);

    let tenant_id = tenant.id.to_string();
    let response = server
        .post("/auth/login")
        .form(&[("username", "alice@acme.com"), ("password", TEST_PASSWORD), ("tenant_id", tenant_id.as_str())])
        .await;
    response.assert_status(StatusCode::OK);

    let response = server
        .post("/auth/login")
        .form(&[("username", "alice@acme.com"), ("password", "nope")])
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_unsupported_body() {
    let server = create_test_server(create_default_context().await);

    let response = server.post("/auth/login").text("not json").await;
    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let response = server
        .post("/auth/login")
        .json(&json!({"username": "alice@acme.com"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    seed_user(&context, tenant.id, "alice@acme.com", Role::Member).await;
    let server = create_test_server(context);
    let token = login(&server, tenant.id, "alice@acme.com").await;

    let response = server.get("/auth/me").add_header(header::AUTHORIZATION, bearer(&token)).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["email"], "alice@acme.com");

    let response = server.post("/auth/logout").add_header(header::AUTHORIZATION, bearer(&token)).await;
    response.assert_status(StatusCode::OK);

    let response = server.get("/auth/me").add_header(header::AUTHORIZATION, bearer(&token)).await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server.post("/auth/logout").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_tenant_slug_conflicts() {
    let server = create_test_server(create_default_context().await);
    let request = json!({"company_name": "Acme", "slug": "acme"});

    server.post("/tenants").json(&request).await.assert_status(StatusCode::CREATED);
    let response = server.post("/tenants").json(&request).await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["result"], "error");
}

#[tokio::test]
async fn test_tenant_lookup_routes() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    let server = create_test_server(context);

    let response = server.get(&format!("/tenants/{}", tenant.id)).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["slug"], "acme");

    let response = server.get("/tenants/slug/acme").await;
    assert_eq!(response.json::<Value>()["id"], tenant.id);

    server.get("/tenants/999").await.assert_status(StatusCode::NOT_FOUND);

    let response = server.get("/tenants").await;
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cross_tenant_post_is_not_found() {
    let context = create_default_context().await;
    let acme = seed_tenant(&context, "acme").await;
    let globex = seed_tenant(&context, "globex").await;
    seed_user(&context, acme.id, "alice@acme.com", Role::Member).await;
    seed_user(&context, globex.id, "hank@globex.com", Role::Member).await;
    let server = create_test_server(context);

    let alice = login(&server, acme.id, "alice@acme.com").await;
    let hank = login(&server, globex.id, "hank@globex.com").await;

    let response = server
        .post("/posts")
        .add_header(header::AUTHORIZATION, bearer(&alice))
        .json(&json!({"title": "Dark Mode", "description": "eyes"}))
        .await;
    let post_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .get(&format!("/posts/{post_id}"))
        .add_header(header::AUTHORIZATION, bearer(&hank))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .post(&format!("/posts/{post_id}/upvote"))
        .add_header(header::AUTHORIZATION, bearer(&hank))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server.get("/posts").add_header(header::AUTHORIZATION, bearer(&hank)).await;
    assert!(response.json::<Value>().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_status_value_is_rejected() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    seed_user(&context, tenant.id, "boss@acme.com", Role::Admin).await;
    let server = create_test_server(context);
    let token = login(&server, tenant.id, "boss@acme.com").await;

    let response = server
        .post("/posts")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"title": "Dark Mode", "description": "eyes"}))
        .await;
    let post_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/posts/{post_id}/status"))
        .add_query_param("status", "shipped")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
