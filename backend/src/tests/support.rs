use axum_test::TestServer;

use crate::app;
use crate::auth;
use crate::auth::Caller;
use crate::cfg;
use crate::core;
use crate::db;
use crate::services::{credentials, tenants};

pub const TEST_PASSWORD: &str = "abcdefghijklmnopqrstuvwxyz";
pub const TEST_JWT_SECRET: &str = "test__secret__key__for__jwt__testing";

pub fn default_settings() -> cfg::AppSettings {
    cfg::AppSettings {
        jwt: cfg::JwtSettings {
            secret: TEST_JWT_SECRET.to_string(),
            session_expiry: 3600,
        },
        // use a private in-memory SQLite database for every context
        database: cfg::DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            run_migrations_on_startup: true,
        },
        ..Default::default()
    }
}

pub async fn create_test_context(settings: cfg::AppSettings) -> core::ArcContext {
    let db = app::create_db_context(&settings.database).await.unwrap();
    app::run_migrations(&db).await.unwrap();
    let jwt = auth::JwtContext::new(&settings.jwt, TEST_JWT_SECRET);
    core::Context::new(db, jwt, settings)
}

pub async fn create_default_context() -> core::ArcContext {
    create_test_context(default_settings()).await
}

pub fn create_test_server(context: core::ArcContext) -> TestServer {
    let router = app::create_router(context);
    TestServer::new(router).unwrap()
}

pub async fn seed_tenant(context: &core::Context, slug: &str) -> db::Tenant {
    let company_name = format!("{slug} inc");
    tenants::create_tenant(&context.db, &company_name, slug).await.unwrap()
}

pub async fn seed_user(context: &core::Context, tenant_id: i64, email: &str, role: db::Role) -> db::User {
    credentials::register(&context.db, tenant_id, email, TEST_PASSWORD, role)
        .await
        .unwrap()
}

pub const fn caller_of(user: &db::User) -> Caller {
    Caller {
        user_id: user.id,
        tenant_id: user.tenant_id,
        role: user.role,
    }
}
