use crate::auth;
use crate::cfg;
use crate::core::ServiceError;
use crate::db::Role;
use crate::services::credentials;
use crate::tests::support::*;

#[tokio::test]
async fn test_register_hashes_password() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;

    let user = credentials::register(&context.db, tenant.id, " Alice@Acme.com ", TEST_PASSWORD, Role::Member)
        .await
        .unwrap();

    assert_eq!(user.email, "alice@acme.com");
    assert_eq!(user.tenant_id, tenant.id);
    assert_eq!(user.role, Role::Member);
    assert_ne!(user.password_hash, TEST_PASSWORD);
    assert!(user.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_register_duplicate_email_within_tenant_conflicts() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    seed_user(&context, tenant.id, "alice@acme.com", Role::Member).await;

    let result = credentials::register(&context.db, tenant.id, "ALICE@acme.com", "other", Role::Member).await;
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_register_same_email_in_other_tenant() {
    let context = create_default_context().await;
    let acme = seed_tenant(&context, "acme").await;
    let globex = seed_tenant(&context, "globex").await;

    let first = seed_user(&context, acme.id, "sam@example.com", Role::Member).await;
    let second = seed_user(&context, globex.id, "sam@example.com", Role::Member).await;
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_register_validation() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;

    let result = credentials::register(&context.db, tenant.id, "not-an-email", TEST_PASSWORD, Role::Member).await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

    let result = credentials::register(&context.db, tenant.id, "a@acme.com", "", Role::Member).await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

    let result = credentials::register(&context.db, 999, "a@acme.com", TEST_PASSWORD, Role::Member).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_login_issues_session_bound_to_tenant_and_role() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    let admin = seed_user(&context, tenant.id, "boss@acme.com", Role::Admin).await;

    let session = credentials::login(&context, tenant.id, "boss@acme.com", TEST_PASSWORD).await.unwrap();
    assert_eq!(session.token_type, "bearer");
    assert_eq!(session.expires_in, 3600);
    assert_eq!(session.user.id, admin.id);

    let claims = auth::decode_session_token(&context.jwt, &session.access_token).unwrap();
    assert_eq!(claims.tenant_id, tenant.id);
    assert_eq!(claims.role, Role::Admin);

    let caller = credentials::authenticate(&context, &session.access_token).await.unwrap();
    assert_eq!(caller.user_id, admin.id);
    assert_eq!(caller.tenant_id, tenant.id);
    assert!(caller.is_admin());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    seed_user(&context, tenant.id, "alice@acme.com", Role::Member).await;

    let wrong_password = credentials::login(&context, tenant.id, "alice@acme.com", "nope").await.unwrap_err();
    let unknown_email = credentials::login(&context, tenant.id, "bob@acme.com", "nope").await.unwrap_err();

    assert!(matches!(wrong_password, ServiceError::Unauthorized));
    assert!(matches!(unknown_email, ServiceError::Unauthorized));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(wrong_password.status_code(), unknown_email.status_code());
}

#[tokio::test]
async fn test_login_is_scoped_to_tenant() {
    let context = create_default_context().await;
    let acme = seed_tenant(&context, "acme").await;
    let globex = seed_tenant(&context, "globex").await;
    seed_user(&context, acme.id, "alice@acme.com", Role::Member).await;

    let result = credentials::login(&context, globex.id, "alice@acme.com", TEST_PASSWORD).await;
    assert!(matches!(result, Err(ServiceError::Unauthorized)));
}

#[tokio::test]
async fn test_login_without_tenant_requires_unique_email() {
    let context = create_default_context().await;
    let acme = seed_tenant(&context, "acme").await;
    let globex = seed_tenant(&context, "globex").await;
    seed_user(&context, acme.id, "alice@acme.com", Role::Member).await;
    seed_user(&context, acme.id, "sam@example.com", Role::Member).await;
    seed_user(&context, globex.id, "sam@example.com", Role::Member).await;

    let session = credentials::login_without_tenant(&context, "alice@acme.com", TEST_PASSWORD).await.unwrap();
    assert_eq!(session.user.tenant_id, acme.id);

    let ambiguous = credentials::login_without_tenant(&context, "sam@example.com", TEST_PASSWORD).await;
    assert!(matches!(ambiguous, Err(ServiceError::Unauthorized)));
}

#[tokio::test]
async fn test_authenticate_rejects_garbage_and_foreign_tokens() {
    let context = create_default_context().await;

    let result = credentials::authenticate(&context, "garbage").await;
    assert!(matches!(result, Err(ServiceError::Unauthorized)));

    // validly signed, but never issued as a session
    let (token, _) = auth::generate_session_token(&context.jwt, 1, 1, Role::Admin).unwrap();
    let result = credentials::authenticate(&context, &token).await;
    assert!(matches!(result, Err(ServiceError::Unauthorized)));
}

#[tokio::test]
async fn test_logout_revokes_session_and_is_idempotent() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    seed_user(&context, tenant.id, "alice@acme.com", Role::Member).await;
    let session = credentials::login(&context, tenant.id, "alice@acme.com", TEST_PASSWORD).await.unwrap();

    credentials::logout(&context, &session.access_token).await.unwrap();
    let result = credentials::authenticate(&context, &session.access_token).await;
    assert!(matches!(result, Err(ServiceError::Unauthorized)));

    credentials::logout(&context, &session.access_token).await.unwrap();
    credentials::logout(&context, "not-even-a-token").await.unwrap();
}

#[tokio::test]
async fn test_logout_only_revokes_its_own_session() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    seed_user(&context, tenant.id, "alice@acme.com", Role::Member).await;
    let laptop = credentials::login(&context, tenant.id, "alice@acme.com", TEST_PASSWORD).await.unwrap();
    let phone = credentials::login(&context, tenant.id, "alice@acme.com", TEST_PASSWORD).await.unwrap();

    credentials::logout(&context, &laptop.access_token).await.unwrap();
    assert!(credentials::authenticate(&context, &phone.access_token).await.is_ok());
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let mut settings = default_settings();
    settings.jwt = cfg::JwtSettings {
        secret: TEST_JWT_SECRET.to_string(),
        session_expiry: -60,
    };
    let context = create_test_context(settings).await;
    let tenant = seed_tenant(&context, "acme").await;
    seed_user(&context, tenant.id, "alice@acme.com", Role::Member).await;

    let session = credentials::login(&context, tenant.id, "alice@acme.com", TEST_PASSWORD).await.unwrap();
    let result = credentials::authenticate(&context, &session.access_token).await;
    assert!(matches!(result, Err(ServiceError::Unauthorized)));

    // expired tokens can still be logged out without error
    credentials::logout(&context, &session.access_token).await.unwrap();
}

#[tokio::test]
async fn test_current_user_returns_profile() {
    let context = create_default_context().await;
    let tenant = seed_tenant(&context, "acme").await;
    let user = seed_user(&context, tenant.id, "alice@acme.com", Role::Member).await;

    let profile = credentials::current_user(&context.db, &caller_of(&user)).await.unwrap();
    assert_eq!(profile.email, "alice@acme.com");
}
