//! API integration tests.
//!
//! These tests verify the API endpoints work correctly together.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use makaan_api::{middleware::AppState, router as api_router};
use makaan_core::{
    AuthService, BlockingService, CatalogService, ModerationService, NoOpPaymentVerifier, NoOpSms,
    OrderService, PostService, ProductService, ProjectService, SearchService, UserService,
    VisibilityService,
};
use makaan_db::entities::user::{self, UserRole};
use makaan_db::repositories::{
    BrandRepository, CategoryRepository, FlagRepository, OrderRepository, PostRepository,
    ProductRepository, ProjectRepository, UserBlockRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

fn test_user(id: &str, role: UserRole, token: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        phone_number: "919876543210".to_string(),
        fname: Some("Asha".to_string()),
        lname: Some("Nair".to_string()),
        email: None,
        role,
        profile_image: None,
        place: Some("Kochi".to_string()),
        company_name: None,
        company_email: None,
        company_phone: None,
        company_gst_number: None,
        company_place: None,
        company_bio: None,
        experience_years: None,
        token: Some(token.to_string()),
        otp_hash: None,
        otp_expires_at: None,
        flag_count: 0,
        is_violated: false,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

/// Create test app state over a mock connection.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let block_repo = UserBlockRepository::new(Arc::clone(&db));
    let flag_repo = FlagRepository::new(Arc::clone(&db));
    let project_repo = ProjectRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let product_repo = ProductRepository::new(Arc::clone(&db));
    let category_repo = CategoryRepository::new(Arc::clone(&db));
    let brand_repo = BrandRepository::new(Arc::clone(&db));
    let order_repo = OrderRepository::new(Arc::clone(&db));

    let visibility = VisibilityService::new(block_repo.clone());
    let auth_service = AuthService::new(user_repo.clone(), Arc::new(NoOpSms), 300);
    let user_service = UserService::new(
        user_repo.clone(),
        project_repo.clone(),
        product_repo.clone(),
        visibility.clone(),
    );
    let blocking_service = BlockingService::new(block_repo, user_repo.clone());
    let moderation_service = ModerationService::new(
        flag_repo,
        user_repo.clone(),
        project_repo.clone(),
        post_repo.clone(),
        product_repo.clone(),
    );
    let search_service = SearchService::new(
        category_repo.clone(),
        brand_repo.clone(),
        product_repo.clone(),
        project_repo.clone(),
        user_repo.clone(),
        visibility.clone(),
    );
    let project_service = ProjectService::new(project_repo, user_repo.clone(), visibility.clone());
    let post_service = PostService::new(post_repo, visibility.clone());
    let product_service = ProductService::new(product_repo.clone(), brand_repo.clone(), visibility);
    let catalog_service = CatalogService::new(category_repo, brand_repo);
    let order_service = OrderService::new(order_repo, product_repo, Arc::new(NoOpPaymentVerifier));

    AppState {
        auth_service,
        user_service,
        blocking_service,
        moderation_service,
        search_service,
        project_service,
        post_service,
        product_service,
        catalog_service,
        order_service,
    }
}

/// Build the full app (router + auth middleware) over a mock connection.
fn create_test_app(db: DatabaseConnection) -> Router {
    let state = create_test_state(db);
    Router::new()
        .merge(api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            makaan_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json_auth(uri: &str, body: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let response = app.oneshot(post_json("/users/me", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_authenticated_user() {
    // One query: token lookup in the auth middleware.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("u1", UserRole::HomeOwner, "tok_1")]])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(post_json_auth("/users/me", "{}", "tok_1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"]["id"], "u1");
    // Credentials must never appear in responses.
    assert!(json["data"].get("token").is_none());
    assert!(json["data"].get("otpHash").is_none());
}

#[tokio::test]
async fn test_invalid_token_is_guest() {
    // Token lookup comes back empty; /users/me then rejects.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(post_json_auth("/users/me", "{}", "stale_token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_show_user_not_found_is_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(post_json("/users/show", r#"{"userId":"ghost"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"]["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_search_requires_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(post_json("/search/all", r#"{"q":"  "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_reject_unauthenticated() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(post_json(
            "/admin/flags/clear",
            r#"{"targetType":"post","targetId":"p1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_non_admin() {
    // Token lookup resolves a regular user; admin extractor rejects.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("u1", UserRole::HomeOwner, "tok_1")]])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(post_json_auth(
            "/admin/flags/clear",
            r#"{"targetType":"post","targetId":"p1"}"#,
            "tok_1",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_flagging_requires_authentication() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(post_json(
            "/projects/flag",
            r#"{"projectId":"p1","reason":"spam"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_categories_listing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[makaan_db::entities::category::Model {
            id: "c1".to_string(),
            name: "Doors".to_string(),
            image_url: None,
            created_at: chrono::Utc::now().into(),
        }]])
        .into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(post_json("/catalog/categories", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["data"][0]["name"], "Doors");
}

#[tokio::test]
async fn test_orders_require_authentication() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(db);

    let response = app
        .oneshot(post_json(
            "/orders/create",
            r#"{"productId":"prod1","quantity":1}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
