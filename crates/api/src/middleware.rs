//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use makaan_core::{
    AuthService, BlockingService, CatalogService, ModerationService, OrderService, PostService,
    ProductService, ProjectService, SearchService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub blocking_service: BlockingService,
    pub moderation_service: ModerationService,
    pub search_service: SearchService,
    pub project_service: ProjectService,
    pub post_service: PostService,
    pub product_service: ProductService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService,
}

/// Authentication middleware.
///
/// Resolves a bearer token into a user and stores it in the request
/// extensions. An invalid token is simply ignored; endpoints that require
/// identity reject through [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
