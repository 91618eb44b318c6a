//! API endpoints.

mod admin;
mod auth;
mod blocking;
mod catalog;
mod orders;
mod posts;
mod products;
mod projects;
mod search;
mod users;

use axum::Router;
use makaan_common::PageWindow;
use serde::Deserialize;

use crate::middleware::AppState;

/// Raw pagination inputs shared by every listing request.
///
/// Missing and sub-1 values fall back to the documented defaults.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub(crate) fn window(self) -> PageWindow {
        PageWindow::normalize(self.page, self.limit)
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/blocking", blocking::router())
        .nest("/projects", projects::router())
        .nest("/posts", posts::router())
        .nest("/products", products::router())
        .nest("/catalog", catalog::router())
        .nest("/search", search::router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
}
