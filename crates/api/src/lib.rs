//! HTTP API layer for makaan-rs.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: marketplace endpoints (auth, users, projects, posts,
//!   products, catalog, search, orders, admin)
//! - **Extractors**: authentication and admin gating
//! - **Middleware**: bearer-token resolution, application state
//! - **Responses**: the standard envelope and paginated bodies
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
