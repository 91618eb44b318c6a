//! Core business logic for makaan-rs.

pub mod services;

pub use services::*;
