//! Common utilities and shared types for makaan-rs.
//!
//! This crate provides foundational components used across all makaan-rs
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: Uniform page/limit/skip composition via [`PageWindow`]
//!   and [`Paginated`]
//!
//! # Example
//!
//! ```no_run
//! use makaan_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod pagination;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use pagination::{DEFAULT_LIMIT, DEFAULT_PAGE, PageWindow, Paginated};
