//! Common utilities and shared types for wavyTV.
//!
//! This crate provides foundational components used across all wavyTV crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID storage ids and nanoid public ids via [`IdGenerator`]
//! - **Pagination**: Page requests and the paginated envelope via [`Paginated`]
//! - **Tags**: Stop-word aware tag extraction via [`TagExtractor`]
//!
//! # Example
//!
//! ```no_run
//! use wavytv_common::{Config, IdGenerator, AppResult};
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
pub mod tags;

pub use config::Config;
pub use error::{AppError, AppResult, FieldError};
pub use id::IdGenerator;
pub use pagination::{PageRequest, Paginated};
pub use tags::TagExtractor;
