//! Core business logic for wavyTV.

pub mod services;

pub use services::*;
