//! Framework-agnostic types for the GitHub login flow.
//!
//! Models decoded from GitHub keep every field the API returns, so rendering
//! them back out is lossless. The error taxonomy maps onto HTTP statuses when
//! the `actix` feature is enabled.

pub mod models;

pub use models::*;
