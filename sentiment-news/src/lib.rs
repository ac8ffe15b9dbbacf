//! Upstream news clients for symbol sentiment
//!
//! This crate provides the [`NewsSource`] boundary and its implementations:
//! - HTTP: JSON article feed from a remote provider (primary)
//! - Static: a fixed in-memory batch (offline runs and tests)

pub mod error;
pub mod http_source;
pub mod source;
pub mod static_source;

pub use error::NewsError;
pub use http_source::HttpNewsSource;
pub use source::NewsSource;
pub use static_source::StaticNewsSource;
