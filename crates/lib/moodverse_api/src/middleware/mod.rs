//! Axum middleware.

pub mod rate_limit;
