//! API server configuration.

use std::path::PathBuf;

use crate::services::rate_limit::{GENERAL_POLICY, PORTRAIT_POLICY, RateLimitPolicy};

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:3000").
    pub bind_addr: String,
    /// Single origin allowed for cross-origin requests; `None` allows any.
    pub allowed_origin: Option<String>,
    /// Directory of static assets; `index.html` inside it is the entry page.
    pub static_dir: PathBuf,
    /// Number of reverse proxies in front of the service. When non-zero the
    /// client address is read from `X-Forwarded-For`.
    pub trust_proxy_hops: usize,
    /// Limit applied to every route.
    pub general_limit: RateLimitPolicy,
    /// Limit applied to portrait generation.
    pub portrait_limit: RateLimitPolicy,
}

impl Default for ApiConfig {
    /// | Field              | Default             |
    /// |--------------------|---------------------|
    /// | `bind_addr`        | `0.0.0.0:3000`      |
    /// | `allowed_origin`   | any                 |
    /// | `static_dir`       | `public`            |
    /// | `trust_proxy_hops` | `1`                 |
    /// | `general_limit`    | 100 per 15 minutes  |
    /// | `portrait_limit`   | 20 per 60 minutes   |
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            allowed_origin: None,
            static_dir: PathBuf::from("public"),
            trust_proxy_hops: 1,
            general_limit: GENERAL_POLICY,
            portrait_limit: PORTRAIT_POLICY,
        }
    }
}
