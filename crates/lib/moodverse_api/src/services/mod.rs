//! Request-independent services used by handlers and middleware.

pub mod client_ip;
pub mod rate_limit;
