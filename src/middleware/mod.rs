//! Request middleware: authentication, rate limiting and response hardening.

pub mod auth;
pub mod headers;
pub mod rate_limit;

pub use auth::Admin;
pub use rate_limit::RateLimiter;
