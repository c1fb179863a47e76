//! HTTP middleware stack for the storefront server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Rate limiting on `/api/auth/*` (governor)

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{ClientIpKeyExtractor, RateLimiterLayer, auth_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
