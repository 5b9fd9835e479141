//! API middleware components

pub mod logging;
pub mod metrics;
pub mod owner_auth;
pub mod rate_limit;
pub mod security;

pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use owner_auth::{extract_jwt_token, RequireOwner};
pub use rate_limit::{with_rate_limit, API_KEY_HEADER};
pub use security::security_headers_middleware;
