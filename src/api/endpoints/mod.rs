//! Public API endpoints
//!
//! The summarizer and example routes are wrapped with [`with_rate_limit`] and
//! charge the caller's key; key validation is free.

pub mod example;
pub mod github_summarizer;
pub mod validate_key;

use axum::{routing::post, Router};

use super::middleware::with_rate_limit;
use super::state::AppState;
use crate::domain::{EndpointCost, RateLimitConfig};

/// Create the public endpoint router
pub fn create_endpoints_router() -> Router<AppState> {
    Router::new()
        .route(
            "/github-summarizer",
            post(with_rate_limit(
                github_summarizer::summarize_repository,
                RateLimitConfig::new("github-summarizer")
                    .with_increment_by(EndpointCost::Standard),
            )),
        )
        .route(
            "/example-endpoint",
            post(with_rate_limit(
                example::process_example,
                RateLimitConfig::new("example-endpoint").with_increment_by(EndpointCost::Standard),
            ))
            .get(with_rate_limit(
                example::ping_example,
                RateLimitConfig::new("example-endpoint-get")
                    .with_increment_by(EndpointCost::Lightweight),
            )),
        )
        .route("/validate-key", post(validate_key::validate_key))
}
