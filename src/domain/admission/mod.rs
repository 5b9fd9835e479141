//! Admission control domain
//!
//! Types describing how a request is gated by its API key: the per-endpoint
//! cost configuration, the successful admission and the typed failures.

mod config;
mod outcome;

pub use config::{EndpointCost, RateLimitConfig};
pub use outcome::{Admission, AdmissionError};
