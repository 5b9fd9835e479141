//! Authentication infrastructure module
//!
//! JWT validation for the owners managing their API keys.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
