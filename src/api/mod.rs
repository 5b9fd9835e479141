//! API layer - HTTP endpoints and middleware

pub mod admin;
pub mod endpoints;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use middleware::{with_rate_limit, RequireOwner};
pub use router::{create_api_router, create_router_with_state};
pub use state::AppState;
