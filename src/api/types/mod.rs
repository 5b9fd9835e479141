//! Shared request/response types

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorResponse};
pub use json::{parse_json_body, Json, JsonRejection};
