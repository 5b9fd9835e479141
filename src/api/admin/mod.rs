//! Owner-scoped API key administration

pub mod api_keys;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create the key management router, mounted at `/api/keys`
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_keys::list_api_keys).post(api_keys::create_api_key))
        .route(
            "/{key_id}",
            get(api_keys::get_api_key)
                .put(api_keys::update_api_key)
                .delete(api_keys::delete_api_key),
        )
        .route("/{key_id}/reset-usage", post(api_keys::reset_api_key_usage))
}
