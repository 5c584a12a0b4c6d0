//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_handler, clear_handler, decr_handler, delete_handler, delete_many_handler, get_handler,
    get_many_handler, has_handler, health_handler, incr_handler, set_handler, set_many_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a value
/// - `PUT /add` - Store a value unless the key is live
/// - `GET /get/:key` - Retrieve a value
/// - `GET /has/:key` - Check for a live entry
/// - `DELETE /del/:key` - Delete a key
/// - `POST /get_many` - Retrieve several values
/// - `PUT /set_many` - Store several values
/// - `POST /delete_many` - Delete several keys
/// - `POST /clear` - Delete every entry under the prefix
/// - `POST /incr/:key`, `POST /decr/:key` - Adjust an integer
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/add", put(add_handler))
        .route("/get/:key", get(get_handler))
        .route("/has/:key", get(has_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/get_many", post(get_many_handler))
        .route("/set_many", put(set_many_handler))
        .route("/delete_many", post(delete_many_handler))
        .route("/clear", post(clear_handler))
        .route("/incr/:key", post(incr_handler))
        .route("/decr/:key", post(decr_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
