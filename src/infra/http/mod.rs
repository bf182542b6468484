pub mod cache;
pub mod error;
mod middleware;
pub mod state;
pub mod todos;

pub use middleware::{REQUEST_ID_HEADER, RequestContext};
pub use state::HttpState;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::application::error::ErrorReport;

/// Routing table: every path and method the service answers.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/todos", get(todos::get).post(todos::add))
        .route(
            "/todos/{id}",
            axum::routing::put(todos::update)
                .patch(todos::update)
                .delete(todos::remove),
        )
        .route("/cache/keys", get(cache::get_cache))
        .route("/cache/key", get(cache::get_key))
        .route("/_health/db", get(db_health))
        .route("/_health/cache", get(cache_health))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn db_health(State(state): State<HttpState>) -> Response {
    health_response("infra::http::db_health", state.db.health_check().await)
}

async fn cache_health(State(state): State<HttpState>) -> Response {
    health_response("infra::http::cache_health", state.cache.health_check().await)
}

fn health_response<E: std::error::Error>(source: &'static str, result: Result<(), E>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(source, StatusCode::SERVICE_UNAVAILABLE, &err)
                .attach(&mut response);
            response
        }
    }
}
