use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use routes::{ask::ask, liveness::live, readiness::ready, upload::upload};

use api_state::ApiState;

pub mod api_state;
mod routes;

/// Uploads above this size are rejected by the host layer.
const UPLOAD_MAX_BODY_BYTES: usize = 10_000_000;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live))
        .route("/ask", post(ask))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(UPLOAD_MAX_BODY_BYTES)),
        )
}
