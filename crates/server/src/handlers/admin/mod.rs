/// Dashboard metrics routes.
mod dashboard;

/// Seed registry routes.
mod seeds;

/// Live dashboard metrics route.
mod stream;

/// User management routes.
mod users;

use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};
use db::DatabaseConnection;

pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/dashboard/stream", get(stream::stream))
        .route("/seeds", get(seeds::list).post(seeds::register))
        .route("/seeds/:seed_id", get(seeds::details))
        .route("/users", get(users::list).post(users::add))
        .route("/users/:address/status", put(users::set_status))
}
