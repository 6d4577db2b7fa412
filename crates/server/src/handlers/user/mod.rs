/// Seed catalog route.
mod catalog;

/// Customer dashboard route.
mod dashboard;

/// Customer profile routes.
mod profile;

/// Purchase history and purchase management routes.
mod purchases;

/// Customer registration route.
mod register;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use db::DatabaseConnection;

/// Customer views, available to every role that includes the customer one.
pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/seeds", get(catalog::catalog))
        .route(
            "/purchases",
            get(purchases::history).post(purchases::create),
        )
        .route("/purchases/:purchase_id/cancel", post(purchases::cancel))
        .route("/profile", get(profile::profile).put(profile::update))
}

/// Customer registration, available to any connected account.
pub(crate) fn registration_routes() -> Router<Arc<DatabaseConnection>> {
    Router::new().route("/register", post(register::register))
}

/// Check if an optional filter value is set to something other than "all".
fn filter_value(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"))
}
