/// Account change notification route.
mod accounts;

/// Login challenge route.
mod challenge;

/// Wallet login route.
mod login;

/// Logout route.
mod logout;

/// Current session route.
mod status;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use common::contract::Role;
use db::DatabaseConnection;
use serde::Serialize;

/// Session state as seen by the browser.
#[derive(Serialize)]
pub(crate) struct SessionView {
    connected: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    wallet_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

impl SessionView {
    pub(crate) fn connected(wallet_address: String, role: Role) -> Self {
        Self {
            connected: true,
            wallet_address: Some(wallet_address),
            role: Some(role),
        }
    }

    pub(crate) fn disconnected() -> Self {
        Self {
            connected: false,
            wallet_address: None,
            role: None,
        }
    }
}

/// Create a router that provides an API server with session routes.
pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/login/challenge", post(challenge::challenge))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
        .route("/session", get(status::status))
        .route("/session/accounts", post(accounts::accounts_changed))
}
