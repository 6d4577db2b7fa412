use std::sync::Arc;

use alloy::primitives::Address;
use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    Extension, Json, TypedHeader,
};
use common::{config::Config, contract::Portal};
use db::{session, DatabaseConnection, EntityTrait};
use serde::Deserialize;
use validator::Validate;
use tracing::info;

use super::SessionView;
use crate::{auth::find_session, error::PortalError, validation::ValidatedJson};

#[derive(Deserialize, Validate)]
pub(super) struct AccountsChangedRequest {
    accounts: Vec<Address>,
}

/// Handle a wallet account change notification.
///
/// Session survives only if the wallet still exposes the connected account
/// first. Switching to another account requires a new login, since its
/// ownership is not proven yet.
pub(super) async fn accounts_changed(
    State(db): State<Arc<DatabaseConnection>>,
    Extension(portal): Extension<Arc<Portal>>,
    Extension(config): Extension<Arc<Config>>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
    ValidatedJson(request): ValidatedJson<AccountsChangedRequest>,
) -> Result<Json<SessionView>, PortalError> {
    let Some(TypedHeader(authorization)) = authorization else {
        return Ok(Json(SessionView::disconnected()));
    };

    let Some((model, address)) = find_session(&*db, authorization.token(), &config).await? else {
        return Ok(Json(SessionView::disconnected()));
    };

    match request.accounts.first() {
        Some(account) if *account == address => {
            let role = portal.role_of(address).await?;
            Ok(Json(SessionView::connected(model.address, role)))
        }
        account => {
            info!(%address, ?account, "wallet account changed, disconnecting");
            session::Entity::delete_by_id(model.id).exec(&*db).await?;
            Ok(Json(SessionView::disconnected()))
        }
    }
}
