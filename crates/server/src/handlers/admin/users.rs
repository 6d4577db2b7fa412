use std::sync::Arc;

use alloy::primitives::Address;
use axum::{extract::Path, Extension, Json};
use common::contract::{NewUser, Portal, UserRecord};
use serde::Deserialize;
use validator::Validate;
use tracing::info;

use crate::{
    auth::CurrentSession, error::PortalError, handlers::TransactionResponse,
    validation::ValidatedJson,
};

#[derive(Deserialize, Validate)]
pub(super) struct UserStatusRequest {
    /// Whether the user is allowed to use the portal.
    active: bool,
}

/// List every portal user.
pub(super) async fn list(
    Extension(portal): Extension<Arc<Portal>>,
) -> Result<Json<Vec<UserRecord>>, PortalError> {
    Ok(Json(portal.users().await?))
}

/// Add a new portal user.
pub(super) async fn add(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
    ValidatedJson(user): ValidatedJson<NewUser>,
) -> Result<Json<TransactionResponse>, PortalError> {
    let (address, role) = (user.address, user.role);
    let hash = portal.add_user(session.address, user).await?;

    info!(%address, ?role, admin = %session.address, "user added");

    Ok(Json(hash.into()))
}

/// Lock or unlock a portal user.
pub(super) async fn set_status(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
    Path(address): Path<Address>,
    ValidatedJson(request): ValidatedJson<UserStatusRequest>,
) -> Result<Json<TransactionResponse>, PortalError> {
    let hash = portal
        .set_user_active(session.address, address, request.active)
        .await?;

    info!(%address, active = request.active, admin = %session.address, "user status changed");

    Ok(Json(hash.into()))
}
