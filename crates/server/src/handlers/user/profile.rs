use std::sync::Arc;

use axum::{Extension, Json};
use common::contract::{Portal, Profile, ProfileDetails};
use tracing::info;

use crate::{
    auth::CurrentSession, error::PortalError, handlers::TransactionResponse,
    validation::ValidatedJson,
};

pub(super) async fn profile(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
) -> Result<Json<Profile>, PortalError> {
    portal
        .profile(session.address)
        .await?
        .map(Json)
        .ok_or(PortalError::ProfileNotFound)
}

pub(super) async fn update(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
    ValidatedJson(details): ValidatedJson<ProfileDetails>,
) -> Result<Json<TransactionResponse>, PortalError> {
    let hash = portal.update_profile(session.address, details).await?;

    info!(address = %session.address, "profile updated");

    Ok(Json(hash.into()))
}
