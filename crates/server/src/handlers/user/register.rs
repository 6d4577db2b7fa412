use std::sync::Arc;

use axum::{Extension, Json};
use common::contract::{Portal, ProfileDetails};
use tracing::info;

use crate::{
    auth::CurrentSession, error::PortalError, handlers::TransactionResponse,
    validation::ValidatedJson,
};

/// Register the current account as a customer.
pub(super) async fn register(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
    ValidatedJson(details): ValidatedJson<ProfileDetails>,
) -> Result<Json<TransactionResponse>, PortalError> {
    let hash = portal.register_customer(session.address, details).await?;

    info!(address = %session.address, "customer registered");

    Ok(Json(hash.into()))
}
