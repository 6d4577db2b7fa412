use std::sync::Arc;

use alloy::primitives::Address;
use axum::{extract::State, Extension, Json};
use common::config::Config;
use db::{
    challenge, session, ColumnTrait, DatabaseConnection, Duration, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::{error::PortalError, validation::ValidatedJson};

#[derive(Deserialize, Validate)]
pub(super) struct ChallengeRequest {
    address: Address,
}

#[derive(Serialize)]
pub(super) struct ChallengeResponse {
    nonce: String,
    message: String,
}

/// Delete challenges and sessions that outlived their lifespans.
async fn purge_expired(db: &DatabaseConnection, config: &Config) -> Result<(), PortalError> {
    let challenges = challenge::Entity::delete_many()
        .filter(challenge::Column::CreatedAt.lt(session::expiry_cutoff(Duration::seconds(
            config.session.challenge_lifespan,
        ))))
        .exec(db)
        .await?;

    let sessions = session::Entity::delete_many()
        .filter(session::Column::CreatedAt.lt(session::expiry_cutoff(Duration::seconds(
            config.session.token_lifespan,
        ))))
        .exec(db)
        .await?;

    if challenges.rows_affected > 0 || sessions.rows_affected > 0 {
        debug!(
            challenges = challenges.rows_affected,
            sessions = sessions.rows_affected,
            "expired records deleted"
        );
    }

    Ok(())
}

pub(super) async fn challenge(
    State(db): State<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    ValidatedJson(request): ValidatedJson<ChallengeRequest>,
) -> Result<Json<ChallengeResponse>, PortalError> {
    purge_expired(&db, &config).await?;

    let (model, nonce) = challenge::generate_challenge(&request.address.to_string());

    challenge::Entity::insert(model)
        .exec_without_returning(&*db)
        .await?;

    Ok(Json(ChallengeResponse {
        message: challenge::message(&nonce),
        nonce,
    }))
}
