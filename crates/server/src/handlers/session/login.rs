use std::sync::Arc;

use alloy::primitives::{Address, Signature};
use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    Extension, Json, TypedHeader,
};
use common::{
    config::Config,
    contract::{Portal, Role},
};
use db::{
    challenge, session, ColumnTrait, DatabaseConnection, Duration, EntityTrait, QueryFilter,
    TransactionErrorExt, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use super::SessionView;
use crate::{auth::landing, error::PortalError, validation::ValidatedJson};

#[derive(Deserialize, Validate)]
pub(super) struct LoginRequest {
    address: Address,

    #[validate(length(equal = "db::challenge::NONCE_LENGTH"))]
    nonce: String,

    /// Hex-encoded 65 byte personal signature of the challenge message.
    #[validate(length(min = 130, max = 132))]
    signature: String,

    /// Preferred view. Never grants any access.
    #[serde(default)]
    role_hint: Option<Role>,
}

#[derive(Serialize)]
pub(super) struct LoginResponse {
    token: String,
    session: SessionView,
    landing: &'static str,
}

fn parse_signature(value: &str) -> Result<Signature, PortalError> {
    let bytes = hex::decode(value.trim_start_matches("0x"))
        .map_err(|_| PortalError::InvalidSignature)?;

    Signature::from_raw(&bytes).map_err(|_| PortalError::InvalidSignature)
}

pub(super) async fn login(
    State(db): State<Arc<DatabaseConnection>>,
    Extension(portal): Extension<Arc<Portal>>,
    Extension(config): Extension<Arc<Config>>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, PortalError> {
    let LoginRequest {
        address: account,
        nonce,
        signature,
        role_hint,
    } = request;

    let signature = parse_signature(&signature)?;
    let address = account.to_string();
    let previous_token =
        authorization.map(|TypedHeader(authorization)| authorization.token().to_owned());

    let token = db
        .transaction::<_, _, PortalError>(|txn| {
            Box::pin(async move {
                let challenge = challenge::Entity::find_by_id(nonce)
                    .filter(challenge::Column::Address.eq(&address))
                    .one(txn)
                    .await?
                    .ok_or(PortalError::ChallengeNotFound)?;

                if session::is_expired(
                    challenge.created_at,
                    Duration::seconds(config.session.challenge_lifespan),
                ) {
                    return Err(PortalError::ChallengeNotFound);
                }

                let signer = signature
                    .recover_address_from_msg(challenge.message())
                    .map_err(|_| PortalError::InvalidSignature)?;

                if signer != account {
                    return Err(PortalError::SignerMismatch);
                }

                challenge::Entity::delete_by_id(challenge.nonce)
                    .exec(txn)
                    .await?;

                // One session per browser context.
                if let Some(previous_token) = previous_token {
                    session::Entity::delete_many()
                        .filter(session::Column::Token.eq(previous_token))
                        .exec(txn)
                        .await?;
                }

                let (model, token) = session::generate_session(&address);
                session::Entity::insert(model)
                    .exec_without_returning(txn)
                    .await?;

                Ok(token)
            })
        })
        .await
        .into_raw_result()?;

    // Session stays valid if role resolution fails.
    let role = portal.role_of(account).await?;

    let landing = match role_hint {
        Some(hint) if role.has_role(hint) => landing(hint),
        Some(hint) => {
            debug!(?hint, ?role, "role hint ignored");
            landing(role)
        }
        None => landing(role),
    };

    info!(address = %account, ?role, "wallet connected");

    Ok(Json(LoginResponse {
        token,
        session: SessionView::connected(account.to_string(), role),
        landing,
    }))
}
