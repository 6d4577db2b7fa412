use axum::{extract::rejection::JsonRejection, http::StatusCode};
use axum_derive_error::ErrorResponse;
use common::contract::{ChainFailure, ContractError, ContractKind, ErrorKind};
use db::DbErr;
use derive_more::{Display, Error, From};

/// Errors returned by portal routes.
///
/// Wallet and contract failures are reported with their user-facing message,
/// original failure details are only logged.
#[derive(ErrorResponse, Display, From, Error)]
pub(crate) enum PortalError {
    DatabaseError(DbErr),
    DecodeError(alloy::sol_types::Error),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "malformed request body: {}", _0)]
    MalformedJson(JsonRejection),

    #[from(ignore)]
    #[status(StatusCode::SERVICE_UNAVAILABLE)]
    #[display(
        fmt = "{} contract is not deployed to the detected network ({})",
        contract,
        network_id
    )]
    NotDeployed {
        contract: ContractKind,
        network_id: u64,
    },

    #[from(ignore)]
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "missing required field: {}", field)]
    MissingField { field: &'static str },

    #[from(ignore)]
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "invalid {}: {}", field, reason)]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    #[from(ignore)]
    #[status(StatusCode::FORBIDDEN)]
    TransactionRejected(ChainFailure),

    #[from(ignore)]
    #[status(StatusCode::BAD_GATEWAY)]
    WalletConnection(ChainFailure),

    #[from(ignore)]
    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    ContractExecution(ChainFailure),

    #[from(ignore)]
    #[status(StatusCode::BAD_GATEWAY)]
    Network(ChainFailure),

    #[from(ignore)]
    #[status(StatusCode::INTERNAL_SERVER_ERROR)]
    Unknown(ChainFailure),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "seed lot was not found")]
    SeedNotFound,

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "customer profile was not found")]
    ProfileNotFound,

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "login challenge was not found or has expired")]
    ChallengeNotFound,

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "invalid signature")]
    InvalidSignature,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "signature doesn't belong to the provided address")]
    SignerMismatch,
}

impl From<ContractError> for PortalError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::Chain(failure) => match failure.kind() {
                ErrorKind::TransactionRejected => PortalError::TransactionRejected(failure),
                ErrorKind::WalletConnection => PortalError::WalletConnection(failure),
                ErrorKind::ContractExecution => PortalError::ContractExecution(failure),
                ErrorKind::Network => PortalError::Network(failure),
                ErrorKind::Unknown => PortalError::Unknown(failure),
            },
            ContractError::NotDeployed {
                contract,
                network_id,
            } => PortalError::NotDeployed {
                contract,
                network_id,
            },
            ContractError::MissingField { field } => PortalError::MissingField { field },
            ContractError::InvalidField { field, reason } => {
                PortalError::InvalidField { field, reason }
            }
            ContractError::Decode(err) => PortalError::DecodeError(err),
        }
    }
}
