use alloy::primitives::TxHash;
use serde::Serialize;

/// Admin views: dashboard, seed registry and user management.
pub(crate) mod admin;

/// Wallet login, logout and session state routes.
pub(crate) mod session;

/// Customer views: seed catalog, purchases, profile and registration.
pub(crate) mod user;

/// Response of routes that submit a contract transaction.
#[derive(Serialize)]
pub(crate) struct TransactionResponse {
    transaction_hash: TxHash,
}

impl From<TxHash> for TransactionResponse {
    fn from(transaction_hash: TxHash) -> Self {
        Self { transaction_hash }
    }
}
