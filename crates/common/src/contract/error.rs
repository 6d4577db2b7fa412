//! Contract failure taxonomy.
//!
//! Providers and wallets report failures as free-form text, so failures are
//! classified by inspecting that text. Each [`ErrorKind`] maps to a fixed
//! user-facing message, while the original text is preserved as details.

use std::fmt::{self, Display, Formatter};

use derive_more::{Display, Error, From};
use serde::Serialize;

use super::deployments::ContractKind;

/// Class of a failed wallet or contract interaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    WalletConnection,
    TransactionRejected,
    ContractExecution,
    Network,
    Unknown,
}

/// Text patterns checked in order, first match wins.
const PATTERNS: &[(ErrorKind, &[&str])] = &[
    (
        ErrorKind::TransactionRejected,
        &["User denied account access", "User rejected"],
    ),
    (ErrorKind::WalletConnection, &["MetaMask", "wallet", "ethereum"]),
    (
        ErrorKind::ContractExecution,
        &["execution reverted", "revert", "out of gas"],
    ),
    (ErrorKind::Network, &["network", "connection", "timeout"]),
];

impl ErrorKind {
    /// Classify failure text.
    ///
    /// ```
    /// use common::contract::ErrorKind;
    ///
    /// assert_eq!(
    ///     ErrorKind::classify("User rejected the request."),
    ///     ErrorKind::TransactionRejected
    /// );
    /// ```
    pub fn classify(text: &str) -> Self {
        PATTERNS
            .iter()
            .find(|(_, needles)| needles.iter().any(|needle| text.contains(needle)))
            .map(|(kind, _)| *kind)
            .unwrap_or(ErrorKind::Unknown)
    }

    /// User-facing message describing this failure class.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::WalletConnection => "There was an issue connecting to your wallet. Please make sure your wallet is installed and unlocked.",
            ErrorKind::TransactionRejected => "Transaction was rejected. Please approve the transaction in your wallet.",
            ErrorKind::ContractExecution => "The transaction could not be completed. This might be due to contract restrictions or insufficient gas.",
            ErrorKind::Network => "Network connection issue. Please check your internet connection and try again.",
            ErrorKind::Unknown => "An unexpected error occurred. Please try again later.",
        }
    }
}

/// Classified failure reported by a provider, a wallet or a contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainFailure {
    kind: ErrorKind,
    details: String,
}

impl ChainFailure {
    /// Create a new failure by classifying the provided text.
    pub fn classify<T: Into<String>>(details: T) -> Self {
        let details = details.into();

        Self {
            kind: ErrorKind::classify(&details),
            details,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Original failure text.
    pub fn details(&self) -> &str {
        &self.details
    }

    /// User-facing message.
    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

impl Display for ChainFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ChainFailure {}

/// Errors returned by the contract-access facade.
#[derive(Debug, Display, Error, From)]
pub enum ContractError {
    /// Provider, wallet or contract failure.
    Chain(ChainFailure),

    /// No deployed address is known for the provider's current network.
    ///
    /// Views depending on the contract can't be served until it is deployed.
    #[from(ignore)]
    #[display(
        fmt = "{} contract is not deployed to the detected network ({})",
        contract,
        network_id
    )]
    NotDeployed {
        contract: ContractKind,
        network_id: u64,
    },

    /// Required input value is empty.
    #[from(ignore)]
    #[display(fmt = "missing required field: {}", field)]
    MissingField { field: &'static str },

    /// Input value is present but unacceptable.
    #[from(ignore)]
    #[display(fmt = "invalid {}: {}", field, reason)]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    /// Contract response doesn't match the expected ABI.
    Decode(alloy::sol_types::Error),
}

impl ContractError {
    /// Failure class, if this is a provider, wallet or contract failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ContractError::Chain(failure) => Some(failure.kind()),
            _ => None,
        }
    }

    /// Check if this error disables dependent views until redeployment.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContractError::NotDeployed { .. })
    }
}
