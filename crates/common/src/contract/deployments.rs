//! Deployed contract addresses keyed by network identifier.
//!
//! Addresses are usually loaded from Truffle build artifacts, which record
//! every deployment in their `networks` section:
//!
//! ```json
//! { "networks": { "5777": { "address": "0x..." } } }
//! ```

use std::{
    collections::HashMap,
    fs,
    io::{self, ErrorKind},
    num::ParseIntError,
    path::Path,
};

use alloy::primitives::Address;
use derive_more::{Display, Error, From};
use serde::Deserialize;
use tracing::{debug, warn};

/// Portal contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum ContractKind {
    /// Seed registry, user management and dashboard metrics.
    AdminPortal,

    /// Customer profiles and purchases.
    UserPortal,
}

impl ContractKind {
    pub const ALL: [ContractKind; 2] = [ContractKind::AdminPortal, ContractKind::UserPortal];

    /// Name of the Truffle artifact file without extension.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ContractKind::AdminPortal => "AdminPortal",
            ContractKind::UserPortal => "UserPortal",
        }
    }
}

/// Errors that may occur while loading build artifacts.
#[derive(Debug, Display, Error, From)]
pub enum ArtifactError {
    Io(io::Error),
    Json(serde_json::Error),

    #[display(fmt = "invalid network identifier: {}", _0)]
    NetworkId(ParseIntError),
}

#[derive(Deserialize)]
struct Artifact {
    #[serde(default)]
    networks: HashMap<String, NetworkEntry>,
}

#[derive(Deserialize)]
struct NetworkEntry {
    address: Address,
}

/// Known contract deployments.
#[derive(Clone, Debug, Default)]
pub struct Deployments {
    addresses: HashMap<(ContractKind, u64), Address>,
}

impl Deployments {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register a deployment, consuming and returning `self`.
    pub fn with(mut self, contract: ContractKind, network_id: u64, address: Address) -> Self {
        self.insert(contract, network_id, address);
        self
    }

    pub fn insert(&mut self, contract: ContractKind, network_id: u64, address: Address) {
        self.addresses.insert((contract, network_id), address);
    }

    /// Get deployed address of a contract on the provided network.
    pub fn address(&self, contract: ContractKind, network_id: u64) -> Option<Address> {
        self.addresses.get(&(contract, network_id)).copied()
    }

    /// Load deployments from the Truffle artifacts directory.
    ///
    /// A missing artifact file is not an error: the contract is considered
    /// undeployed on every network.
    pub fn from_artifacts(dir: &Path) -> Result<Self, ArtifactError> {
        let mut deployments = Self::new();

        for contract in ContractKind::ALL {
            let path = dir.join(format!("{}.json", contract.artifact_name()));

            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    warn!(%contract, path = %path.display(), "contract artifact not found");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let artifact: Artifact = serde_json::from_str(&contents)?;

            for (network_id, entry) in artifact.networks {
                let network_id = network_id.parse()?;
                debug!(%contract, network_id, address = %entry.address, "found deployment");
                deployments.insert(contract, network_id, entry.address);
            }
        }

        Ok(deployments)
    }
}
