//! Access to the portal smart contracts.
//!
//! [`Portal`] resolves the deployed contract address for the network the
//! node is connected to on every operation, so a network switch is picked up
//! without restarting the service. Failures are classified into
//! [`ErrorKind`]s and logged with their original details.

mod bindings;
mod deployments;
mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod poller;
mod records;
mod role;
mod transport;

use std::sync::Arc;

use alloy::{
    primitives::{Address, TxHash, U256},
    sol_types::SolCall,
};
use futures_util::future::try_join_all;
use tracing::{debug, warn};

pub use bindings::{AdminPortal, UserPortal};
pub use deployments::{ArtifactError, ContractKind, Deployments};
pub use error::{ChainFailure, ContractError, ErrorKind};
pub use records::{
    checksummed, DashboardMetrics, NewUser, Profile, ProfileDetails, Purchase, PurchaseStatus,
    Seed, SeedRegistration, UserRecord,
};
pub use role::Role;
pub use transport::{RpcTransport, Transport};

use records::require;

/// Contract-access facade.
#[derive(Clone)]
pub struct Portal {
    transport: Arc<dyn Transport>,
    deployments: Deployments,
}

impl Portal {
    pub fn new(transport: Arc<dyn Transport>, deployments: Deployments) -> Self {
        Self {
            transport,
            deployments,
        }
    }

    /// Identifier of the network the node is currently connected to.
    pub async fn network_id(&self) -> Result<u64, ContractError> {
        Ok(self.transport.network_id().await?)
    }

    /// Resolve the deployed address of a contract on the current network.
    pub async fn address(&self, contract: ContractKind) -> Result<Address, ContractError> {
        let network_id = self.network_id().await?;

        self.deployments
            .address(contract, network_id)
            .ok_or(ContractError::NotDeployed {
                contract,
                network_id,
            })
    }

    async fn call<C: SolCall + Send>(
        &self,
        contract: ContractKind,
        call: C,
    ) -> Result<C::Return, ContractError> {
        let to = self.address(contract).await?;

        let data = self
            .transport
            .call(to, call.abi_encode().into())
            .await
            .map_err(|failure| log_failure(contract, C::SIGNATURE, failure))?;

        Ok(C::abi_decode_returns(&data)?)
    }

    async fn send<C: SolCall + Send>(
        &self,
        contract: ContractKind,
        from: Address,
        call: C,
    ) -> Result<TxHash, ContractError> {
        let to = self.address(contract).await?;

        let hash = self
            .transport
            .send(from, to, call.abi_encode().into())
            .await
            .map_err(|failure| log_failure(contract, C::SIGNATURE, failure))?;

        debug!(%contract, method = C::SIGNATURE, %from, %hash, "transaction mined");

        Ok(hash)
    }

    /// Address of the `AdminPortal` owner.
    pub async fn owner(&self) -> Result<Address, ContractError> {
        self.call(ContractKind::AdminPortal, AdminPortal::ownerCall {})
            .await
    }

    /// Resolve the role of an account.
    ///
    /// The contract owner is a super admin. Otherwise the role assigned in
    /// `AdminPortal` is used, unless the user is locked. Accounts registered
    /// in `UserPortal` only are customers.
    pub async fn role_of(&self, account: Address) -> Result<Role, ContractError> {
        if self.owner().await? == account {
            return Ok(Role::SuperAdmin);
        }

        let user = self
            .call(ContractKind::AdminPortal, AdminPortal::usersCall { account })
            .await?;

        let role = Role::from_contract(user.role);

        if role != Role::None {
            return Ok(if user.isActive { role } else { Role::None });
        }

        match self.is_registered(account).await {
            Ok(true) => Ok(Role::Customer),
            Ok(false) => Ok(Role::None),
            // Admin views stay usable without the customer contract.
            Err(err @ ContractError::NotDeployed { .. }) => {
                warn!(%err, %account, "unable to check customer registration");
                Ok(Role::None)
            }
            Err(err) => Err(err),
        }
    }

    /// Register a new seed lot.
    pub async fn register_seed(
        &self,
        from: Address,
        seed: SeedRegistration,
    ) -> Result<TxHash, ContractError> {
        seed.check()?;

        self.send(ContractKind::AdminPortal, from, seed.into_call())
            .await
    }

    /// Find a seed lot by its identifier.
    ///
    /// The contract reverts for unknown identifiers, which is reported as
    /// `None` rather than as a failure.
    pub async fn search_seed(&self, seed_id: &str) -> Result<Option<Seed>, ContractError> {
        require("seed_id", seed_id)?;

        let result = self
            .call(
                ContractKind::AdminPortal,
                AdminPortal::searchSeedCall {
                    seedID: seed_id.to_owned(),
                },
            )
            .await;

        match result {
            Ok(seed) if seed.seedID.is_empty() => Ok(None),
            Ok(seed) => Ok(Some(seed.into())),
            Err(ContractError::Chain(failure)) if failure.kind() == ErrorKind::ContractExecution => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Every registered seed lot, in registration order.
    pub async fn seeds(&self) -> Result<Vec<Seed>, ContractError> {
        let ids = self
            .call(ContractKind::AdminPortal, AdminPortal::seedListCall {})
            .await?;

        let seeds = try_join_all(ids.into_iter().map(|seed_id| {
            self.call(ContractKind::AdminPortal, AdminPortal::searchSeedCall { seedID: seed_id })
        }))
        .await?;

        Ok(seeds.into_iter().map(Seed::from).collect())
    }

    /// Seed inventory totals.
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, ContractError> {
        let metrics = self
            .call(
                ContractKind::AdminPortal,
                AdminPortal::getDashboardMetricsCall {},
            )
            .await?;

        Ok(metrics.into())
    }

    /// Every user managed in `AdminPortal`.
    pub async fn users(&self) -> Result<Vec<UserRecord>, ContractError> {
        let addresses = self
            .call(ContractKind::AdminPortal, AdminPortal::userListCall {})
            .await?;

        let users = try_join_all(addresses.into_iter().map(|account| async move {
            let user = self
                .call(ContractKind::AdminPortal, AdminPortal::usersCall { account })
                .await?;

            Ok::<_, ContractError>(UserRecord {
                address: account,
                name: user.name,
                role: Role::from_contract(user.role),
                is_active: user.isActive,
            })
        }))
        .await?;

        Ok(users)
    }

    /// Add a user with the provided role.
    pub async fn add_user(&self, from: Address, user: NewUser) -> Result<TxHash, ContractError> {
        user.check()?;

        let role = user.role.contract_code().ok_or(ContractError::InvalidField {
            field: "role",
            reason: "role can't be assigned to a user",
        })?;

        self.send(
            ContractKind::AdminPortal,
            from,
            AdminPortal::addUserCall {
                account: user.address,
                name: user.name,
                role,
            },
        )
        .await
    }

    /// Lock or unlock a user.
    pub async fn set_user_active(
        &self,
        from: Address,
        account: Address,
        active: bool,
    ) -> Result<TxHash, ContractError> {
        self.send(
            ContractKind::AdminPortal,
            from,
            AdminPortal::lockUnlockUserCall { account, active },
        )
        .await
    }

    /// Check if an account is registered as a customer.
    pub async fn is_registered(&self, account: Address) -> Result<bool, ContractError> {
        self.call(
            ContractKind::UserPortal,
            UserPortal::isRegisteredCall { account },
        )
        .await
    }

    /// Register the sending account as a customer.
    pub async fn register_customer(
        &self,
        from: Address,
        details: ProfileDetails,
    ) -> Result<TxHash, ContractError> {
        details.check()?;

        self.send(
            ContractKind::UserPortal,
            from,
            UserPortal::registerUserCall {
                name: details.name,
                email: details.email,
                physicalAddress: details.physical_address,
                phone: details.phone,
            },
        )
        .await
    }

    /// Get the customer profile of an account, if one is registered.
    pub async fn profile(&self, account: Address) -> Result<Option<Profile>, ContractError> {
        if !self.is_registered(account).await? {
            return Ok(None);
        }

        let profile = self
            .call(
                ContractKind::UserPortal,
                UserPortal::getProfileCall { account },
            )
            .await?;

        Ok(Some(profile.into()))
    }

    /// Update the customer profile of the sending account.
    pub async fn update_profile(
        &self,
        from: Address,
        details: ProfileDetails,
    ) -> Result<TxHash, ContractError> {
        details.check()?;

        self.send(
            ContractKind::UserPortal,
            from,
            UserPortal::updateProfileCall {
                name: details.name,
                email: details.email,
                physicalAddress: details.physical_address,
                phone: details.phone,
            },
        )
        .await
    }

    /// Purchase a seed lot quantity.
    pub async fn create_purchase(
        &self,
        from: Address,
        seed_id: &str,
        quantity: u64,
    ) -> Result<TxHash, ContractError> {
        require("seed_id", seed_id)?;

        if quantity == 0 {
            return Err(ContractError::InvalidField {
                field: "quantity",
                reason: "must be greater than zero",
            });
        }

        self.send(
            ContractKind::UserPortal,
            from,
            UserPortal::createPurchaseCall {
                seedId: seed_id.to_owned(),
                quantity: U256::from(quantity),
            },
        )
        .await
    }

    /// Cancel a pending purchase of the sending account.
    pub async fn cancel_purchase(
        &self,
        from: Address,
        purchase_id: u64,
    ) -> Result<TxHash, ContractError> {
        self.send(
            ContractKind::UserPortal,
            from,
            UserPortal::cancelPurchaseCall {
                purchaseId: U256::from(purchase_id),
            },
        )
        .await
    }

    /// Every purchase made by an account.
    pub async fn purchases(&self, buyer: Address) -> Result<Vec<Purchase>, ContractError> {
        let purchases = self
            .call(
                ContractKind::UserPortal,
                UserPortal::getPurchasesCall { buyer },
            )
            .await?;

        Ok(purchases.into_iter().map(Purchase::from).collect())
    }
}

fn log_failure(contract: ContractKind, method: &str, failure: ChainFailure) -> ChainFailure {
    warn!(
        %contract,
        method,
        kind = ?failure.kind(),
        details = failure.details(),
        "contract interaction failed"
    );

    failure
}
