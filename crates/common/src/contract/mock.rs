//! In-memory portal contracts for tests.
//!
//! [`MockChain`] decodes calldata by method selector and emulates the
//! contract rules closely enough for the facade and the HTTP layer to be
//! exercised without a node.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use alloy::{
    primitives::{address, keccak256, Address, Bytes, TxHash, U256},
    sol_types::{SolCall, SolInterface},
};
use async_trait::async_trait;

use super::{
    bindings::{
        AdminPortal::{self, AdminPortalCalls},
        UserPortal::{self, UserPortalCalls},
    },
    deployments::{ContractKind, Deployments},
    error::ChainFailure,
    records::{Profile, Purchase, PurchaseStatus, Seed},
    role::Role,
    transport::Transport,
    Portal,
};

/// Network identifier of a local development chain.
pub const NETWORK_ID: u64 = 5777;

pub const ADMIN_PORTAL: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const USER_PORTAL: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");

/// Default contract owner.
pub const OWNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

#[derive(Clone)]
struct UserEntry {
    name: String,
    role: u8,
    active: bool,
}

struct State {
    owner: Address,
    seeds: Vec<Seed>,
    users: Vec<(Address, UserEntry)>,
    profiles: HashMap<Address, Profile>,
    purchases: Vec<(Address, Purchase)>,
    now: u64,
    failure: Option<String>,
    calls: HashMap<[u8; 4], usize>,
}

impl State {
    fn is_admin(&self, account: Address) -> bool {
        account == self.owner
            || self.user(account).is_some_and(|user| {
                user.active && Some(user.role) == Role::Admin.contract_code()
            })
    }

    fn user(&self, account: Address) -> Option<&UserEntry> {
        self.users
            .iter()
            .find(|(address, _)| *address == account)
            .map(|(_, user)| user)
    }

    fn seed_mut(&mut self, seed_id: &str) -> Option<&mut Seed> {
        self.seeds.iter_mut().find(|seed| seed.seed_id == seed_id)
    }

    fn take_failure(&mut self) -> Result<(), ChainFailure> {
        match self.failure.take() {
            Some(text) => Err(ChainFailure::classify(text)),
            None => Ok(()),
        }
    }
}

fn revert(reason: impl std::fmt::Display) -> ChainFailure {
    ChainFailure::classify(format!("execution reverted: {reason}"))
}

fn ensure(condition: bool, reason: &str) -> Result<(), ChainFailure> {
    if condition {
        Ok(())
    } else {
        Err(revert(reason))
    }
}

fn selector(data: &[u8]) -> Result<[u8; 4], ChainFailure> {
    data.get(..4)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| revert("missing method selector"))
}

fn encode<C: SolCall>(value: &C::Return) -> Result<Bytes, ChainFailure> {
    Ok(C::abi_encode_returns(value).into())
}

/// In-memory `AdminPortal` and `UserPortal` deployment.
pub struct MockChain {
    network_id: AtomicU64,
    transactions: AtomicU64,
    state: Mutex<State>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    /// Create an empty chain owned by [`OWNER`].
    pub fn new() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or_default();

        Self {
            network_id: AtomicU64::new(NETWORK_ID),
            transactions: AtomicU64::new(0),
            state: Mutex::new(State {
                owner: OWNER,
                seeds: Vec::new(),
                users: Vec::new(),
                profiles: HashMap::new(),
                purchases: Vec::new(),
                now,
                failure: None,
                calls: HashMap::new(),
            }),
        }
    }

    /// Deployments of both contracts on [`NETWORK_ID`].
    pub fn deployments() -> Deployments {
        Deployments::new()
            .with(ContractKind::AdminPortal, NETWORK_ID, ADMIN_PORTAL)
            .with(ContractKind::UserPortal, NETWORK_ID, USER_PORTAL)
    }

    /// Create a facade backed by this chain.
    pub fn portal(self: &Arc<Self>) -> Portal {
        Portal::new(self.clone(), Self::deployments())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn owner(&self) -> Address {
        self.lock().owner
    }

    /// Switch the node to another network.
    pub fn set_network_id(&self, network_id: u64) {
        self.network_id.store(network_id, Ordering::SeqCst);
    }

    /// Fail the next call or transaction with the provided text.
    pub fn fail_next(&self, text: &str) {
        self.lock().failure = Some(text.to_owned());
    }

    /// Set the current block timestamp.
    pub fn set_time(&self, timestamp: u64) {
        self.lock().now = timestamp;
    }

    pub fn now(&self) -> u64 {
        self.lock().now
    }

    /// Number of mined transactions.
    pub fn transactions(&self) -> u64 {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Number of read-only calls made to the provided method.
    pub fn calls<C: SolCall>(&self) -> usize {
        self.lock().calls.get(&C::SELECTOR).copied().unwrap_or_default()
    }

    pub fn insert_seed(&self, seed: Seed) {
        self.lock().seeds.push(seed);
    }

    pub fn insert_user(&self, account: Address, name: &str, role: Role, active: bool) {
        self.lock().users.push((
            account,
            UserEntry {
                name: name.to_owned(),
                role: role.contract_code().unwrap_or_default(),
                active,
            },
        ));
    }

    pub fn insert_profile(&self, account: Address, name: &str, email: &str) {
        let mut state = self.lock();
        let registered_at = state.now;

        state.profiles.insert(
            account,
            Profile {
                name: name.to_owned(),
                email: email.to_owned(),
                physical_address: String::new(),
                phone: String::new(),
                registered_at,
            },
        );
    }

    pub fn insert_purchase(&self, buyer: Address, purchase: Purchase) {
        self.lock().purchases.push((buyer, purchase));
    }

    /// Change the status of a purchase, as a distributor would.
    pub fn set_purchase_status(&self, purchase_id: u64, status: PurchaseStatus) {
        let mut state = self.lock();
        let now = state.now;

        if let Some((_, purchase)) = state
            .purchases
            .iter_mut()
            .find(|(_, purchase)| purchase.purchase_id == purchase_id)
        {
            purchase.status = status;
            purchase.updated_at = now;
        }
    }

    fn view(&self, to: Address, data: &[u8]) -> Result<Bytes, ChainFailure> {
        let mut state = self.lock();
        state.take_failure()?;
        *state.calls.entry(selector(data)?).or_default() += 1;

        if to == ADMIN_PORTAL {
            match AdminPortalCalls::abi_decode(data).map_err(revert)? {
                AdminPortalCalls::owner(_) => encode::<AdminPortal::ownerCall>(&state.owner),
                AdminPortalCalls::searchSeed(call) => {
                    let seed = state
                        .seeds
                        .iter()
                        .find(|seed| seed.seed_id == call.seedID)
                        .ok_or_else(|| revert("Seed not found"))?;

                    encode::<AdminPortal::searchSeedCall>(&seed.clone().into())
                }
                AdminPortalCalls::seedList(_) => {
                    let ids = state.seeds.iter().map(|seed| seed.seed_id.clone()).collect();
                    encode::<AdminPortal::seedListCall>(&ids)
                }
                AdminPortalCalls::getDashboardMetrics(_) => {
                    let metrics = AdminPortal::getDashboardMetricsReturn {
                        totalVarieties: U256::from(state.seeds.len()),
                        totalQuantity: state.seeds.iter().fold(U256::ZERO, |total, seed| {
                            total + U256::from(seed.quantity)
                        }),
                        totalCost: state.seeds.iter().fold(U256::ZERO, |total, seed| {
                            total + U256::from(seed.quantity) * U256::from(seed.price_per_unit)
                        }),
                    };

                    encode::<AdminPortal::getDashboardMetricsCall>(&metrics)
                }
                AdminPortalCalls::userList(_) => {
                    let addresses = state.users.iter().map(|(address, _)| *address).collect();
                    encode::<AdminPortal::userListCall>(&addresses)
                }
                AdminPortalCalls::users(call) => {
                    // Unknown accounts read as zeroed storage.
                    let user = state.user(call.account).cloned().unwrap_or(UserEntry {
                        name: String::new(),
                        role: 0,
                        active: false,
                    });

                    encode::<AdminPortal::usersCall>(&AdminPortal::usersReturn {
                        name: user.name,
                        role: user.role,
                        isActive: user.active,
                    })
                }
                _ => Err(revert("method is not a view")),
            }
        } else if to == USER_PORTAL {
            match UserPortalCalls::abi_decode(data).map_err(revert)? {
                UserPortalCalls::isRegistered(call) => encode::<UserPortal::isRegisteredCall>(
                    &state.profiles.contains_key(&call.account),
                ),
                UserPortalCalls::getProfile(call) => {
                    let profile = state
                        .profiles
                        .get(&call.account)
                        .cloned()
                        .ok_or_else(|| revert("User not registered"))?;

                    encode::<UserPortal::getProfileCall>(&profile.into())
                }
                UserPortalCalls::getPurchases(call) => {
                    let purchases = state
                        .purchases
                        .iter()
                        .filter(|(buyer, _)| *buyer == call.buyer)
                        .map(|(_, purchase)| purchase.clone().into())
                        .collect();

                    encode::<UserPortal::getPurchasesCall>(&purchases)
                }
                _ => Err(revert("method is not a view")),
            }
        } else {
            Err(revert("no contract at address"))
        }
    }

    fn execute(&self, from: Address, to: Address, data: &[u8]) -> Result<(), ChainFailure> {
        let mut state = self.lock();
        state.take_failure()?;

        if to == ADMIN_PORTAL {
            ensure(state.is_admin(from), "Only admin can perform this action")?;

            match AdminPortalCalls::abi_decode(data).map_err(revert)? {
                AdminPortalCalls::addSeed(call) => {
                    ensure(
                        !state.seeds.iter().any(|seed| seed.seed_id == call.seedID),
                        "Seed already exists",
                    )?;

                    state.seeds.push(
                        AdminPortal::Seed {
                            seedID: call.seedID,
                            cropName: call.cropName,
                            variety: call.variety,
                            lotNumber: call.lotNumber,
                            certificationType: call.certificationType,
                            tagNumber: call.tagNumber,
                            quantity: call.quantity,
                            pricePerUnit: call.pricePerUnit,
                            status: String::from("Available"),
                        }
                        .into(),
                    );
                }
                AdminPortalCalls::addUser(call) => {
                    ensure(state.user(call.account).is_none(), "User already exists")?;

                    state.users.push((
                        call.account,
                        UserEntry {
                            name: call.name,
                            role: call.role,
                            active: true,
                        },
                    ));
                }
                AdminPortalCalls::lockUnlockUser(call) => {
                    let (_, user) = state
                        .users
                        .iter_mut()
                        .find(|(address, _)| *address == call.account)
                        .ok_or_else(|| revert("User does not exist"))?;

                    user.active = call.active;
                }
                _ => return Err(revert("method is a view")),
            }
        } else if to == USER_PORTAL {
            let now = state.now;

            match UserPortalCalls::abi_decode(data).map_err(revert)? {
                UserPortalCalls::registerUser(call) => {
                    ensure(!state.profiles.contains_key(&from), "User already registered")?;

                    state.profiles.insert(
                        from,
                        Profile {
                            name: call.name,
                            email: call.email,
                            physical_address: call.physicalAddress,
                            phone: call.phone,
                            registered_at: now,
                        },
                    );
                }
                UserPortalCalls::updateProfile(call) => {
                    let profile = state
                        .profiles
                        .get_mut(&from)
                        .ok_or_else(|| revert("User not registered"))?;

                    profile.name = call.name;
                    profile.email = call.email;
                    profile.physical_address = call.physicalAddress;
                    profile.phone = call.phone;
                }
                UserPortalCalls::createPurchase(call) => {
                    ensure(state.profiles.contains_key(&from), "User not registered")?;

                    let quantity =
                        u64::try_from(call.quantity).map_err(|_| revert("Invalid quantity"))?;
                    let seed = state
                        .seed_mut(&call.seedId)
                        .ok_or_else(|| revert("Seed not found"))?;
                    ensure(seed.quantity >= quantity, "Insufficient quantity")?;
                    seed.quantity -= quantity;

                    let purchase_id = state.purchases.len() as u64 + 1;
                    state.purchases.push((
                        from,
                        Purchase {
                            purchase_id,
                            seed_id: call.seedId,
                            quantity,
                            status: PurchaseStatus::Pending,
                            created_at: now,
                            updated_at: now,
                        },
                    ));
                }
                UserPortalCalls::cancelPurchase(call) => {
                    let purchase_id = u64::try_from(call.purchaseId)
                        .map_err(|_| revert("Purchase not found"))?;

                    let (_, purchase) = state
                        .purchases
                        .iter_mut()
                        .find(|(buyer, purchase)| {
                            *buyer == from && purchase.purchase_id == purchase_id
                        })
                        .ok_or_else(|| revert("Purchase not found"))?;
                    ensure(
                        purchase.status == PurchaseStatus::Pending,
                        "Only pending purchases can be cancelled",
                    )?;

                    purchase.status = PurchaseStatus::Cancelled;
                    purchase.updated_at = now;

                    let (seed_id, quantity) = (purchase.seed_id.clone(), purchase.quantity);
                    if let Some(seed) = state.seed_mut(&seed_id) {
                        seed.quantity += quantity;
                    }
                }
                _ => return Err(revert("method is a view")),
            }
        } else {
            return Err(revert("no contract at address"));
        }

        Ok(())
    }
}

#[async_trait]
impl Transport for MockChain {
    async fn network_id(&self) -> Result<u64, ChainFailure> {
        Ok(self.network_id.load(Ordering::SeqCst))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainFailure> {
        self.view(to, &data)
    }

    async fn send(&self, from: Address, to: Address, data: Bytes) -> Result<TxHash, ChainFailure> {
        self.execute(from, to, &data)?;

        let nonce = self.transactions.fetch_add(1, Ordering::SeqCst);
        Ok(keccak256(nonce.to_be_bytes()))
    }
}
