//! Plain records exchanged with the portal contracts.

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    bindings::{AdminPortal, UserPortal},
    error::ContractError,
    role::Role,
};

/// Serialize addresses in their EIP-55 checksummed form.
pub mod checksummed {
    use std::str::FromStr;

    use alloy::primitives::Address;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(address)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let value = String::deserialize(deserializer)?;
        Address::from_str(&value).map_err(de::Error::custom)
    }
}

/// Convert a contract integer, saturating values that don't fit.
pub(crate) fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Check that a required text value is not blank.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        Err(ContractError::MissingField { field })
    } else {
        Ok(())
    }
}

/// Registered seed lot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub seed_id: String,
    pub crop_name: String,
    pub variety: String,
    pub lot_number: String,
    pub certification_type: String,
    pub tag_number: String,
    pub quantity: u64,
    pub price_per_unit: u64,
    pub status: String,
}

impl From<AdminPortal::Seed> for Seed {
    fn from(seed: AdminPortal::Seed) -> Self {
        Self {
            seed_id: seed.seedID,
            crop_name: seed.cropName,
            variety: seed.variety,
            lot_number: seed.lotNumber,
            certification_type: seed.certificationType,
            tag_number: seed.tagNumber,
            quantity: to_u64(seed.quantity),
            price_per_unit: to_u64(seed.pricePerUnit),
            status: seed.status,
        }
    }
}

impl From<Seed> for AdminPortal::Seed {
    fn from(seed: Seed) -> Self {
        Self {
            seedID: seed.seed_id,
            cropName: seed.crop_name,
            variety: seed.variety,
            lotNumber: seed.lot_number,
            certificationType: seed.certification_type,
            tagNumber: seed.tag_number,
            quantity: U256::from(seed.quantity),
            pricePerUnit: U256::from(seed.price_per_unit),
            status: seed.status,
        }
    }
}

/// New seed lot registration form.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct SeedRegistration {
    #[validate(length(min = 1))]
    pub seed_id: String,

    #[validate(length(min = 1))]
    pub crop_name: String,

    #[validate(length(min = 1))]
    pub variety: String,

    #[validate(length(min = 1))]
    pub lot_number: String,

    #[validate(length(min = 1))]
    pub certification_type: String,

    #[validate(length(min = 1))]
    pub tag_number: String,

    #[validate(range(min = 1))]
    pub quantity: u64,

    #[validate(range(min = 1))]
    pub price_per_unit: u64,
}

impl SeedRegistration {
    /// Check that every field of the registration form is filled in.
    pub fn check(&self) -> Result<(), ContractError> {
        require("seed_id", &self.seed_id)?;
        require("crop_name", &self.crop_name)?;
        require("variety", &self.variety)?;
        require("lot_number", &self.lot_number)?;
        require("certification_type", &self.certification_type)?;
        require("tag_number", &self.tag_number)?;

        if self.quantity == 0 {
            return Err(ContractError::MissingField { field: "quantity" });
        }

        if self.price_per_unit == 0 {
            return Err(ContractError::MissingField {
                field: "price_per_unit",
            });
        }

        Ok(())
    }

    pub(crate) fn into_call(self) -> AdminPortal::addSeedCall {
        AdminPortal::addSeedCall {
            seedID: self.seed_id,
            cropName: self.crop_name,
            variety: self.variety,
            lotNumber: self.lot_number,
            certificationType: self.certification_type,
            tagNumber: self.tag_number,
            quantity: U256::from(self.quantity),
            pricePerUnit: U256::from(self.price_per_unit),
        }
    }
}

/// Portal user managed by admins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    #[serde(with = "checksummed")]
    pub address: Address,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
}

/// New portal user form.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct NewUser {
    #[serde(with = "checksummed")]
    pub address: Address,

    #[validate(length(min = 1))]
    pub name: String,

    pub role: Role,
}

impl NewUser {
    pub fn check(&self) -> Result<(), ContractError> {
        require("name", &self.name)?;

        if self.role.contract_code().is_none() {
            return Err(ContractError::InvalidField {
                field: "role",
                reason: "role can't be assigned to a user",
            });
        }

        if self.address == Address::ZERO {
            return Err(ContractError::MissingField { field: "address" });
        }

        Ok(())
    }
}

/// Purchase lifecycle state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl PurchaseStatus {
    /// Convert a `UserPortal` status code. Unknown codes are treated as pending.
    pub fn from_contract(code: u8) -> Self {
        match code {
            1 => PurchaseStatus::InTransit,
            2 => PurchaseStatus::Delivered,
            3 => PurchaseStatus::Cancelled,
            _ => PurchaseStatus::Pending,
        }
    }

    pub fn contract_code(&self) -> u8 {
        match self {
            PurchaseStatus::Pending => 0,
            PurchaseStatus::InTransit => 1,
            PurchaseStatus::Delivered => 2,
            PurchaseStatus::Cancelled => 3,
        }
    }
}

impl FromStr for PurchaseStatus {
    type Err = ContractError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Ok(PurchaseStatus::Pending),
            "in_transit" => Ok(PurchaseStatus::InTransit),
            "delivered" => Ok(PurchaseStatus::Delivered),
            "cancelled" => Ok(PurchaseStatus::Cancelled),
            _ => Err(ContractError::InvalidField {
                field: "status",
                reason: "unknown purchase status",
            }),
        }
    }
}

/// Seed purchase made by a customer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Purchase {
    pub purchase_id: u64,
    pub seed_id: String,
    pub quantity: u64,
    pub status: PurchaseStatus,

    /// UNIX timestamp of purchase creation, in seconds.
    pub created_at: u64,

    /// UNIX timestamp of the last status change, in seconds.
    pub updated_at: u64,
}

impl From<UserPortal::Purchase> for Purchase {
    fn from(purchase: UserPortal::Purchase) -> Self {
        Self {
            purchase_id: to_u64(purchase.purchaseId),
            seed_id: purchase.seedId,
            quantity: to_u64(purchase.quantity),
            status: PurchaseStatus::from_contract(purchase.status),
            created_at: to_u64(purchase.createdAt),
            updated_at: to_u64(purchase.updatedAt),
        }
    }
}

impl From<Purchase> for UserPortal::Purchase {
    fn from(purchase: Purchase) -> Self {
        Self {
            purchaseId: U256::from(purchase.purchase_id),
            seedId: purchase.seed_id,
            quantity: U256::from(purchase.quantity),
            status: purchase.status.contract_code(),
            createdAt: U256::from(purchase.created_at),
            updatedAt: U256::from(purchase.updated_at),
        }
    }
}

/// Customer profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub physical_address: String,
    pub phone: String,

    /// UNIX timestamp of customer registration, in seconds.
    pub registered_at: u64,
}

impl From<UserPortal::Profile> for Profile {
    fn from(profile: UserPortal::Profile) -> Self {
        Self {
            name: profile.name,
            email: profile.email,
            physical_address: profile.physicalAddress,
            phone: profile.phone,
            registered_at: to_u64(profile.registeredAt),
        }
    }
}

impl From<Profile> for UserPortal::Profile {
    fn from(profile: Profile) -> Self {
        Self {
            name: profile.name,
            email: profile.email,
            physicalAddress: profile.physical_address,
            phone: profile.phone,
            registeredAt: U256::from(profile.registered_at),
        }
    }
}

/// Editable part of a customer profile.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ProfileDetails {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[serde(default)]
    pub physical_address: String,

    #[serde(default)]
    pub phone: String,
}

impl ProfileDetails {
    pub fn check(&self) -> Result<(), ContractError> {
        require("name", &self.name)?;
        require("email", &self.email)
    }
}

/// Seed inventory totals.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    pub total_varieties: u64,
    pub total_quantity: u64,
    pub total_cost: u64,
}

impl From<AdminPortal::getDashboardMetricsReturn> for DashboardMetrics {
    fn from(metrics: AdminPortal::getDashboardMetricsReturn) -> Self {
        Self {
            total_varieties: to_u64(metrics.totalVarieties),
            total_quantity: to_u64(metrics.totalQuantity),
            total_cost: to_u64(metrics.totalCost),
        }
    }
}
