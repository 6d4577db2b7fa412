use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Portal access tier.
///
/// Roles form a partial order rather than a chain: producers and
/// distributors are incomparable, both sitting between customers and admins.
///
/// ```text
/// None < Customer < Producer    < Admin < SuperAdmin
///        Customer < Distributor < Admin
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    None,
    Customer,
    Producer,
    Distributor,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Tier of a role in the hierarchy. Roles with equal tiers are only
    /// comparable with themselves.
    fn tier(&self) -> u8 {
        match self {
            Role::None => 0,
            Role::Customer => 1,
            Role::Producer | Role::Distributor => 2,
            Role::Admin => 3,
            Role::SuperAdmin => 4,
        }
    }

    /// Check if this role grants access to views requiring the provided role.
    pub fn has_role(&self, required: Role) -> bool {
        *self >= required
    }

    /// Check if this role grants access to admin views.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Convert an `AdminPortal` role code.
    ///
    /// Contract doesn't know about super admins, since that role belongs
    /// to the contract owner only. Unknown codes are treated as no role.
    pub fn from_contract(code: u8) -> Role {
        match code {
            1 => Role::Admin,
            2 => Role::Producer,
            3 => Role::Distributor,
            4 => Role::Customer,
            _ => Role::None,
        }
    }

    /// Get an `AdminPortal` role code, if the role can be assigned to a user.
    pub fn contract_code(&self) -> Option<u8> {
        match self {
            Role::Admin => Some(1),
            Role::Producer => Some(2),
            Role::Distributor => Some(3),
            Role::Customer => Some(4),
            Role::None | Role::SuperAdmin => None,
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.tier().cmp(&other.tier()) {
            Ordering::Equal if self != other => None,
            ordering => Some(ordering),
        }
    }
}
