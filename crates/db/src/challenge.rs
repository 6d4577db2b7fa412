//! Wallet login challenge.
//!
//! Before a wallet session is created, the browser requests a challenge for
//! the connected account and signs its message. A challenge can be used
//! only once, and only within its configured lifespan.

use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};
use sea_orm::{entity::prelude::*, ActiveValue};
use time::{OffsetDateTime, PrimitiveDateTime};

pub const NONCE_LENGTH: usize = 32;

/// Login challenge model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "login_challenges")]
pub struct Model {
    /// Random challenge nonce.
    #[sea_orm(primary_key, auto_increment = false)]
    pub nonce: String,

    /// Checksummed address of the account that requested the challenge.
    pub address: String,

    /// Challenge creation timestamp.
    pub created_at: TimeDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Message to be signed by the wallet.
    pub fn message(&self) -> String {
        message(&self.nonce)
    }
}

/// Build the message to be signed for the provided nonce.
///
/// ## Example
///
/// ```
/// let message = db::challenge::message("abc");
/// assert!(message.ends_with("Nonce: abc"));
/// ```
pub fn message(nonce: &str) -> String {
    format!("Sign in to the seed traceability portal.\n\nNonce: {nonce}")
}

/// Generate new login challenge for the provided address.
///
/// This function returns both an [`ActiveModel`] of a challenge
/// and its nonce value.
pub fn generate_challenge(address: &str) -> (ActiveModel, String) {
    let nonce = Alphanumeric.sample_string(&mut thread_rng(), NONCE_LENGTH);

    let now = OffsetDateTime::now_utc();

    (
        ActiveModel {
            nonce: ActiveValue::Set(nonce.clone()),
            address: ActiveValue::Set(address.to_owned()),
            created_at: ActiveValue::Set(PrimitiveDateTime::new(now.date(), now.time())),
        },
        nonce,
    )
}
