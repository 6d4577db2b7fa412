//! Wallet session.
//!
//! Session token is passed to an API server to identify the account
//! that executes the request. Only the account address is stored: its role
//! is resolved from the portal contracts on every request.
//!
//! Session tokens are to have their length equal to the [`TOKEN_LENGTH`] value.

use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};
use sea_orm::{entity::prelude::*, ActiveValue};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

pub const TOKEN_LENGTH: usize = 64;

/// Wallet session model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Unique session identifier.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Checksummed address of the connected account.
    pub address: String,

    /// Session token string value.
    pub token: String,

    /// Session creation timestamp.
    pub created_at: TimeDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Generate new session for the provided address.
///
/// This function returns both an [`ActiveModel`] of a session
/// and its token string value.
///
/// ## Example
///
/// ```
/// use db::session::{TOKEN_LENGTH, generate_session};
///
/// let (_, token) = generate_session("0x0000000000000000000000000000000000000001");
/// assert_eq!(token.len(), TOKEN_LENGTH);
/// ```
pub fn generate_session(address: &str) -> (ActiveModel, String) {
    let token = Alphanumeric.sample_string(&mut thread_rng(), TOKEN_LENGTH);

    let now = OffsetDateTime::now_utc();

    (
        ActiveModel {
            address: ActiveValue::Set(address.to_owned()),
            token: ActiveValue::Set(token.clone()),
            created_at: ActiveValue::Set(PrimitiveDateTime::new(now.date(), now.time())),
            ..Default::default()
        },
        token,
    )
}

/// Check if a record created at the provided timestamp outlived its lifespan.
pub fn is_expired(created_at: PrimitiveDateTime, lifespan: Duration) -> bool {
    created_at.assume_utc() + lifespan < OffsetDateTime::now_utc()
}

/// Creation timestamp before which records with the provided lifespan are expired.
pub fn expiry_cutoff(lifespan: Duration) -> PrimitiveDateTime {
    let cutoff = OffsetDateTime::now_utc() - lifespan;
    PrimitiveDateTime::new(cutoff.date(), cutoff.time())
}
