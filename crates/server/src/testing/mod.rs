use std::{error::Error, sync::Arc};

use alloy::primitives::Address;
use axum::{async_trait, Router};
use common::{config::Config, contract::mock::MockChain};
use db::{session, Database, DatabaseConnection, EntityTrait};
use hyper::body::{self, Bytes, HttpBody};
use migration::MigratorTrait;
use serde::Serialize;

pub(crate) async fn create_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("unable to create test database");

    migration::Migrator::up(&db, None)
        .await
        .expect("unable to run migrations");

    db
}

/// Create an application router backed by the provided in-memory chain.
pub(crate) fn router(db: DatabaseConnection, chain: &Arc<MockChain>) -> Router {
    shared_router(Arc::new(db), chain)
}

/// Same as [`router`], for tests that inspect the database afterwards.
pub(crate) fn shared_router(db: Arc<DatabaseConnection>, chain: &Arc<MockChain>) -> Router {
    crate::app_router(db, Arc::new(chain.portal()), Arc::new(Config::for_tests()))
}

/// Create a wallet session for the provided account and return its token.
pub(crate) async fn create_session(db: &DatabaseConnection, account: Address) -> String {
    let (model, token) = session::generate_session(&account.to_string());

    session::Entity::insert(model)
        .exec_without_returning(db)
        .await
        .expect("unable to create session");

    token
}

pub(crate) trait RequestBodyExt: Sized {
    fn from_json<B: Serialize>(val: B) -> Self;
}

impl<T> RequestBodyExt for T
where
    T: HttpBody + From<Vec<u8>>,
{
    fn from_json<B: Serialize>(val: B) -> Self {
        T::from(serde_json::to_vec(&val).expect("unable to serialize"))
    }
}

#[async_trait(?Send)]
pub(crate) trait ResponseBodyExt {
    async fn bytes(self) -> Bytes;

    async fn json(self) -> serde_json::Value;
}

#[async_trait(?Send)]
impl<T> ResponseBodyExt for T
where
    T: HttpBody,
    T::Error: Error,
{
    async fn bytes(self) -> Bytes {
        body::to_bytes(self)
            .await
            .expect("unable to convert to bytes")
    }

    async fn json(self) -> serde_json::Value {
        serde_json::from_slice(&self.bytes().await).expect("unable to convert to json")
    }
}
