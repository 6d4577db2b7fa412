use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use common::contract::{Portal, Seed, SeedRegistration};
use tracing::info;

use crate::{
    auth::CurrentSession, error::PortalError, handlers::TransactionResponse,
    validation::ValidatedJson,
};

/// List every registered seed lot.
pub(super) async fn list(
    Extension(portal): Extension<Arc<Portal>>,
) -> Result<Json<Vec<Seed>>, PortalError> {
    Ok(Json(portal.seeds().await?))
}

/// Register a new seed lot from the current admin account.
pub(super) async fn register(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
    ValidatedJson(seed): ValidatedJson<SeedRegistration>,
) -> Result<Json<TransactionResponse>, PortalError> {
    let seed_id = seed.seed_id.clone();
    let hash = portal.register_seed(session.address, seed).await?;

    info!(%seed_id, admin = %session.address, "seed lot registered");

    Ok(Json(hash.into()))
}

/// Get seed lot details by its identifier.
pub(super) async fn details(
    Extension(portal): Extension<Arc<Portal>>,
    Path(seed_id): Path<String>,
) -> Result<Json<Seed>, PortalError> {
    portal
        .search_seed(&seed_id)
        .await?
        .map(Json)
        .ok_or(PortalError::SeedNotFound)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::Address;
    use assert_json::{assert_json, validators};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use common::contract::{mock::MockChain, Role};
    use serde_json::{json, Value};
    use tower::Service;

    use crate::testing::{
        create_database, create_session, router, RequestBodyExt, ResponseBodyExt,
    };

    fn registration(seed_id: &str) -> Value {
        json!({
            "seed_id": seed_id,
            "crop_name": "Maize",
            "variety": "H614",
            "lot_number": "LOT-7",
            "certification_type": "Certified",
            "tag_number": "TAG-42",
            "quantity": 500,
            "price_per_unit": 3,
        })
    }

    async fn request(
        service: &mut Router,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json");

        let body = body.map(Body::from_json).unwrap_or_else(Body::empty);

        let response = service.call(request.body(body).unwrap()).await.unwrap();
        let status = response.status();

        if status.is_success() {
            (status, response.json().await)
        } else {
            (status, Value::Null)
        }
    }

    #[tokio::test]
    async fn register_and_find() {
        let chain = Arc::new(MockChain::new());
        let db = create_database().await;
        let token = create_session(&db, chain.owner()).await;
        let mut service = router(db, &chain);

        let (status, body) = request(
            &mut service,
            "POST",
            "/admin/seeds",
            &token,
            Some(registration("SEED-001")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_json!(body, { "transaction_hash": validators::any() });

        let (status, body) = request(&mut service, "GET", "/admin/seeds/SEED-001", &token, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_json!(body, {
            "seed_id": "SEED-001",
            "crop_name": "Maize",
            "variety": "H614",
            "lot_number": "LOT-7",
            "certification_type": "Certified",
            "tag_number": "TAG-42",
            "quantity": 500,
            "price_per_unit": 3,
            "status": "Available",
        });

        let (_, body) = request(&mut service, "GET", "/admin/seeds", &token, None).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn unknown_seed() {
        let chain = Arc::new(MockChain::new());
        let db = create_database().await;
        let token = create_session(&db, chain.owner()).await;

        let response = router(db, &chain)
            .call(
                Request::builder()
                    .method("GET")
                    .uri("/admin/seeds/SEED-404")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_seed_is_reverted() {
        let chain = Arc::new(MockChain::new());
        let db = create_database().await;
        let token = create_session(&db, chain.owner()).await;
        let mut service = router(db, &chain);

        request(&mut service, "POST", "/admin/seeds", &token, Some(registration("SEED-001"))).await;

        let response = service
            .call(
                Request::builder()
                    .method("POST")
                    .uri("/admin/seeds")
                    .header("Authorization", format!("Bearer {token}"))
                    .header("Content-Type", "application/json")
                    .body(Body::from_json(registration("SEED-001")))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(chain.transactions(), 1);
    }

    #[tokio::test]
    async fn blank_field_never_reaches_the_chain() {
        let chain = Arc::new(MockChain::new());
        let db = create_database().await;
        let token = create_session(&db, chain.owner()).await;
        let mut service = router(db, &chain);

        let mut body = registration("SEED-001");
        body["variety"] = json!("  ");

        let (status, _) = request(&mut service, "POST", "/admin/seeds", &token, Some(body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(chain.transactions(), 0);
    }

    #[tokio::test]
    async fn producer_is_redirected() {
        let chain = Arc::new(MockChain::new());
        let producer = Address::repeat_byte(2);
        chain.insert_user(producer, "Paul", Role::Producer, true);

        let db = create_database().await;
        let token = create_session(&db, producer).await;

        let response = router(db, &chain)
            .call(
                Request::builder()
                    .method("POST")
                    .uri("/admin/seeds")
                    .header("Authorization", format!("Bearer {token}"))
                    .header("Content-Type", "application/json")
                    .body(Body::from_json(registration("SEED-001")))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(chain.transactions(), 0);
    }

    #[tokio::test]
    async fn malformed_body() {
        let chain = Arc::new(MockChain::new());
        let db = create_database().await;
        let token = create_session(&db, chain.owner()).await;

        let response = router(db, &chain)
            .call(
                Request::builder()
                    .method("POST")
                    .uri("/admin/seeds")
                    .header("Authorization", format!("Bearer {token}"))
                    .header("Content-Type", "application/json")
                    .body(Body::from("{\"seed_id\": "))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(chain.transactions(), 0);
    }
}
