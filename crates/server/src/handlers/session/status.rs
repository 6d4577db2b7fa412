use std::sync::Arc;

use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    Extension, Json, TypedHeader,
};
use common::{config::Config, contract::Portal};
use db::DatabaseConnection;

use super::SessionView;
use crate::{auth::find_session, error::PortalError};

pub(super) async fn status(
    State(db): State<Arc<DatabaseConnection>>,
    Extension(portal): Extension<Arc<Portal>>,
    Extension(config): Extension<Arc<Config>>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<SessionView>, PortalError> {
    let Some(TypedHeader(authorization)) = authorization else {
        return Ok(Json(SessionView::disconnected()));
    };

    let Some((model, address)) = find_session(&*db, authorization.token(), &config).await? else {
        return Ok(Json(SessionView::disconnected()));
    };

    let role = portal.role_of(address).await?;

    Ok(Json(SessionView::connected(model.address, role)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_json::assert_json;
    use axum::{body::Body, http::Request};
    use common::contract::mock::MockChain;
    use tower::ServiceExt;

    use crate::testing::{create_database, create_session, router, ResponseBodyExt};

    #[tokio::test]
    async fn connected_owner() {
        let chain = Arc::new(MockChain::new());
        let db = create_database().await;
        let token = create_session(&db, chain.owner()).await;

        let response = router(db, &chain)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/session")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_json!(response.json().await, {
            "connected": true,
            "wallet_address": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "role": "SuperAdmin",
        });
    }

    #[tokio::test]
    async fn disconnected() {
        let chain = Arc::new(MockChain::new());

        let response = router(create_database().await, &chain)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_json!(response.json().await, { "connected": false });
    }
}
