use std::{collections::BTreeMap, sync::Arc};

use axum::{Extension, Json};
use common::contract::{Portal, Seed};
use serde::Serialize;

use super::purchases::{purchase_entries, PurchaseEntry};
use crate::{auth::CurrentSession, error::PortalError};

const RECENT_PURCHASES: usize = 2;
const AVAILABLE_SEEDS: usize = 2;

#[derive(Serialize)]
pub(super) struct UserDashboard {
    total_purchases: usize,
    total_spent: u64,

    /// Crop with the most purchased units, `"None"` without purchases.
    favorite_crop: String,

    /// UNIX timestamp of the latest purchase, in seconds.
    last_purchase: Option<u64>,

    recent_purchases: Vec<PurchaseEntry>,
    available_seeds: Vec<Seed>,
}

fn favorite_crop(entries: &[PurchaseEntry]) -> String {
    let mut units = BTreeMap::<&str, u64>::new();

    for entry in entries.iter().filter(|entry| !entry.is_cancelled()) {
        *units.entry(&entry.crop_name).or_default() += entry.purchase.quantity;
    }

    // Ties go to the alphabetically first crop.
    units
        .into_iter()
        .max_by(|(a_crop, a_units), (b_crop, b_units)| {
            a_units.cmp(b_units).then_with(|| b_crop.cmp(a_crop))
        })
        .map(|(crop, _)| crop.to_owned())
        .unwrap_or_else(|| String::from("None"))
}

fn summarize(mut entries: Vec<PurchaseEntry>, seeds: Vec<Seed>) -> UserDashboard {
    let active = entries.iter().filter(|entry| !entry.is_cancelled());
    let total_purchases = active.clone().count();
    let total_spent = active.fold(0u64, |total, entry| total.saturating_add(entry.total_price));

    let favorite_crop = favorite_crop(&entries);
    let last_purchase = entries.iter().map(|entry| entry.purchase.created_at).max();

    entries.sort_by(|a, b| {
        b.purchase
            .created_at
            .cmp(&a.purchase.created_at)
            .then_with(|| b.purchase.purchase_id.cmp(&a.purchase.purchase_id))
    });
    entries.truncate(RECENT_PURCHASES);

    UserDashboard {
        total_purchases,
        total_spent,
        favorite_crop,
        last_purchase,
        recent_purchases: entries,
        available_seeds: seeds
            .into_iter()
            .filter(|seed| seed.quantity > 0)
            .take(AVAILABLE_SEEDS)
            .collect(),
    }
}

/// Customer dashboard of the current account.
pub(super) async fn dashboard(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
) -> Result<Json<UserDashboard>, PortalError> {
    let (entries, seeds) = purchase_entries(&portal, session.address).await?;

    Ok(Json(summarize(entries, seeds)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::Address;
    use assert_json::{assert_json, validators};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::contract::{mock::MockChain, Purchase, PurchaseStatus, Seed};
    use tower::ServiceExt;

    use crate::testing::{create_database, create_session, router, ResponseBodyExt};

    fn seed(seed_id: &str, crop_name: &str, quantity: u64) -> Seed {
        Seed {
            seed_id: seed_id.to_owned(),
            crop_name: crop_name.to_owned(),
            variety: String::from("Local"),
            lot_number: String::from("LOT-1"),
            certification_type: String::from("Certified"),
            tag_number: String::from("TAG-1"),
            quantity,
            price_per_unit: 2,
            status: String::from("Available"),
        }
    }

    fn purchase(purchase_id: u64, seed_id: &str, quantity: u64, status: PurchaseStatus) -> Purchase {
        Purchase {
            purchase_id,
            seed_id: seed_id.to_owned(),
            quantity,
            status,
            created_at: 1_700_000_000 + purchase_id,
            updated_at: 1_700_000_000 + purchase_id,
        }
    }

    async fn dashboard(chain: &Arc<MockChain>, customer: Address) -> serde_json::Value {
        let db = create_database().await;
        let token = create_session(&db, customer).await;

        let response = router(db, chain)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/user/dashboard")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        response.json().await
    }

    #[tokio::test]
    async fn dashboard_summary() {
        let chain = Arc::new(MockChain::new());
        chain.insert_seed(seed("SEED-001", "Wheat", 0));
        chain.insert_seed(seed("SEED-002", "Maize", 50));
        chain.insert_seed(seed("SEED-003", "Rice", 20));
        chain.insert_seed(seed("SEED-004", "Beans", 10));

        let customer = Address::repeat_byte(4);
        chain.insert_profile(customer, "Carol", "carol@example.com");
        chain.insert_purchase(customer, purchase(1, "SEED-001", 30, PurchaseStatus::Delivered));
        chain.insert_purchase(customer, purchase(2, "SEED-002", 20, PurchaseStatus::InTransit));
        chain.insert_purchase(customer, purchase(3, "SEED-002", 50, PurchaseStatus::Cancelled));

        let body = dashboard(&chain, customer).await;

        assert_eq!(body["total_purchases"], 2);
        assert_eq!(body["total_spent"], 100);
        assert_eq!(body["favorite_crop"], "Wheat");
        assert_eq!(body["last_purchase"], 1_700_000_003);

        let recent: Vec<_> = body["recent_purchases"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["purchase_id"].as_u64().unwrap())
            .collect();
        assert_eq!(recent, [3, 2]);

        let available: Vec<_> = body["available_seeds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|seed| seed["seed_id"].as_str().unwrap())
            .collect();
        assert_eq!(available, ["SEED-002", "SEED-003"]);
    }

    #[tokio::test]
    async fn without_purchases() {
        let chain = Arc::new(MockChain::new());
        let customer = Address::repeat_byte(4);
        chain.insert_profile(customer, "Carol", "carol@example.com");

        assert_json!(dashboard(&chain, customer).await, {
            "total_purchases": 0,
            "total_spent": 0,
            "favorite_crop": "None",
            "last_purchase": validators::null(),
            "recent_purchases": [],
            "available_seeds": [],
        });
    }
}
