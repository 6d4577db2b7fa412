use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy::primitives::Address;
use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use common::contract::{Portal, Purchase, PurchaseStatus, Seed};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::filter_value;
use crate::{
    auth::CurrentSession, error::PortalError, handlers::TransactionResponse,
    validation::ValidatedJson,
};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Purchase with the details of the purchased seed lot.
#[derive(Clone, Debug, Serialize)]
pub(super) struct PurchaseEntry {
    #[serde(flatten)]
    pub purchase: Purchase,

    pub crop_name: String,
    pub variety: String,
    pub total_price: u64,
}

impl PurchaseEntry {
    fn new(purchase: Purchase, seed: Option<&Seed>) -> Self {
        let (crop_name, variety, price_per_unit) = seed
            .map(|seed| (seed.crop_name.clone(), seed.variety.clone(), seed.price_per_unit))
            .unwrap_or_default();

        Self {
            total_price: purchase.quantity.saturating_mul(price_per_unit),
            purchase,
            crop_name,
            variety,
        }
    }

    pub(super) fn is_cancelled(&self) -> bool {
        self.purchase.status == PurchaseStatus::Cancelled
    }
}

/// Load purchases of an account together with every seed lot.
pub(super) async fn purchase_entries(
    portal: &Portal,
    buyer: Address,
) -> Result<(Vec<PurchaseEntry>, Vec<Seed>), PortalError> {
    let (purchases, seeds) = tokio::try_join!(portal.purchases(buyer), portal.seeds())?;

    let by_id: HashMap<&str, &Seed> = seeds
        .iter()
        .map(|seed| (seed.seed_id.as_str(), seed))
        .collect();

    let entries = purchases
        .into_iter()
        .map(|purchase| {
            let seed = by_id.get(purchase.seed_id.as_str()).copied();
            PurchaseEntry::new(purchase, seed)
        })
        .collect();

    Ok((entries, seeds))
}

/// History filters. Empty values and "all" disable a filter.
#[derive(Default, Deserialize)]
pub(super) struct HistoryQuery {
    /// Case-insensitive part of a purchase id, crop name or variety.
    search: Option<String>,
    status: Option<String>,

    /// Only include purchases made within the provided number of days.
    days: Option<String>,
}

/// Parsed history filters.
#[derive(Debug, Default, PartialEq, Eq)]
struct HistoryFilter {
    search: Option<String>,
    status: Option<PurchaseStatus>,
    days: Option<u64>,
}

impl TryFrom<&HistoryQuery> for HistoryFilter {
    type Error = PortalError;

    fn try_from(query: &HistoryQuery) -> Result<Self, Self::Error> {
        let status = filter_value(&query.status)
            .map(str::parse::<PurchaseStatus>)
            .transpose()?;

        let days = filter_value(&query.days)
            .map(|days| {
                days.parse::<u64>().map_err(|_| PortalError::InvalidField {
                    field: "days",
                    reason: "expected a number of days",
                })
            })
            .transpose()?;

        Ok(Self {
            search: filter_value(&query.search).map(str::to_lowercase),
            status,
            days,
        })
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub(super) struct HistorySummary {
    /// Number of purchases that weren't cancelled.
    total_purchases: usize,

    /// Amount spent on purchases that weren't cancelled.
    total_spent: u64,

    delivered: usize,
    in_transit: usize,
}

impl HistorySummary {
    fn new(entries: &[PurchaseEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut summary, entry| {
            match entry.purchase.status {
                PurchaseStatus::Cancelled => return summary,
                PurchaseStatus::Delivered => summary.delivered += 1,
                PurchaseStatus::InTransit => summary.in_transit += 1,
                PurchaseStatus::Pending => {}
            }

            summary.total_purchases += 1;
            summary.total_spent = summary.total_spent.saturating_add(entry.total_price);
            summary
        })
    }
}

#[derive(Serialize)]
pub(super) struct HistoryResponse {
    purchases: Vec<PurchaseEntry>,
    summary: HistorySummary,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default()
}

fn filter(entries: &[PurchaseEntry], criteria: &HistoryFilter, now: u64) -> Vec<PurchaseEntry> {
    let cutoff = criteria
        .days
        .map(|days| now.saturating_sub(days.saturating_mul(SECONDS_PER_DAY)));

    entries
        .iter()
        .filter(|entry| {
            criteria.search.as_ref().map_or(true, |search| {
                entry.purchase.purchase_id.to_string().contains(search)
                    || entry.crop_name.to_lowercase().contains(search)
                    || entry.variety.to_lowercase().contains(search)
            })
        })
        .filter(|entry| {
            criteria
                .status
                .map_or(true, |status| entry.purchase.status == status)
        })
        .filter(|entry| cutoff.map_or(true, |cutoff| entry.purchase.created_at >= cutoff))
        .cloned()
        .collect()
}

/// Purchase history of the current account.
///
/// Summary covers every purchase, regardless of the filters.
pub(super) async fn history(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, PortalError> {
    let history_filter = HistoryFilter::try_from(&query)?;
    let (entries, _) = purchase_entries(&portal, session.address).await?;

    Ok(Json(HistoryResponse {
        summary: HistorySummary::new(&entries),
        purchases: filter(&entries, &history_filter, unix_now()),
    }))
}

#[derive(Deserialize, Validate)]
pub(super) struct PurchaseRequest {
    #[validate(length(min = 1))]
    seed_id: String,

    #[validate(range(min = 1))]
    quantity: u64,
}

/// Purchase a seed lot quantity from the current account.
pub(super) async fn create(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
    ValidatedJson(request): ValidatedJson<PurchaseRequest>,
) -> Result<Json<TransactionResponse>, PortalError> {
    let hash = portal
        .create_purchase(session.address, &request.seed_id, request.quantity)
        .await?;

    info!(
        buyer = %session.address,
        seed_id = %request.seed_id,
        quantity = request.quantity,
        "purchase created"
    );

    Ok(Json(hash.into()))
}

/// Cancel a pending purchase of the current account.
pub(super) async fn cancel(
    Extension(session): Extension<CurrentSession>,
    Extension(portal): Extension<Arc<Portal>>,
    Path(purchase_id): Path<u64>,
) -> Result<Json<TransactionResponse>, PortalError> {
    let hash = portal.cancel_purchase(session.address, purchase_id).await?;

    info!(buyer = %session.address, purchase_id, "purchase cancelled");

    Ok(Json(hash.into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::Address;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use common::contract::{mock::MockChain, Purchase, PurchaseStatus, Seed};
    use serde_json::{json, Value};
    use tower::Service;

    use super::{
        filter, HistoryFilter, HistoryQuery, HistorySummary, PurchaseEntry, SECONDS_PER_DAY,
    };
    use crate::{
        error::PortalError,
        testing::{create_database, create_session, router, RequestBodyExt, ResponseBodyExt},
    };

    const NOW: u64 = 1_700_000_000;

    fn seed(seed_id: &str, crop_name: &str, quantity: u64, price_per_unit: u64) -> Seed {
        Seed {
            seed_id: seed_id.to_owned(),
            crop_name: crop_name.to_owned(),
            variety: String::from("Local"),
            lot_number: String::from("LOT-1"),
            certification_type: String::from("Certified"),
            tag_number: String::from("TAG-1"),
            quantity,
            price_per_unit,
            status: String::from("Available"),
        }
    }

    fn entry(purchase_id: u64, crop_name: &str, status: PurchaseStatus, age_days: u64) -> PurchaseEntry {
        let created_at = NOW - age_days * SECONDS_PER_DAY;

        PurchaseEntry::new(
            Purchase {
                purchase_id,
                seed_id: format!("SEED-{purchase_id}"),
                quantity: 10,
                status,
                created_at,
                updated_at: created_at,
            },
            Some(&seed("SEED", crop_name, 100, 2)),
        )
    }

    fn entries() -> Vec<PurchaseEntry> {
        vec![
            entry(1, "Wheat", PurchaseStatus::Delivered, 40),
            entry(2, "Maize", PurchaseStatus::InTransit, 10),
            entry(3, "Maize", PurchaseStatus::Cancelled, 2),
            entry(4, "Rice", PurchaseStatus::Pending, 1),
        ]
    }

    fn ids(entries: Vec<PurchaseEntry>) -> Vec<u64> {
        entries.iter().map(|entry| entry.purchase.purchase_id).collect()
    }

    #[test]
    fn summary_excludes_cancelled() {
        assert_eq!(
            HistorySummary::new(&entries()),
            HistorySummary {
                total_purchases: 3,
                total_spent: 60,
                delivered: 1,
                in_transit: 1,
            }
        );
    }

    fn history_filter(search: &str, status: &str, days: &str) -> HistoryFilter {
        let query = HistoryQuery {
            search: Some(search.to_owned()),
            status: Some(status.to_owned()),
            days: Some(days.to_owned()),
        };

        HistoryFilter::try_from(&query).unwrap_or_else(|_| panic!("invalid history filter"))
    }

    #[test]
    fn history_filters() {
        let query = history_filter("maize", "", "");
        assert_eq!(ids(filter(&entries(), &query, NOW)), [2, 3]);

        let query = history_filter("", "pending", "");
        assert_eq!(ids(filter(&entries(), &query, NOW)), [4]);

        let query = history_filter("", "all", "30");
        assert_eq!(ids(filter(&entries(), &query, NOW)), [2, 3, 4]);

        let query = history_filter("4", "all", "all");
        assert_eq!(ids(filter(&entries(), &query, NOW)), [4]);
    }

    #[test]
    fn empty_history_filters() {
        assert_eq!(history_filter(" ", "", ""), HistoryFilter::default());
        assert_eq!(
            HistoryFilter::try_from(&HistoryQuery::default()).ok(),
            Some(HistoryFilter::default())
        );
    }

    #[test]
    fn invalid_history_filters() {
        let query = HistoryQuery {
            days: Some(String::from("week")),
            ..Default::default()
        };
        assert!(matches!(
            HistoryFilter::try_from(&query),
            Err(PortalError::InvalidField { field: "days", .. })
        ));

        let query = HistoryQuery {
            status: Some(String::from("lost")),
            ..Default::default()
        };
        assert!(HistoryFilter::try_from(&query).is_err());
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
    async fn purchase_and_cancel() {
        let chain = Arc::new(MockChain::new());
        chain.insert_seed(seed("SEED-001", "Wheat", 100, 3));

        let customer = Address::repeat_byte(4);
        chain.insert_profile(customer, "Carol", "carol@example.com");

        let db = create_database().await;
        let token = create_session(&db, customer).await;
        let mut service = router(db, &chain);

        let (status, _) = request(
            &mut service,
            "POST",
            "/user/purchases",
            &token,
            Some(json!({ "seed_id": "SEED-001", "quantity": 40 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = request(&mut service, "GET", "/user/purchases", &token, None).await;
        let purchase = &body["purchases"][0];

        assert_eq!(purchase["purchase_id"], 1);
        assert_eq!(purchase["crop_name"], "Wheat");
        assert_eq!(purchase["status"], "pending");
        assert_eq!(purchase["total_price"], 120);
        assert_eq!(body["summary"]["total_spent"], 120);

        let (status, _) =
            request(&mut service, "POST", "/user/purchases/1/cancel", &token, None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = request(
            &mut service,
            "GET",
            "/user/purchases?status=cancelled",
            &token,
            None,
        )
        .await;

        assert_eq!(body["purchases"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["summary"]["total_purchases"], 0);

        let (status, body) = request(
            &mut service,
            "GET",
            "/user/purchases?search=&status=&days=",
            &token,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["purchases"].as_array().map(Vec::len), Some(1));

        let (status, _) =
            request(&mut service, "GET", "/user/purchases?days=soon", &token, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        // Only pending purchases can be cancelled.
        let (status, _) =
            request(&mut service, "POST", "/user/purchases/1/cancel", &token, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let chain = Arc::new(MockChain::new());
        chain.insert_seed(seed("SEED-001", "Wheat", 100, 3));

        let customer = Address::repeat_byte(4);
        chain.insert_profile(customer, "Carol", "carol@example.com");

        let db = create_database().await;
        let token = create_session(&db, customer).await;
        let mut service = router(db, &chain);

        let (status, _) = request(
            &mut service,
            "POST",
            "/user/purchases",
            &token,
            Some(json!({ "seed_id": "SEED-001", "quantity": 0 })),
        )
        .await;

        assert_ne!(status, StatusCode::OK);
        assert_eq!(chain.transactions(), 0);
    }

    #[tokio::test]
    async fn insufficient_stock() {
        let chain = Arc::new(MockChain::new());
        chain.insert_seed(seed("SEED-001", "Wheat", 5, 3));

        let customer = Address::repeat_byte(4);
        chain.insert_profile(customer, "Carol", "carol@example.com");

        let db = create_database().await;
        let token = create_session(&db, customer).await;
        let mut service = router(db, &chain);

        let (status, _) = request(
            &mut service,
            "POST",
            "/user/purchases",
            &token,
            Some(json!({ "seed_id": "SEED-001", "quantity": 6 })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
