use std::{collections::BTreeSet, str::FromStr, sync::Arc};

use axum::{extract::Query, Extension, Json};
use common::contract::{Portal, Seed};
use serde::{Deserialize, Serialize};

use super::filter_value;
use crate::error::PortalError;

#[derive(Default, Deserialize)]
pub(super) struct CatalogQuery {
    /// Case-insensitive part of a crop name or variety.
    search: Option<String>,
    crop: Option<String>,
    certification: Option<String>,

    /// Inclusive price per unit range, formatted as `min-max`.
    price_range: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct PriceRange {
    min: u64,
    max: u64,
}

impl FromStr for PriceRange {
    type Err = PortalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || PortalError::InvalidField {
            field: "price_range",
            reason: "expected a `min-max` range",
        };

        let (min, max) = value.split_once('-').ok_or_else(invalid)?;
        let min = min.trim().parse().map_err(|_| invalid())?;
        let max = max.trim().parse().map_err(|_| invalid())?;

        if min > max {
            return Err(invalid());
        }

        Ok(Self { min, max })
    }
}

#[derive(Serialize)]
pub(super) struct CatalogResponse {
    seeds: Vec<Seed>,

    /// Distinct crop names of every seed lot.
    crops: BTreeSet<String>,

    /// Distinct certification types of every seed lot.
    certifications: BTreeSet<String>,
}

/// Filter seed lots with the catalog query.
fn filter(seeds: Vec<Seed>, query: &CatalogQuery) -> Result<Vec<Seed>, PortalError> {
    let search = filter_value(&query.search).map(str::to_lowercase);
    let crop = filter_value(&query.crop);
    let certification = filter_value(&query.certification);
    let price_range = filter_value(&query.price_range)
        .map(PriceRange::from_str)
        .transpose()?;

    Ok(seeds
        .into_iter()
        .filter(|seed| {
            search.as_ref().map_or(true, |search| {
                seed.crop_name.to_lowercase().contains(search)
                    || seed.variety.to_lowercase().contains(search)
            })
        })
        .filter(|seed| crop.map_or(true, |crop| seed.crop_name == crop))
        .filter(|seed| {
            certification.map_or(true, |certification| {
                seed.certification_type == certification
            })
        })
        .filter(|seed| {
            price_range.as_ref().map_or(true, |range| {
                (range.min..=range.max).contains(&seed.price_per_unit)
            })
        })
        .collect())
}

/// Browse the seed catalog.
pub(super) async fn catalog(
    Extension(portal): Extension<Arc<Portal>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>, PortalError> {
    let seeds = portal.seeds().await?;

    let crops = seeds.iter().map(|seed| seed.crop_name.clone()).collect();
    let certifications = seeds
        .iter()
        .map(|seed| seed.certification_type.clone())
        .collect();

    Ok(Json(CatalogResponse {
        seeds: filter(seeds, &query)?,
        crops,
        certifications,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::Address;
    use assert_json::assert_json;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::contract::{mock::MockChain, Seed};
    use tower::ServiceExt;

    use super::{filter, CatalogQuery, PriceRange};
    use crate::testing::{create_database, create_session, router, ResponseBodyExt};

    fn seed(seed_id: &str, crop_name: &str, variety: &str, certification: &str, price: u64) -> Seed {
        Seed {
            seed_id: seed_id.to_owned(),
            crop_name: crop_name.to_owned(),
            variety: variety.to_owned(),
            lot_number: String::from("LOT-1"),
            certification_type: certification.to_owned(),
            tag_number: String::from("TAG-1"),
            quantity: 100,
            price_per_unit: price,
            status: String::from("Available"),
        }
    }

    fn seeds() -> Vec<Seed> {
        vec![
            seed("SEED-001", "Wheat", "Durum", "Certified", 2),
            seed("SEED-002", "Maize", "Sweet Gold", "Foundation", 3),
            seed("SEED-003", "Rice", "Basmati", "Certified", 5),
        ]
    }

    fn ids(seeds: Vec<Seed>) -> Vec<String> {
        seeds.into_iter().map(|seed| seed.seed_id).collect()
    }

    #[test]
    fn price_ranges() {
        assert_eq!("2-3".parse::<PriceRange>().ok(), Some(PriceRange { min: 2, max: 3 }));
        assert!("3".parse::<PriceRange>().is_err());
        assert!("5-3".parse::<PriceRange>().is_err());
        assert!("a-b".parse::<PriceRange>().is_err());
    }

    #[test]
    fn combined_filters() {
        let query = CatalogQuery {
            search: Some(String::from("GOLD")),
            ..Default::default()
        };
        assert_eq!(ids(filter(seeds(), &query).unwrap()), ["SEED-002"]);

        let query = CatalogQuery {
            certification: Some(String::from("Certified")),
            price_range: Some(String::from("0-2")),
            ..Default::default()
        };
        assert_eq!(ids(filter(seeds(), &query).unwrap()), ["SEED-001"]);

        let query = CatalogQuery {
            crop: Some(String::from("all")),
            price_range: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter(seeds(), &query).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn browse_catalog() {
        let chain = Arc::new(MockChain::new());
        seeds().into_iter().for_each(|seed| chain.insert_seed(seed));

        let customer = Address::repeat_byte(4);
        chain.insert_profile(customer, "Carol", "carol@example.com");

        let db = create_database().await;
        let token = create_session(&db, customer).await;

        let response = router(db, &chain)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/user/seeds?price_range=3-5&search=a")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.json().await;
        assert_json!(body["crops"].clone(), ["Maize", "Rice", "Wheat"]);
        assert_json!(body["certifications"].clone(), ["Certified", "Foundation"]);

        let found: Vec<_> = body["seeds"]
            .as_array()
            .unwrap()
            .iter()
            .map(|seed| seed["seed_id"].as_str().unwrap())
            .collect();
        assert_eq!(found, ["SEED-002", "SEED-003"]);
    }

    #[tokio::test]
    async fn invalid_price_range() {
        let chain = Arc::new(MockChain::new());
        let db = create_database().await;
        let token = create_session(&db, chain.owner()).await;

        let response = router(db, &chain)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/user/seeds?price_range=cheap")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
