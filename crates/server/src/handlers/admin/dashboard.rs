use std::sync::Arc;

use axum::{Extension, Json};
use common::contract::{DashboardMetrics, Portal};
use serde::Serialize;

use crate::error::PortalError;

/// Single bar of the inventory chart.
#[derive(Serialize)]
pub(super) struct ChartEntry {
    name: &'static str,
    value: u64,
}

#[derive(Serialize)]
pub(super) struct DashboardResponse {
    #[serde(flatten)]
    metrics: DashboardMetrics,

    chart: Vec<ChartEntry>,
}

impl From<DashboardMetrics> for DashboardResponse {
    fn from(metrics: DashboardMetrics) -> Self {
        let chart = vec![
            ChartEntry {
                name: "Varieties",
                value: metrics.total_varieties,
            },
            ChartEntry {
                name: "Quantity",
                value: metrics.total_quantity,
            },
            ChartEntry {
                name: "Cost",
                value: metrics.total_cost,
            },
        ];

        Self { metrics, chart }
    }
}

/// Get the current seed inventory totals.
pub(super) async fn dashboard(
    Extension(portal): Extension<Arc<Portal>>,
) -> Result<Json<DashboardResponse>, PortalError> {
    let metrics = portal.dashboard_metrics().await?;

    Ok(Json(metrics.into()))
}
