use std::sync::Arc;

use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    Json, TypedHeader,
};
use db::{session, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::info;

use super::SessionView;
use crate::error::PortalError;

/// Destroy the current session, if any.
pub(super) async fn logout(
    State(db): State<Arc<DatabaseConnection>>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<SessionView>, PortalError> {
    if let Some(TypedHeader(authorization)) = authorization {
        let result = session::Entity::delete_many()
            .filter(session::Column::Token.eq(authorization.token()))
            .exec(&*db)
            .await?;

        if result.rows_affected > 0 {
            info!("wallet disconnected");
        }
    }

    Ok(Json(SessionView::disconnected()))
}
