use std::sync::Arc;

use alloy::primitives::Address;
use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    TypedHeader,
};
use common::{
    config::Config,
    contract::{Portal, Role},
};
use db::{
    session, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, Duration, EntityTrait,
    QueryFilter,
};
use tracing::debug;

use crate::error::PortalError;

/// Route of the wallet login view.
pub(crate) const LOGIN_ROUTE: &str = "/login";

/// Wallet session of the account that executes the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CurrentSession {
    pub id: i64,
    pub address: Address,
    pub role: Role,
}

/// Default view of a role.
pub(crate) fn landing(role: Role) -> &'static str {
    if role.is_admin() {
        "/admin"
    } else if role.has_role(Role::Customer) {
        "/user"
    } else {
        "/user/register"
    }
}

/// Find an unexpired session by its token.
///
/// Expired sessions are deleted when found.
pub(crate) async fn find_session<C: ConnectionTrait>(
    db: &C,
    token: &str,
    config: &Config,
) -> Result<Option<(session::Model, Address)>, DbErr> {
    let Some(model) = session::Entity::find()
        .filter(session::Column::Token.eq(token))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if session::is_expired(
        model.created_at,
        Duration::seconds(config.session.token_lifespan),
    ) {
        debug!(address = %model.address, "session expired");
        session::Entity::delete_by_id(model.id).exec(db).await?;
        return Ok(None);
    }

    Ok(model
        .address
        .parse::<Address>()
        .ok()
        .map(|address| (model, address)))
}

/// State of the role guard: the role required by guarded routes comes last.
pub(crate) type GuardState = (Arc<DatabaseConnection>, Arc<Portal>, Arc<Config>, Role);

/// Guard routes by wallet session and account role.
///
/// Requests without a valid session are redirected to the login view,
/// requests with an insufficient role are redirected to their landing view.
/// Role is resolved from the portal contracts on every request.
pub(super) async fn require_role<B>(
    State((db, portal, config, required)): State<GuardState>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, PortalError> {
    let Some(TypedHeader(authorization)) = authorization else {
        return Ok(Redirect::to(LOGIN_ROUTE).into_response());
    };

    let Some((model, address)) = find_session(&*db, authorization.token(), &config).await? else {
        return Ok(Redirect::to(LOGIN_ROUTE).into_response());
    };

    let role = portal.role_of(address).await?;

    if !role.has_role(required) {
        debug!(%address, ?role, ?required, "insufficient role");
        return Ok(Redirect::to(landing(role)).into_response());
    }

    req.extensions_mut().insert(CurrentSession {
        id: model.id,
        address,
        role,
    });

    Ok(next.run(req).await)
}
