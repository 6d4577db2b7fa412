mod auth;
mod error;
mod handlers;
mod validation;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Extension, Router, Server};
use common::{
    config::Config,
    contract::{Deployments, Portal, Role, RpcTransport},
    logging,
};
use db::{Database, DatabaseConnection};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::new(None)?;

    logging::init(&config);

    let Some(server_config) = config.server.as_ref() else {
        return Err(anyhow::Error::msg("unable to load server config"));
    };

    info!("connecting to database");
    let database = Arc::new(Database::connect(&config.database.url).await?);

    info!(artifacts = %config.chain.artifacts.display(), "loading contract deployments");
    let deployments = Deployments::from_artifacts(&config.chain.artifacts)?;
    let transport = RpcTransport::http(&config.chain.rpc_url)?;
    let portal = Arc::new(Portal::new(Arc::new(transport), deployments));

    let server = Server::bind(&server_config.address);
    let config = Arc::new(config);

    server
        .serve(app_router(database, portal, config).into_make_service())
        .await?;

    Ok(())
}

fn app_router(
    database: Arc<DatabaseConnection>,
    portal: Arc<Portal>,
    config: Arc<Config>,
) -> Router {
    let admin_routes = handlers::admin::routes().route_layer(from_fn_with_state(
        (database.clone(), portal.clone(), config.clone(), Role::Admin),
        auth::require_role::<_>,
    ));

    // Registration is the only user view available to accounts without a role.
    let registration_routes = handlers::user::registration_routes().route_layer(
        from_fn_with_state(
            (database.clone(), portal.clone(), config.clone(), Role::None),
            auth::require_role::<_>,
        ),
    );

    let user_routes = handlers::user::routes()
        .route_layer(from_fn_with_state(
            (database.clone(), portal.clone(), config.clone(), Role::Customer),
            auth::require_role::<_>,
        ))
        .merge(registration_routes);

    Router::new()
        .merge(handlers::session::routes())
        .nest("/admin", admin_routes)
        .nest("/user", user_routes)
        .layer(Extension(portal))
        .layer(Extension(config))
        .with_state(database)
}
