use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::ConfiguredIdentity;
use crate::config::Config;
use crate::repository::Repository;
use crate::store::SqlStore;

pub mod api;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let store = SqlStore::connect(&config.db_url).await?;
    tracing::info!("Connected to data store");

    let identity = ConfiguredIdentity::from_config(&config);
    let repository = Repository::initialize(Arc::new(store), &identity).await;
    if repository.owner().is_none() {
        tracing::warn!("No user configured, tasks and projects cannot be created");
    }

    let app = create_app(Arc::new(repository));
    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the full application router around an initialized repository.
pub fn create_app(repository: Arc<Repository>) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(api::create_api_router(repository))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
