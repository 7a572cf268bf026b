//! Router configuration and server setup.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::signature::verify_signature;
use crate::state::AppState;

/// Creates the router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let interactions = Router::new()
        .route("/interactions", post(handlers::interactions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            verify_signature,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(interactions)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Starts the server.
pub async fn serve(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Scene Keeper listening on {}", addr);
    axum::serve(listener, create_router(state)).await
}
