mod handlers;
mod state;

pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::error::Result;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/distance", get(handlers::distance))
        .route("/api/vendors/nearby", get(handlers::nearby_vendors))
        .route("/api/vendors/deliverable", get(handlers::deliverable_vendors))
        .route("/api/compare", get(handlers::compare))
        .route("/api/products/{id}/similar", get(handlers::similar_products))
        .route("/api/locate", get(handlers::locate))
        .route("/api/reverse", get(handlers::reverse))
        .route("/api/localities", get(handlers::locality_list))
        .route("/api/cart/quote", post(handlers::cart_quote))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "vendorly server listening");
    eprintln!("  Vendorly server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await?;
    Ok(())
}
