mod auth;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use common::{ConditionStore, MarketDataSource, TradingMode};
use dispatch::RouteTable;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub conditions: Arc<dyn ConditionStore>,
    pub market: Arc<dyn MarketDataSource>,
    pub trading_mode: TradingMode,
    pub api_token: String,
}

/// Build and run the Axum diagnostics server.
pub async fn serve(state: AppState, port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    let app = Router::new()
        .merge(routes::diag_router(state.clone()))
        .merge(routes::health_router())
        .with_state(state)
        .layer(cors);

    info!(%addr, "Diagnostics API listening");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
