use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::QuoteError;
use crate::quotes::aggregator::PriceAggregator;
use crate::quotes::symbol::Symbol;
use crate::quotes::types::PriceMap;

pub struct AppState {
    pub aggregator: PriceAggregator,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cryptocurrency/{symbol}/", get(get_prices))
        .route("/cryptocurrency/{symbol}", get(get_prices))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("API Server listening on {}", addr);
    }
    axum::serve(listener, router(state)).await
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        let status = match &self {
            QuoteError::InvalidSymbol { .. } | QuoteError::Upstream { .. } => {
                StatusCode::BAD_REQUEST
            }
            QuoteError::NotFound { .. } | QuoteError::NoPrices { .. } => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

async fn get_prices(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Json<PriceMap>, QuoteError> {
    let symbol = Symbol::parse(&raw).inspect_err(|_| {
        warn!("Rejected cryptocurrency code {:?}", raw);
    })?;

    let prices = state.aggregator.fetch_prices(&symbol).await?;
    Ok(Json(prices))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
