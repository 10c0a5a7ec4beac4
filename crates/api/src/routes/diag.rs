use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use dispatch::{build_execution_context, build_execution_market_data, Selection};

use crate::{auth::require_auth, AppState};

pub fn diag_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/routes", get(get_routes))
        .route("/api/accounts/:account_id/selection", get(get_selection))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

// ─── Route table ──────────────────────────────────────────────────────────────

async fn get_routes(State(state): State<AppState>) -> Json<Value> {
    let routes: Vec<Value> = state
        .table
        .all_routes()
        .map(|r| {
            json!({
                "strategy": r.kind().to_string(),
                "priority": r.priority(),
            })
        })
        .collect();

    Json(json!({ "routes": routes }))
}

// ─── Selection preview ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SelectionQuery {
    symbol: Option<String>,
}

/// Reports what a dispatch call would do for this account, without running
/// any backend. With `?symbol=`, also previews the execution context and
/// market projection for that symbol.
async fn get_selection(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
    Query(q): Query<SelectionQuery>,
) -> Json<Value> {
    let conditions = match state.conditions.conditions(account_id).await {
        Ok(Some(conditions)) => conditions,
        Ok(None) => {
            return Json(json!({
                "account_id": account_id,
                "outcome": "no_conditions",
            }));
        }
        Err(e) => {
            warn!(account = account_id, error = %e, "Selection preview failed to load conditions");
            return Json(json!({
                "account_id": account_id,
                "error": e.to_string(),
            }));
        }
    };

    match state.table.evaluate(&conditions) {
        Selection::Selected(route) => {
            let config = route.build_config(&conditions);
            let mut body = json!({
                "account_id": account_id,
                "outcome": "selected",
                "strategy": route.kind().to_string(),
                "priority": route.priority(),
                "config": config,
            });

            if let Some(symbol) = q.symbol {
                let ctx = build_execution_context(
                    &symbol,
                    route.kind(),
                    account_id,
                    conditions.strategy_id,
                );
                body["request_id"] = json!(ctx.request_id);

                let market = state
                    .market
                    .snapshot(&symbol)
                    .await
                    .ok()
                    .flatten()
                    .map(|s| build_execution_market_data(&s));
                body["market"] = json!(market);
            }

            Json(body)
        }
        Selection::Rejected { strategy, error } => Json(json!({
            "account_id": account_id,
            "outcome": "rejected",
            "strategy": strategy.to_string(),
            "field": error.field,
            "reason": error.reason,
        })),
        Selection::Idle => Json(json!({
            "account_id": account_id,
            "outcome": "idle",
        })),
    }
}
