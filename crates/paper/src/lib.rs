pub mod fixture;

pub use fixture::PaperBook;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use common::{
    ExecutionBackend, ExecutionContext, MarketView, Result, StrategyConfig, StrategyKind,
};

/// One recorded paper execution.
#[derive(Debug, Clone, Serialize)]
pub struct PaperExecution {
    pub execution_id: String,
    /// Deterministic dispatch key, repeats when the same account, record and
    /// symbol dispatch again.
    pub request_id: String,
    pub account_id: i64,
    pub symbol: String,
    pub strategy: StrategyKind,
    pub config: StrategyConfig,
    pub market: MarketView,
    pub executed_at: DateTime<Utc>,
}

/// Simulated execution backend for paper trading.
///
/// Every dispatched strategy lands in an in-memory ledger instead of an
/// exchange. No real orders are ever sent anywhere.
pub struct PaperBackend {
    executions: Arc<RwLock<Vec<PaperExecution>>>,
}

impl PaperBackend {
    pub fn new() -> Self {
        info!("PaperBackend initialized");
        Self {
            executions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Everything recorded so far, oldest first.
    pub async fn executions(&self) -> Vec<PaperExecution> {
        self.executions.read().await.clone()
    }

    /// Expose the ledger (for the diagnostics API and auditing).
    pub fn executions_handle(&self) -> Arc<RwLock<Vec<PaperExecution>>> {
        self.executions.clone()
    }
}

impl Default for PaperBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionBackend for PaperBackend {
    async fn execute(
        &self,
        ctx: &ExecutionContext,
        market: &MarketView,
        config: &StrategyConfig,
    ) -> Result<()> {
        let record = PaperExecution {
            execution_id: Uuid::new_v4().to_string(),
            request_id: ctx.request_id.clone(),
            account_id: ctx.account_id,
            symbol: ctx.symbol.clone(),
            strategy: ctx.strategy,
            config: config.clone(),
            market: market.clone(),
            executed_at: Utc::now(),
        };

        info!(
            request_id = %record.request_id,
            strategy = %record.strategy,
            symbol = %record.symbol,
            "Paper execution recorded"
        );

        self.executions.write().await.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ArbitrageConfig, MarginMode};

    fn sample_context() -> ExecutionContext {
        ExecutionContext {
            symbol: "BTCUSDT".to_string(),
            strategy: StrategyKind::Arbitrage,
            account_id: 9,
            request_id: "arbitrage-12-BTCUSDT".to_string(),
        }
    }

    fn sample_market() -> MarketView {
        MarketView {
            symbol: "BTCUSDT".to_string(),
            market_cap: 980_000_000_000.0,
            gainers_rank: 3,
            has_spot_market: true,
            has_futures_market: true,
        }
    }

    fn sample_config() -> StrategyConfig {
        StrategyConfig::Arbitrage(ArbitrageConfig {
            min_spread_pct: 0.4,
            margin_mode: MarginMode::Isolated,
        })
    }

    #[tokio::test]
    async fn execution_lands_in_ledger() {
        let backend = PaperBackend::new();
        backend
            .execute(&sample_context(), &sample_market(), &sample_config())
            .await
            .unwrap();

        let executions = backend.executions().await;
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].request_id, "arbitrage-12-BTCUSDT");
        assert_eq!(executions[0].strategy, StrategyKind::Arbitrage);
        assert_eq!(executions[0].market.gainers_rank, 3);
    }

    #[tokio::test]
    async fn repeated_dispatch_keeps_the_same_request_id() {
        let backend = PaperBackend::new();
        let ctx = sample_context();
        backend
            .execute(&ctx, &sample_market(), &sample_config())
            .await
            .unwrap();
        backend
            .execute(&ctx, &sample_market(), &sample_config())
            .await
            .unwrap();

        let executions = backend.executions().await;
        assert_eq!(executions.len(), 2);
        assert_eq!(executions[0].request_id, executions[1].request_id);
        assert_ne!(executions[0].execution_id, executions[1].execution_id);
    }

    #[tokio::test]
    async fn ledger_handle_sees_new_executions() {
        let backend = PaperBackend::new();
        let handle = backend.executions_handle();
        backend
            .execute(&sample_context(), &sample_market(), &sample_config())
            .await
            .unwrap();

        assert_eq!(handle.read().await.len(), 1);
    }
}
