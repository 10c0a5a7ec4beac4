//! SQLite-backed condition and market-data access.
//!
//! The tables are owned by the account-management service and the
//! market-data sync job; this crate only reads them. All queries are
//! runtime-checked so the workspace builds without a database present.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use common::{ConditionStore, MarketDataSource, MarketSnapshot, Result, StrategyConditions};

/// Read-only view over the shared SQLite database.
#[derive(Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Apply pending migrations. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("Database ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ConditionStore for SqlStore {
    async fn conditions(&self, account_id: i64) -> Result<Option<StrategyConditions>> {
        let row = sqlx::query_as::<_, StrategyConditions>(
            r#"
            SELECT
                account_id,
                id AS strategy_id,
                traditional_enabled,
                gainers_rank_limit,
                market_cap_limit,
                moving_average_enabled,
                ma_short_period,
                ma_long_period,
                ma_kind,
                mean_reversion_enabled,
                reversion_period,
                reversion_band_multiplier,
                arbitrage_enabled,
                arbitrage_spread_pct,
                grid_enabled,
                grid_levels,
                grid_step_pct,
                long_multiplier,
                short_multiplier,
                margin_mode
            FROM strategy_conditions
            WHERE account_id = ?1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn active_accounts(&self) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT account_id
            FROM strategy_conditions
            WHERE traditional_enabled = 1
               OR moving_average_enabled = 1
               OR mean_reversion_enabled = 1
               OR arbitrage_enabled = 1
               OR grid_enabled = 1
            ORDER BY account_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}

#[async_trait]
impl MarketDataSource for SqlStore {
    async fn snapshot(&self, symbol: &str) -> Result<Option<MarketSnapshot>> {
        let row = sqlx::query_as::<_, MarketSnapshot>(
            r#"
            SELECT
                symbol,
                price,
                volume_24h,
                market_cap,
                gainers_rank,
                has_spot_market,
                has_futures_market,
                synced_at
            FROM market_snapshots
            WHERE symbol = ?1
            "#,
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn tracked_symbols(&self) -> Result<Vec<String>> {
        let symbols =
            sqlx::query_scalar::<_, String>("SELECT symbol FROM market_snapshots ORDER BY symbol")
                .fetch_all(&self.pool)
                .await?;
        Ok(symbols)
    }
}
