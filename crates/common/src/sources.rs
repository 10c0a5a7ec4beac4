use async_trait::async_trait;

use crate::{MarketSnapshot, Result, StrategyConditions};

/// Read-only access to per-account strategy conditions.
///
/// `SqlStore` implements this for live mode, `PaperBook` for paper mode.
/// The dispatcher loads a fresh record for every dispatch decision; no
/// caching happens on the consumer side.
#[async_trait]
pub trait ConditionStore: Send + Sync {
    /// The account's current conditions record, or `None` if the account
    /// has no record yet.
    async fn conditions(&self, account_id: i64) -> Result<Option<StrategyConditions>>;

    /// Accounts with at least one strategy family enabled, in stable order.
    async fn active_accounts(&self) -> Result<Vec<i64>>;
}

/// Read-only access to market data for tracked symbols.
///
/// The snapshots are produced upstream by the market-data sync job; this
/// component only projects them into execution inputs.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Latest snapshot for a symbol, or `None` if the symbol is unknown.
    async fn snapshot(&self, symbol: &str) -> Result<Option<MarketSnapshot>>;

    /// Symbols the bot dispatches on, in stable order.
    async fn tracked_symbols(&self) -> Result<Vec<String>>;
}
