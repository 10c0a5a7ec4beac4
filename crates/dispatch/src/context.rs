//! Execution input builders: the per-dispatch context and market view.

use common::{ExecutionContext, MarketSnapshot, MarketView, StrategyKind};

/// Build the per-dispatch execution context.
///
/// The request id is deterministic: `"{kind}-{strategy_id}-{symbol}"`. It is
/// a tracing/idempotency key for the execution backend, not a uniqueness
/// guarantee across retries with a different strategy id.
pub fn build_execution_context(
    symbol: &str,
    strategy: StrategyKind,
    account_id: i64,
    strategy_id: i64,
) -> ExecutionContext {
    ExecutionContext {
        symbol: symbol.to_string(),
        strategy,
        account_id,
        request_id: format!("{strategy}-{strategy_id}-{symbol}"),
    }
}

/// Project a raw snapshot into the view executors consume.
///
/// Pure field selection, no transformation and no validation; upstream
/// guarantees well-formed numeric fields.
pub fn build_execution_market_data(snapshot: &MarketSnapshot) -> MarketView {
    MarketView {
        symbol: snapshot.symbol.clone(),
        market_cap: snapshot.market_cap,
        gainers_rank: snapshot.gainers_rank,
        has_spot_market: snapshot.has_spot_market,
        has_futures_market: snapshot.has_futures_market,
    }
}
