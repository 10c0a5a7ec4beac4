use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use common::{
    ConditionStore, DispatchOutcome, Error, ExecutionBackend, MarketDataSource, Result,
    StrategyKind,
};
use dispatch::{build_execution_context, build_execution_market_data, RouteTable, Selection};

/// Drives the dispatch pipeline: conditions in, at most one strategy
/// execution out per account and symbol.
///
/// The dispatcher owns no state of its own; everything it reads is behind
/// the store traits and everything it produces goes to a backend. One
/// instance serves all accounts.
pub struct Dispatcher {
    table: Arc<RouteTable>,
    conditions: Arc<dyn ConditionStore>,
    market: Arc<dyn MarketDataSource>,
    backends: HashMap<StrategyKind, Arc<dyn ExecutionBackend>>,
}

impl Dispatcher {
    pub fn new(
        table: Arc<RouteTable>,
        conditions: Arc<dyn ConditionStore>,
        market: Arc<dyn MarketDataSource>,
        backends: HashMap<StrategyKind, Arc<dyn ExecutionBackend>>,
    ) -> Self {
        Self {
            table,
            conditions,
            market,
            backends,
        }
    }

    /// Dispatch one account against one symbol.
    ///
    /// Route selection looks only at the conditions record; market data is
    /// fetched after a route has won, for the execution stage. `Err` means
    /// infrastructure trouble (store unreachable, backend missing or
    /// failing); every business outcome is a [`DispatchOutcome`].
    pub async fn dispatch(&self, account_id: i64, symbol: &str) -> Result<DispatchOutcome> {
        let Some(conditions) = self.conditions.conditions(account_id).await? else {
            debug!(account = account_id, "No conditions record, skipping");
            return Ok(DispatchOutcome::NoConditions);
        };

        let route = match self.table.evaluate(&conditions) {
            Selection::Selected(route) => route,
            Selection::Rejected { strategy, error } => {
                return Ok(DispatchOutcome::Rejected { strategy, error });
            }
            Selection::Idle => {
                debug!(account = account_id, "No strategy enabled, skipping");
                return Ok(DispatchOutcome::NoRoute);
            }
        };

        let Some(snapshot) = self.market.snapshot(symbol).await? else {
            warn!(
                account = account_id,
                symbol, "No market snapshot, execution skipped"
            );
            return Ok(DispatchOutcome::NoMarketData);
        };

        let ctx =
            build_execution_context(symbol, route.kind(), account_id, conditions.strategy_id);
        let market = build_execution_market_data(&snapshot);
        let config = route.build_config(&conditions);

        let backend = self.backends.get(&route.kind()).ok_or_else(|| {
            Error::Backend(format!(
                "no execution backend registered for '{}'",
                route.kind()
            ))
        })?;
        backend.execute(&ctx, &market, &config).await?;

        info!(
            account = account_id,
            strategy = %ctx.strategy,
            symbol = %ctx.symbol,
            request_id = %ctx.request_id,
            "Strategy dispatched"
        );

        Ok(DispatchOutcome::Executed {
            strategy: ctx.strategy,
            request_id: ctx.request_id,
        })
    }

    /// One pass over every active account and tracked symbol. Failures are
    /// logged per pair and never abort the rest of the cycle.
    pub async fn run_cycle(&self) {
        let accounts = match self.conditions.active_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                error!(error = %e, "Failed to list active accounts");
                return;
            }
        };
        let symbols = match self.market.tracked_symbols().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(error = %e, "Failed to list tracked symbols");
                return;
            }
        };

        let mut executed = 0usize;
        let mut rejected = 0usize;
        let mut skipped = 0usize;
        let mut failed = 0usize;

        for account_id in &accounts {
            for symbol in &symbols {
                match self.dispatch(*account_id, symbol).await {
                    Ok(DispatchOutcome::Executed { .. }) => executed += 1,
                    Ok(DispatchOutcome::Rejected { .. }) => rejected += 1,
                    Ok(_) => skipped += 1,
                    Err(e) => {
                        failed += 1;
                        error!(
                            account = account_id,
                            symbol = %symbol,
                            error = %e,
                            "Dispatch failed"
                        );
                    }
                }
            }
        }

        info!(
            accounts = accounts.len(),
            symbols = symbols.len(),
            executed,
            rejected,
            skipped,
            failed,
            "Dispatch cycle complete"
        );
    }

    /// Run the periodic dispatch loop. Call from `tokio::spawn`.
    pub async fn run(self, period: Duration) {
        info!(period_secs = period.as_secs(), "Dispatcher running");
        let mut tick = tokio::time::interval(period);
        // Don't burst-fire missed ticks
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            self.run_cycle().await;
        }
    }
}
