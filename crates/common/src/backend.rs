use async_trait::async_trait;

use crate::{ExecutionContext, MarketView, Result, StrategyConfig};

/// The hand-off seam between the dispatcher and a strategy pipeline.
///
/// One backend is registered per strategy kind. A backend receives a
/// validated, strategy-typed config together with the execution context and
/// market view for exactly one dispatch call; order placement semantics live
/// entirely behind this trait.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Run the strategy pipeline for one validated dispatch.
    async fn execute(
        &self,
        ctx: &ExecutionContext,
        market: &MarketView,
        config: &StrategyConfig,
    ) -> Result<()>;
}
