pub mod builders;
pub mod context;
pub mod routes;
pub mod table;

pub use context::{build_execution_context, build_execution_market_data};
pub use routes::{
    ArbitrageRoute, GridTradingRoute, MeanReversionRoute, MovingAverageRoute, TraditionalRoute,
};
pub use table::{RouteTable, Selection};

use common::{StrategyConditions, StrategyConfig, StrategyKind, ValidationError};

/// One strategy family's entry in the route table.
///
/// A route bundles the family's activation rule, parameter validation, and
/// config construction so the selector never branches on concrete families.
/// Adding a family means one new implementation plus one table row.
///
/// Implementations must be pure: no I/O, no mutation, same output for the
/// same conditions record.
pub trait Route: Send + Sync {
    /// The strategy family this route dispatches to.
    fn kind(&self) -> StrategyKind;

    /// Relative priority; higher wins. Fixed at compile time.
    fn priority(&self) -> u8;

    /// Whether this family is switched on in the conditions record.
    fn is_active(&self, conditions: &StrategyConditions) -> bool;

    /// Structural validation of this family's parameters. Must pass before
    /// the route can be selected; a failure blocks the whole dispatch call.
    fn validate(&self, conditions: &StrategyConditions) -> Result<(), ValidationError>;

    /// Build the strategy-typed config. Only called on records that already
    /// passed [`Route::validate`] for this family, so it cannot fail.
    fn build_config(&self, conditions: &StrategyConditions) -> StrategyConfig;
}
