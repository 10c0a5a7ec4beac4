use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use common::{RouteTableError, StrategyConditions, StrategyKind, ValidationError};

use crate::routes::{
    ArbitrageRoute, GridTradingRoute, MeanReversionRoute, MovingAverageRoute, TraditionalRoute,
};
use crate::Route;

/// Outcome of evaluating the route table against one conditions record.
pub enum Selection<'a> {
    /// The highest-priority active route; its parameters validated.
    Selected(&'a dyn Route),
    /// The highest-priority active route failed validation. Lower-priority
    /// routes are deliberately not consulted.
    Rejected {
        strategy: StrategyKind,
        error: ValidationError,
    },
    /// No family is enabled in the record.
    Idle,
}

// `Selected` holds a trait object with no Debug bound; render it by kind.
impl fmt::Debug for Selection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Selected(route) => {
                f.debug_tuple("Selected").field(&route.kind()).finish()
            }
            Selection::Rejected { strategy, error } => f
                .debug_struct("Rejected")
                .field("strategy", strategy)
                .field("error", error)
                .finish(),
            Selection::Idle => f.write_str("Idle"),
        }
    }
}

/// The priority-ordered set of strategy routes.
///
/// Built once at process start and shared read-only (`Arc<RouteTable>`);
/// evaluation is a pure function of the conditions record, safe to call
/// concurrently from any number of tasks.
pub struct RouteTable {
    routes: Vec<Box<dyn Route>>,
}

impl RouteTable {
    /// The production table. Priority order (higher wins):
    /// mean_reversion 100 > moving_average 90 > traditional 70 >
    /// arbitrage 60 > grid_trading 50. Changing the order means
    /// redeploying this table, not flipping runtime configuration.
    pub fn standard() -> Self {
        Self::with_routes(vec![
            Box::new(MeanReversionRoute),
            Box::new(MovingAverageRoute),
            Box::new(TraditionalRoute),
            Box::new(ArbitrageRoute),
            Box::new(GridTradingRoute),
        ])
        .expect("standard route table is well-formed")
    }

    /// Build a table from caller-supplied routes.
    ///
    /// Routes must already be declared in non-increasing priority order
    /// (equal priorities resolve by declaration order) and each strategy
    /// kind may appear at most once. Violations are construction errors:
    /// the process must refuse to start rather than run with an ambiguous
    /// table.
    pub fn with_routes(routes: Vec<Box<dyn Route>>) -> Result<Self, RouteTableError> {
        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert(route.kind()) {
                return Err(RouteTableError::DuplicateStrategy(route.kind()));
            }
        }
        if routes.windows(2).any(|w| w[0].priority() < w[1].priority()) {
            return Err(RouteTableError::UnsortedPriorities);
        }
        Ok(Self { routes })
    }

    /// Walk the table in priority order and report the outcome for this
    /// record.
    ///
    /// Only the FIRST active route is a candidate: if its validation fails
    /// the whole call is `Rejected` and no lower-priority route runs in its
    /// place. An enabled-but-malformed high-priority family must fail
    /// loudly upstream, not silently cede control.
    pub fn evaluate(&self, conditions: &StrategyConditions) -> Selection<'_> {
        for route in &self.routes {
            if !route.is_active(conditions) {
                continue;
            }
            return match route.validate(conditions) {
                Ok(()) => Selection::Selected(route.as_ref()),
                Err(error) => {
                    warn!(
                        account = conditions.account_id,
                        strategy = %route.kind(),
                        field = error.field,
                        reason = %error.reason,
                        "Route rejected by validation, not falling through to lower priority"
                    );
                    Selection::Rejected {
                        strategy: route.kind(),
                        error,
                    }
                }
            };
        }
        Selection::Idle
    }

    /// The single route that should act on this record, if any.
    ///
    /// Validation failures and "nothing enabled" both come back as `None`;
    /// callers that need the distinction use [`RouteTable::evaluate`].
    pub fn select_route(&self, conditions: &StrategyConditions) -> Option<&dyn Route> {
        match self.evaluate(conditions) {
            Selection::Selected(route) => Some(route),
            _ => None,
        }
    }

    /// All routes in non-increasing priority order, for diagnostics and
    /// tests.
    pub fn all_routes(&self) -> impl Iterator<Item = &dyn Route> + '_ {
        self.routes.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::StrategyConfig;

    /// A valid conditions record with exactly one family enabled.
    fn valid_for(kind: StrategyKind) -> StrategyConditions {
        let mut conditions = StrategyConditions {
            account_id: 1,
            strategy_id: 11,
            ..StrategyConditions::default()
        };
        match kind {
            StrategyKind::MeanReversion => {
                conditions.mean_reversion_enabled = true;
                conditions.reversion_period = 20;
                conditions.reversion_band_multiplier = 2.0;
            }
            StrategyKind::MovingAverage => {
                conditions.moving_average_enabled = true;
                conditions.ma_short_period = 7;
                conditions.ma_long_period = 25;
                conditions.ma_kind = "EMA".to_string();
            }
            StrategyKind::Traditional => {
                conditions.traditional_enabled = true;
                conditions.gainers_rank_limit = 30;
                conditions.market_cap_limit = 10_000_000.0;
            }
            StrategyKind::Arbitrage => {
                conditions.arbitrage_enabled = true;
                conditions.arbitrage_spread_pct = 0.5;
            }
            StrategyKind::GridTrading => {
                conditions.grid_enabled = true;
                conditions.grid_levels = Some(12);
                conditions.grid_step_pct = Some(0.8);
            }
        }
        conditions
    }

    /// Enable `kind`'s flag on top of an existing record, with valid tunables.
    fn enable(conditions: &mut StrategyConditions, kind: StrategyKind) {
        let extra = valid_for(kind);
        match kind {
            StrategyKind::MeanReversion => {
                conditions.mean_reversion_enabled = true;
                conditions.reversion_period = extra.reversion_period;
                conditions.reversion_band_multiplier = extra.reversion_band_multiplier;
            }
            StrategyKind::MovingAverage => {
                conditions.moving_average_enabled = true;
                conditions.ma_short_period = extra.ma_short_period;
                conditions.ma_long_period = extra.ma_long_period;
                conditions.ma_kind = extra.ma_kind;
            }
            StrategyKind::Traditional => {
                conditions.traditional_enabled = true;
                conditions.gainers_rank_limit = extra.gainers_rank_limit;
                conditions.market_cap_limit = extra.market_cap_limit;
            }
            StrategyKind::Arbitrage => {
                conditions.arbitrage_enabled = true;
                conditions.arbitrage_spread_pct = extra.arbitrage_spread_pct;
            }
            StrategyKind::GridTrading => {
                conditions.grid_enabled = true;
                conditions.grid_levels = extra.grid_levels;
                conditions.grid_step_pct = extra.grid_step_pct;
            }
        }
    }

    #[test]
    fn standard_table_is_priority_sorted() {
        let table = RouteTable::standard();
        let priorities: Vec<u8> = table.all_routes().map(|r| r.priority()).collect();
        assert_eq!(priorities, vec![100, 90, 70, 60, 50]);

        let kinds: Vec<StrategyKind> = table.all_routes().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::MeanReversion,
                StrategyKind::MovingAverage,
                StrategyKind::Traditional,
                StrategyKind::Arbitrage,
                StrategyKind::GridTrading,
            ]
        );
    }

    #[test]
    fn standard_table_covers_every_family_once() {
        let table = RouteTable::standard();
        assert_eq!(table.len(), StrategyKind::ALL.len());
        for kind in StrategyKind::ALL {
            assert_eq!(table.all_routes().filter(|r| r.kind() == kind).count(), 1);
        }
    }

    #[test]
    fn single_enabled_family_is_selected() {
        let table = RouteTable::standard();
        for kind in StrategyKind::ALL {
            let conditions = valid_for(kind);
            let route = table
                .select_route(&conditions)
                .unwrap_or_else(|| panic!("no route for {kind}"));
            assert_eq!(route.kind(), kind);
        }
    }

    #[test]
    fn selected_route_builds_its_own_config_variant() {
        let table = RouteTable::standard();
        let conditions = valid_for(StrategyKind::Traditional);
        let route = table.select_route(&conditions).unwrap();
        match route.build_config(&conditions) {
            StrategyConfig::Traditional(config) => {
                assert_eq!(config.gainers_rank_limit, 30);
            }
            other => panic!("expected traditional config, got {other:?}"),
        }
    }

    #[test]
    fn highest_priority_wins_among_multiple_enabled() {
        let table = RouteTable::standard();

        let mut conditions = valid_for(StrategyKind::GridTrading);
        enable(&mut conditions, StrategyKind::Traditional);
        assert_eq!(
            table.select_route(&conditions).unwrap().kind(),
            StrategyKind::Traditional
        );

        enable(&mut conditions, StrategyKind::Arbitrage);
        assert_eq!(
            table.select_route(&conditions).unwrap().kind(),
            StrategyKind::Traditional
        );

        enable(&mut conditions, StrategyKind::MovingAverage);
        assert_eq!(
            table.select_route(&conditions).unwrap().kind(),
            StrategyKind::MovingAverage
        );

        enable(&mut conditions, StrategyKind::MeanReversion);
        assert_eq!(
            table.select_route(&conditions).unwrap().kind(),
            StrategyKind::MeanReversion
        );
    }

    #[test]
    fn nothing_enabled_selects_nothing() {
        let table = RouteTable::standard();
        let conditions = StrategyConditions::default();
        assert!(table.select_route(&conditions).is_none());
        assert!(matches!(table.evaluate(&conditions), Selection::Idle));
    }

    #[test]
    fn invalid_winner_blocks_valid_lower_priority_route() {
        let table = RouteTable::standard();

        // Mean reversion is enabled but malformed; grid trading is enabled
        // and valid. The call must select nothing rather than fall through.
        let mut conditions = valid_for(StrategyKind::GridTrading);
        conditions.mean_reversion_enabled = true;
        conditions.reversion_period = -5;

        assert!(table.select_route(&conditions).is_none());
        match table.evaluate(&conditions) {
            Selection::Rejected { strategy, error } => {
                assert_eq!(strategy, StrategyKind::MeanReversion);
                assert_eq!(error.field, "reversion_period");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn selection_debug_renders_route_by_kind() {
        let table = RouteTable::standard();

        let selected = table.evaluate(&valid_for(StrategyKind::Arbitrage));
        assert_eq!(format!("{selected:?}"), "Selected(Arbitrage)");

        assert_eq!(format!("{:?}", Selection::Idle), "Idle");

        let mut conditions = valid_for(StrategyKind::Arbitrage);
        conditions.arbitrage_spread_pct = -1.0;
        let rendered = format!("{:?}", table.evaluate(&conditions));
        assert!(rendered.contains("Rejected"));
        assert!(rendered.contains("arbitrage_spread_pct"));
    }

    #[test]
    fn oversized_long_period_is_rejected_not_wrapped() {
        let table = RouteTable::standard();

        // 2^32 + 5 would wrap to 5 in the config's u32 field, inverting the
        // short < long ordering the validator certifies.
        let mut conditions = valid_for(StrategyKind::MovingAverage);
        conditions.ma_short_period = 30;
        conditions.ma_long_period = (1_i64 << 32) + 5;

        assert!(table.select_route(&conditions).is_none());
        match table.evaluate(&conditions) {
            Selection::Rejected { strategy, error } => {
                assert_eq!(strategy, StrategyKind::MovingAverage);
                assert_eq!(error.field, "ma_long_period");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn invalid_ma_kind_blocks_lower_priority_route() {
        let table = RouteTable::standard();
        let mut conditions = valid_for(StrategyKind::MovingAverage);
        conditions.ma_kind = "HULL".to_string();
        enable(&mut conditions, StrategyKind::Arbitrage);

        assert!(table.select_route(&conditions).is_none());
        match table.evaluate(&conditions) {
            Selection::Rejected { strategy, error } => {
                assert_eq!(strategy, StrategyKind::MovingAverage);
                assert_eq!(error.field, "ma_kind");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_strategy_kind_is_a_construction_error() {
        let result = RouteTable::with_routes(vec![
            Box::new(TraditionalRoute),
            Box::new(TraditionalRoute),
        ]);
        assert_eq!(
            result.err(),
            Some(RouteTableError::DuplicateStrategy(StrategyKind::Traditional))
        );
    }

    #[test]
    fn increasing_priority_declaration_is_a_construction_error() {
        let result =
            RouteTable::with_routes(vec![Box::new(GridTradingRoute), Box::new(MeanReversionRoute)]);
        assert_eq!(result.err(), Some(RouteTableError::UnsortedPriorities));
    }

    // Test-only route with a fixed priority, for tie-break coverage.
    struct FixedRoute {
        kind: StrategyKind,
        priority: u8,
    }

    impl Route for FixedRoute {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn is_active(&self, _conditions: &StrategyConditions) -> bool {
            true
        }

        fn validate(&self, _conditions: &StrategyConditions) -> Result<(), ValidationError> {
            Ok(())
        }

        fn build_config(&self, conditions: &StrategyConditions) -> StrategyConfig {
            StrategyConfig::Arbitrage(crate::builders::arbitrage(conditions))
        }
    }

    #[test]
    fn equal_priorities_resolve_by_declaration_order() {
        let table = RouteTable::with_routes(vec![
            Box::new(FixedRoute {
                kind: StrategyKind::Arbitrage,
                priority: 60,
            }),
            Box::new(FixedRoute {
                kind: StrategyKind::GridTrading,
                priority: 60,
            }),
        ])
        .unwrap();

        let conditions = StrategyConditions::default();
        assert_eq!(
            table.select_route(&conditions).unwrap().kind(),
            StrategyKind::Arbitrage
        );
    }
}
