use common::{
    MaKind, MarginMode, StrategyConditions, StrategyConfig, StrategyKind, ValidationError,
};

use crate::builders;
use crate::Route;

/// Mean reversion: statistically-driven entries when price stretches too far
/// from its rolling mean. Highest priority of the five families.
pub struct MeanReversionRoute;

impl Route for MeanReversionRoute {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MeanReversion
    }

    fn priority(&self) -> u8 {
        100
    }

    fn is_active(&self, conditions: &StrategyConditions) -> bool {
        conditions.mean_reversion_enabled
    }

    fn validate(&self, conditions: &StrategyConditions) -> Result<(), ValidationError> {
        check_period("reversion_period", conditions.reversion_period)?;
        check_positive(
            "reversion_band_multiplier",
            conditions.reversion_band_multiplier,
        )?;
        check_sizing(conditions)?;
        check_margin_mode(conditions)
    }

    fn build_config(&self, conditions: &StrategyConditions) -> StrategyConfig {
        StrategyConfig::MeanReversion(builders::mean_reversion(conditions))
    }
}

/// Trend-following moving-average crossover (SMA or EMA pair).
pub struct MovingAverageRoute;

impl Route for MovingAverageRoute {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MovingAverage
    }

    fn priority(&self) -> u8 {
        90
    }

    fn is_active(&self, conditions: &StrategyConditions) -> bool {
        conditions.moving_average_enabled
    }

    fn validate(&self, conditions: &StrategyConditions) -> Result<(), ValidationError> {
        check_period("ma_short_period", conditions.ma_short_period)?;
        check_period("ma_long_period", conditions.ma_long_period)?;
        if conditions.ma_short_period >= conditions.ma_long_period {
            return Err(ValidationError::new(
                "ma_short_period",
                format!(
                    "short period {} must be less than long period {}",
                    conditions.ma_short_period, conditions.ma_long_period
                ),
            ));
        }
        if MaKind::from_token(&conditions.ma_kind).is_none() {
            return Err(ValidationError::new(
                "ma_kind",
                format!("unrecognized token '{}', expected SMA or EMA", conditions.ma_kind),
            ));
        }
        check_sizing(conditions)?;
        check_margin_mode(conditions)
    }

    fn build_config(&self, conditions: &StrategyConditions) -> StrategyConfig {
        StrategyConfig::MovingAverage(builders::moving_average(conditions))
    }
}

/// Traditional top-gainers momentum, the original helmbot pipeline.
pub struct TraditionalRoute;

impl Route for TraditionalRoute {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Traditional
    }

    fn priority(&self) -> u8 {
        70
    }

    fn is_active(&self, conditions: &StrategyConditions) -> bool {
        conditions.traditional_enabled
    }

    fn validate(&self, conditions: &StrategyConditions) -> Result<(), ValidationError> {
        check_non_negative_int("gainers_rank_limit", conditions.gainers_rank_limit)?;
        check_non_negative("market_cap_limit", conditions.market_cap_limit)?;
        check_sizing(conditions)?;
        check_margin_mode(conditions)
    }

    fn build_config(&self, conditions: &StrategyConditions) -> StrategyConfig {
        StrategyConfig::Traditional(builders::traditional(conditions))
    }
}

/// Spot/futures price-gap arbitrage.
pub struct ArbitrageRoute;

impl Route for ArbitrageRoute {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Arbitrage
    }

    fn priority(&self) -> u8 {
        60
    }

    fn is_active(&self, conditions: &StrategyConditions) -> bool {
        conditions.arbitrage_enabled
    }

    fn validate(&self, conditions: &StrategyConditions) -> Result<(), ValidationError> {
        check_positive("arbitrage_spread_pct", conditions.arbitrage_spread_pct)?;
        check_margin_mode(conditions)
    }

    fn build_config(&self, conditions: &StrategyConditions) -> StrategyConfig {
        StrategyConfig::Arbitrage(builders::arbitrage(conditions))
    }
}

/// Grid trading, the lowest-frequency family.
pub struct GridTradingRoute;

impl Route for GridTradingRoute {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GridTrading
    }

    fn priority(&self) -> u8 {
        50
    }

    fn is_active(&self, conditions: &StrategyConditions) -> bool {
        conditions.grid_enabled
    }

    fn validate(&self, conditions: &StrategyConditions) -> Result<(), ValidationError> {
        if let Some(levels) = conditions.grid_levels {
            if levels <= 0 {
                return Err(ValidationError::new(
                    "grid_levels",
                    format!("must be strictly positive, got {levels}"),
                ));
            }
            check_fits_u32("grid_levels", levels)?;
        }
        if let Some(step) = conditions.grid_step_pct {
            check_positive("grid_step_pct", step)?;
        }
        check_margin_mode(conditions)
    }

    fn build_config(&self, conditions: &StrategyConditions) -> StrategyConfig {
        StrategyConfig::GridTrading(builders::grid_trading(conditions))
    }
}

// ─── Shared validation checks ─────────────────────────────────────────────────

fn check_non_negative_int(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    check_fits_u32(field, value)
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value < 0.0 {
        return Err(ValidationError::new(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

fn check_period(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(
            field,
            format!("must be a strictly positive integer, got {value}"),
        ));
    }
    check_fits_u32(field, value)
}

/// Integer tunables land in u32 config fields; the builders' narrowing
/// casts rely on this bound having been enforced.
fn check_fits_u32(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value > i64::from(u32::MAX) {
        return Err(ValidationError::new(
            field,
            format!("must be at most {}, got {value}", u32::MAX),
        ));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value <= 0.0 {
        return Err(ValidationError::new(
            field,
            format!("must be strictly positive, got {value}"),
        ));
    }
    Ok(())
}

/// Long/short position sizing multipliers, shared by the directional families.
fn check_sizing(conditions: &StrategyConditions) -> Result<(), ValidationError> {
    check_positive("long_multiplier", conditions.long_multiplier)?;
    check_positive("short_multiplier", conditions.short_multiplier)
}

/// Margin mode is optional; when present it must be a recognized token.
fn check_margin_mode(conditions: &StrategyConditions) -> Result<(), ValidationError> {
    match conditions.margin_mode.as_deref() {
        None => Ok(()),
        Some(token) => match MarginMode::from_token(token) {
            Some(_) => Ok(()),
            None => Err(ValidationError::new(
                "margin_mode",
                format!("unrecognized token '{token}', expected ISOLATED or CROSSED"),
            )),
        },
    }
}
