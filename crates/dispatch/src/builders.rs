//! Per-family config builders.
//!
//! Each builder is a pure mapping from a conditions record into that
//! family's validated config struct. Builders are only reached after the
//! route's validator accepted the record, so they never fail; family
//! defaults (margin mode, grid sizing) are applied here and nowhere else.

use common::{
    ArbitrageConfig, GridTradingConfig, MaKind, MarginMode, MeanReversionConfig,
    MovingAverageConfig, StrategyConditions, TraditionalConfig,
};

/// Grid levels used when the record leaves them unset.
pub const DEFAULT_GRID_LEVELS: u32 = 10;
/// Grid spacing (percent between adjacent levels) when unset.
pub const DEFAULT_GRID_STEP_PCT: f64 = 1.0;

pub fn traditional(conditions: &StrategyConditions) -> TraditionalConfig {
    TraditionalConfig {
        gainers_rank_limit: conditions.gainers_rank_limit as u32,
        market_cap_limit: conditions.market_cap_limit,
        long_multiplier: conditions.long_multiplier,
        short_multiplier: conditions.short_multiplier,
        margin_mode: margin_mode(conditions),
    }
}

pub fn moving_average(conditions: &StrategyConditions) -> MovingAverageConfig {
    MovingAverageConfig {
        short_period: conditions.ma_short_period as u32,
        long_period: conditions.ma_long_period as u32,
        kind: MaKind::from_token(&conditions.ma_kind).unwrap_or(MaKind::Sma),
        long_multiplier: conditions.long_multiplier,
        short_multiplier: conditions.short_multiplier,
        margin_mode: margin_mode(conditions),
    }
}

pub fn mean_reversion(conditions: &StrategyConditions) -> MeanReversionConfig {
    MeanReversionConfig {
        lookback_period: conditions.reversion_period as u32,
        band_multiplier: conditions.reversion_band_multiplier,
        long_multiplier: conditions.long_multiplier,
        short_multiplier: conditions.short_multiplier,
        margin_mode: margin_mode(conditions),
    }
}

pub fn arbitrage(conditions: &StrategyConditions) -> ArbitrageConfig {
    ArbitrageConfig {
        min_spread_pct: conditions.arbitrage_spread_pct,
        margin_mode: margin_mode(conditions),
    }
}

pub fn grid_trading(conditions: &StrategyConditions) -> GridTradingConfig {
    GridTradingConfig {
        levels: conditions
            .grid_levels
            .map(|v| v as u32)
            .unwrap_or(DEFAULT_GRID_LEVELS),
        step_pct: conditions.grid_step_pct.unwrap_or(DEFAULT_GRID_STEP_PCT),
        margin_mode: margin_mode(conditions),
    }
}

/// Unset or unparseable margin mode falls back to ISOLATED.
fn margin_mode(conditions: &StrategyConditions) -> MarginMode {
    conditions
        .margin_mode
        .as_deref()
        .and_then(MarginMode::from_token)
        .unwrap_or_default()
}
