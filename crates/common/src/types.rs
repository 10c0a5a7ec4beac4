use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// The closed set of strategy families helmbot can dispatch to.
///
/// `Display` renders the canonical snake_case token used in request ids,
/// logs, and the diagnostics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MeanReversion,
    MovingAverage,
    Traditional,
    Arbitrage,
    GridTrading,
}

impl StrategyKind {
    /// Every family, in declaration order. Used when wiring one backend
    /// per family and by table construction tests.
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::MeanReversion,
        StrategyKind::MovingAverage,
        StrategyKind::Traditional,
        StrategyKind::Arbitrage,
        StrategyKind::GridTrading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::MovingAverage => "moving_average",
            StrategyKind::Traditional => "traditional",
            StrategyKind::Arbitrage => "arbitrage",
            StrategyKind::GridTrading => "grid_trading",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Futures margin mode applied when a strategy opens a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarginMode {
    #[default]
    Isolated,
    Crossed,
}

impl MarginMode {
    /// Parse the persisted token. Returns `None` for anything that is not
    /// ISOLATED or CROSSED (validators treat that as a malformed record).
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("ISOLATED") {
            Some(MarginMode::Isolated)
        } else if token.eq_ignore_ascii_case("CROSSED") {
            Some(MarginMode::Crossed)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MarginMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarginMode::Isolated => write!(f, "ISOLATED"),
            MarginMode::Crossed => write!(f, "CROSSED"),
        }
    }
}

/// Moving-average flavor. SMA and EMA are the only recognized tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaKind {
    Sma,
    Ema,
}

impl MaKind {
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("SMA") {
            Some(MaKind::Sma)
        } else if token.eq_ignore_ascii_case("EMA") {
            Some(MaKind::Ema)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaKind::Sma => write!(f, "SMA"),
            MaKind::Ema => write!(f, "EMA"),
        }
    }
}

/// One account's strategy conditions, loaded fresh for every dispatch
/// decision and never cached here.
///
/// This is the raw persistence shape: flags are independent (zero, one, or
/// many families may be enabled) and tunables arrive unvalidated — signed
/// periods, free-text tokens. The dispatch validators decide what is
/// acceptable; nothing in this struct enforces ranges.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct StrategyConditions {
    pub account_id: i64,
    /// Row id of the conditions record; part of the deterministic request id.
    pub strategy_id: i64,

    // Traditional (top-gainers momentum)
    pub traditional_enabled: bool,
    pub gainers_rank_limit: i64,
    pub market_cap_limit: f64,

    // Moving-average crossover
    pub moving_average_enabled: bool,
    pub ma_short_period: i64,
    pub ma_long_period: i64,
    pub ma_kind: String,

    // Mean reversion
    pub mean_reversion_enabled: bool,
    pub reversion_period: i64,
    pub reversion_band_multiplier: f64,

    // Cross-market arbitrage
    pub arbitrage_enabled: bool,
    pub arbitrage_spread_pct: f64,

    // Grid trading
    pub grid_enabled: bool,
    pub grid_levels: Option<i64>,
    pub grid_step_pct: Option<f64>,

    // Account-wide position sizing and margin
    pub long_multiplier: f64,
    pub short_multiplier: f64,
    pub margin_mode: Option<String>,
}

impl StrategyConditions {
    /// True when at least one strategy family is switched on.
    pub fn any_enabled(&self) -> bool {
        self.traditional_enabled
            || self.moving_average_enabled
            || self.mean_reversion_enabled
            || self.arbitrage_enabled
            || self.grid_enabled
    }
}

impl Default for StrategyConditions {
    fn default() -> Self {
        Self {
            account_id: 0,
            strategy_id: 0,
            traditional_enabled: false,
            gainers_rank_limit: 0,
            market_cap_limit: 0.0,
            moving_average_enabled: false,
            ma_short_period: 0,
            ma_long_period: 0,
            ma_kind: "SMA".to_string(),
            mean_reversion_enabled: false,
            reversion_period: 0,
            reversion_band_multiplier: 0.0,
            arbitrage_enabled: false,
            arbitrage_spread_pct: 0.0,
            grid_enabled: false,
            grid_levels: None,
            grid_step_pct: None,
            long_multiplier: 1.0,
            short_multiplier: 1.0,
            margin_mode: None,
        }
    }
}

/// Latest market data for one symbol, as the sync job left it in the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub price: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    /// Position in the 24h top-gainers ranking (1 = biggest gainer).
    pub gainers_rank: i64,
    pub has_spot_market: bool,
    pub has_futures_market: bool,
    pub synced_at: DateTime<Utc>,
}

/// The market-data projection handed to an execution backend. Built per
/// dispatch call from a [`MarketSnapshot`] and discarded after use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketView {
    pub symbol: String,
    pub market_cap: f64,
    pub gainers_rank: i64,
    pub has_spot_market: bool,
    pub has_futures_market: bool,
}

/// Per-dispatch metadata passed alongside the strategy config.
///
/// `request_id` is derived, not random: `"{kind}-{strategy_id}-{symbol}"`.
/// It is an idempotency/tracing key for downstream order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub symbol: String,
    pub strategy: StrategyKind,
    pub account_id: i64,
    pub request_id: String,
}

/// Validated parameters for the traditional (top-gainers momentum) pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraditionalConfig {
    pub gainers_rank_limit: u32,
    pub market_cap_limit: f64,
    pub long_multiplier: f64,
    pub short_multiplier: f64,
    pub margin_mode: MarginMode,
}

/// Validated parameters for the moving-average crossover pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageConfig {
    pub short_period: u32,
    pub long_period: u32,
    pub kind: MaKind,
    pub long_multiplier: f64,
    pub short_multiplier: f64,
    pub margin_mode: MarginMode,
}

/// Validated parameters for the mean-reversion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanReversionConfig {
    pub lookback_period: u32,
    pub band_multiplier: f64,
    pub long_multiplier: f64,
    pub short_multiplier: f64,
    pub margin_mode: MarginMode,
}

/// Validated parameters for the spot/futures arbitrage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageConfig {
    pub min_spread_pct: f64,
    pub margin_mode: MarginMode,
}

/// Validated parameters for the grid-trading pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridTradingConfig {
    pub levels: u32,
    pub step_pct: f64,
    pub margin_mode: MarginMode,
}

/// The strategy-typed configuration a route hands to its execution backend.
/// Built once per dispatch call, immutable, owned by the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    MeanReversion(MeanReversionConfig),
    MovingAverage(MovingAverageConfig),
    Traditional(TraditionalConfig),
    Arbitrage(ArbitrageConfig),
    GridTrading(GridTradingConfig),
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::MeanReversion(_) => StrategyKind::MeanReversion,
            StrategyConfig::MovingAverage(_) => StrategyKind::MovingAverage,
            StrategyConfig::Traditional(_) => StrategyKind::Traditional,
            StrategyConfig::Arbitrage(_) => StrategyKind::Arbitrage,
            StrategyConfig::GridTrading(_) => StrategyKind::GridTrading,
        }
    }
}

/// Whether the bot reads the real store or the paper fixture book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    Live,
    Paper,
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingMode::Live => write!(f, "live"),
            TradingMode::Paper => write!(f, "paper"),
        }
    }
}

/// Terminal result of a single dispatch call. Either a fully validated
/// route+config+context reached a backend, or nothing did — never partial.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// A route was selected, validated, and its backend ran.
    Executed {
        strategy: StrategyKind,
        request_id: String,
    },
    /// The highest-priority enabled family failed validation. Lower-priority
    /// families do not run in its place.
    Rejected {
        strategy: StrategyKind,
        error: ValidationError,
    },
    /// No family is enabled for this account.
    NoRoute,
    /// The account has no conditions record.
    NoConditions,
    /// The symbol has no market snapshot yet.
    NoMarketData,
}
