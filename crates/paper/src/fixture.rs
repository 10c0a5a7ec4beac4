//! TOML-backed conditions and market data for paper mode.
//!
//! In paper mode there is no shared database; the bot reads a fixture book
//! instead. Account entries deserialize straight into the same conditions
//! record the live store produces, so the dispatch path is identical in
//! both modes.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use common::{
    ConditionStore, Error, MarketDataSource, MarketSnapshot, Result, StrategyConditions,
};

/// Fixture row for one symbol. `synced_at` is stamped at load time so the
/// book file stays terse.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct MarketEntry {
    symbol: String,
    price: f64,
    volume_24h: f64,
    market_cap: f64,
    gainers_rank: i64,
    has_spot_market: bool,
    has_futures_market: bool,
}

impl Default for MarketEntry {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            price: 0.0,
            volume_24h: 0.0,
            market_cap: 0.0,
            gainers_rank: 0,
            has_spot_market: false,
            has_futures_market: false,
        }
    }
}

/// In-memory stand-in for the live store, loaded once at startup.
///
/// ```toml
/// [[account]]
/// account_id = 1
/// strategy_id = 11
/// traditional_enabled = true
/// gainers_rank_limit = 25
/// market_cap_limit = 5000000.0
///
/// [[market]]
/// symbol = "BTCUSDT"
/// price = 50000.0
/// market_cap = 980000000000.0
/// gainers_rank = 3
/// has_spot_market = true
/// has_futures_market = true
/// ```
#[derive(Debug, Deserialize)]
pub struct PaperBook {
    #[serde(default, rename = "account")]
    accounts: Vec<StrategyConditions>,
    #[serde(default, rename = "market")]
    markets: Vec<MarketEntry>,
    #[serde(skip, default = "Utc::now")]
    loaded_at: DateTime<Utc>,
}

impl PaperBook {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let book: PaperBook = toml::from_str(raw)?;

        for (i, account) in book.accounts.iter().enumerate() {
            let dup = book.accounts[..i]
                .iter()
                .any(|a| a.account_id == account.account_id);
            if dup {
                return Err(Error::Config(format!(
                    "paper book lists account {} twice",
                    account.account_id
                )));
            }
        }
        for (i, market) in book.markets.iter().enumerate() {
            if book.markets[..i].iter().any(|m| m.symbol == market.symbol) {
                return Err(Error::Config(format!(
                    "paper book lists symbol '{}' twice",
                    market.symbol
                )));
            }
        }

        Ok(book)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let book = Self::from_toml_str(&raw)?;
        info!(
            path = %path.display(),
            accounts = book.accounts.len(),
            markets = book.markets.len(),
            "Paper book loaded"
        );
        Ok(book)
    }
}

#[async_trait]
impl ConditionStore for PaperBook {
    async fn conditions(&self, account_id: i64) -> Result<Option<StrategyConditions>> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.account_id == account_id)
            .cloned())
    }

    async fn active_accounts(&self) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = self
            .accounts
            .iter()
            .filter(|a| a.any_enabled())
            .map(|a| a.account_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[async_trait]
impl MarketDataSource for PaperBook {
    async fn snapshot(&self, symbol: &str) -> Result<Option<MarketSnapshot>> {
        Ok(self.markets.iter().find(|m| m.symbol == symbol).map(|m| {
            MarketSnapshot {
                symbol: m.symbol.clone(),
                price: m.price,
                volume_24h: m.volume_24h,
                market_cap: m.market_cap,
                gainers_rank: m.gainers_rank,
                has_spot_market: m.has_spot_market,
                has_futures_market: m.has_futures_market,
                synced_at: self.loaded_at,
            }
        }))
    }

    async fn tracked_symbols(&self) -> Result<Vec<String>> {
        let mut symbols: Vec<String> = self.markets.iter().map(|m| m.symbol.clone()).collect();
        symbols.sort_unstable();
        Ok(symbols)
    }
}
