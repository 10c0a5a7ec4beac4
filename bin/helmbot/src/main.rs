use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{
    ConditionStore, Config, ExecutionBackend, MarketDataSource, StrategyKind, TradingMode,
};
use dispatch::RouteTable;
use engine::Dispatcher;
use paper::{PaperBackend, PaperBook};
use store::SqlStore;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(mode = %cfg.trading_mode, "HelmBot starting");

    // ── Route table ───────────────────────────────────────────────────────────
    let table = Arc::new(RouteTable::standard());
    info!(routes = table.len(), "Route table ready");

    // ── Data sources (injected based on RUN_MODE) ─────────────────────────────
    let (conditions, market): (Arc<dyn ConditionStore>, Arc<dyn MarketDataSource>) =
        match cfg.trading_mode {
            TradingMode::Live => {
                let url = cfg
                    .database_url
                    .as_deref()
                    .expect("DATABASE_URL is required in live mode");
                let store = SqlStore::connect(url)
                    .await
                    .unwrap_or_else(|e| panic!("Failed to connect to database: {e}"));
                store
                    .migrate()
                    .await
                    .unwrap_or_else(|e| panic!("Database migration failed: {e}"));
                let store = Arc::new(store);
                (
                    store.clone() as Arc<dyn ConditionStore>,
                    store as Arc<dyn MarketDataSource>,
                )
            }
            TradingMode::Paper => {
                let book = PaperBook::load(&cfg.paper_book_path)
                    .unwrap_or_else(|e| panic!("Failed to load paper book: {e}"));
                let book = Arc::new(book);
                (
                    book.clone() as Arc<dyn ConditionStore>,
                    book as Arc<dyn MarketDataSource>,
                )
            }
        };

    // ── Execution backends ────────────────────────────────────────────────────
    // Every strategy family records to the in-process paper ledger.
    let paper_backend = Arc::new(PaperBackend::new());
    let mut backends: HashMap<StrategyKind, Arc<dyn ExecutionBackend>> = HashMap::new();
    for kind in StrategyKind::ALL {
        backends.insert(kind, paper_backend.clone());
    }

    // ── Dispatcher ────────────────────────────────────────────────────────────
    let dispatcher = Dispatcher::new(
        table.clone(),
        conditions.clone(),
        market.clone(),
        backends,
    );

    // ── Diagnostics API ───────────────────────────────────────────────────────
    let api_state = api::AppState {
        table: table.clone(),
        conditions: conditions.clone(),
        market: market.clone(),
        trading_mode: cfg.trading_mode,
        api_token: cfg.api_token.clone(),
    };

    // ── Spawn all tasks ───────────────────────────────────────────────────────
    let period = Duration::from_secs(cfg.dispatch_interval_secs);
    tokio::spawn(dispatcher.run(period));
    tokio::spawn(api::serve(api_state, cfg.api_port));

    // Keep main alive
    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    info!("Shutdown signal received. Exiting.");
}
