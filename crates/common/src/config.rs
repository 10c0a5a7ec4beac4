use crate::TradingMode;

/// Runtime settings, resolved once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// live = read the real store; paper = read the fixture book.
    pub trading_mode: TradingMode,

    /// Required in live mode, unused in paper mode.
    pub database_url: Option<String>,

    /// Fixture book path for paper mode.
    pub paper_book_path: String,

    /// Seconds between dispatch cycles.
    pub dispatch_interval_secs: u64,

    // Diagnostics API
    pub api_token: String,
    pub api_port: u16,
}

impl Config {
    /// Resolve every setting, reading `.env` first when one exists.
    /// A missing required key panics, before any task is spawned.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // .env is optional

        let trading_mode = match required_env("RUN_MODE").to_lowercase().as_str() {
            "paper" => TradingMode::Paper,
            "live" => TradingMode::Live,
            other => panic!("RUN_MODE must be 'live' or 'paper', got '{other}'"),
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        if trading_mode == TradingMode::Live && database_url.is_none() {
            panic!("DATABASE_URL must be set when RUN_MODE=live");
        }

        Config {
            trading_mode,
            database_url,
            paper_book_path: std::env::var("PAPER_BOOK_PATH")
                .unwrap_or_else(|_| "config/paper_book.toml".to_string()),
            dispatch_interval_secs: parsed_env("DISPATCH_INTERVAL_SECS", 60),
            api_token: required_env("API_TOKEN"),
            api_port: parsed_env("API_PORT", 8080),
        }
    }
}

fn required_env(key: &str) -> String {
    match std::env::var(key) {
        Ok(value) => value,
        Err(_) => panic!("missing required environment variable {key}"),
    }
}

/// Parse `key` into `T`, falling back to `default` when unset or malformed.
fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
