pub mod backend;
pub mod config;
pub mod error;
pub mod sources;
pub mod types;

pub use backend::ExecutionBackend;
pub use config::Config;
pub use error::{Error, Result, RouteTableError, ValidationError};
pub use sources::{ConditionStore, MarketDataSource};
pub use types::*;
