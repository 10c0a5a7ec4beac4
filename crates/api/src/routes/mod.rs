mod diag;
mod health;

pub use diag::diag_router;
pub use health::health_router;
