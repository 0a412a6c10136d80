pub mod config;
pub mod error;
pub mod event_bus;

pub use config::AppConfig;
pub use error::{ZaplineError, ZaplineResult};
