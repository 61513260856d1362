mod api;
mod app;
mod config;
mod fleet;

pub use api::ApiError;
pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use fleet::FleetError;
