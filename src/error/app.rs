use thiserror::Error;

use super::{ApiError, ConfigError, FleetError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Chef API error: {0}")]
    Api(#[from] ApiError),
    #[error("Fleet error: {0}")]
    Fleet(#[from] FleetError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn fleet<E>(error: E) -> Self
    where
        E: Into<FleetError>,
    {
        error.into().into()
    }
}
