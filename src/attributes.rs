//! Loading of the shared Ohai attribute payload.
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::domain::Attributes;
use crate::error::{AppError, AppResult, ConfigError};

/// Reads the Ohai JSON object shared by every agent of the fleet.
///
/// A missing path only logs a warning and yields an empty store.
///
/// # Errors
///
/// Returns an error when the file cannot be read, isn't valid JSON, or isn't a
/// JSON object.
pub fn load_attributes(path: Option<&Path>) -> AppResult<Arc<Attributes>> {
    let Some(path) = path else {
        warn!("No ohai data provided, nearly empty node objects will be used!");
        return Ok(Arc::new(Attributes::new()));
    };

    let content = std::fs::read(path).map_err(|source| {
        AppError::config(ConfigError::ReadAttributes {
            path: path.to_path_buf(),
            source,
        })
    })?;
    let value: Value = serde_json::from_slice(&content).map_err(|source| {
        AppError::config(ConfigError::ParseAttributes {
            path: path.to_path_buf(),
            source,
        })
    })?;

    match value {
        Value::Object(attributes) => Ok(Arc::new(attributes)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            Err(AppError::config(ConfigError::AttributesNotObject {
                path: path.to_path_buf(),
            }))
        }
    }
}
