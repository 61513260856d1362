use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Config is missing required field '{field}'.")]
    MissingField { field: &'static str },
    #[error("Invalid chef_server_url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("chef_server_url '{url}' must use http or https.")]
    UnsupportedScheme { url: String },
    #[error("Invalid duration for '{field}': {reason}")]
    InvalidDuration { field: &'static str, reason: String },
    #[error("Could not read client key '{path}': {source}")]
    ReadClientKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not open specified ohai data '{path}': {source}")]
    ReadAttributes {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse ohai data '{path}': {source}")]
    ParseAttributes {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Ohai data '{path}' must be a JSON object.")]
    AttributesNotObject { path: PathBuf },
}
