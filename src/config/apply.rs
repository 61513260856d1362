use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::api::ApiSettings;
use crate::args::LoadArgs;
use crate::domain::{RunConfig, RunCount};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

const DEFAULT_NODES: usize = 10;
const DEFAULT_NODE_NAME_PREFIX: &str = "chef-load";
const DEFAULT_SLEEP_SECS: u64 = 1800;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CHEF_VERSION: &str = "13.0.0";

/// Everything a fleet run needs, resolved from the config file and CLI.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub run: RunConfig,
    pub api: ApiSettings,
    pub client_name: String,
    pub client_key: PathBuf,
    pub ohai_json_file: Option<PathBuf>,
    pub chef_version: String,
}

/// Merges the config file with command line overrides.
///
/// # Errors
///
/// Returns an error when a required field is missing or a value is invalid.
pub fn build_settings(config: ConfigFile, args: &LoadArgs) -> AppResult<LoadSettings> {
    let server_url = config
        .chef_server_url
        .ok_or_else(|| AppError::config(ConfigError::MissingField {
            field: "chef_server_url",
        }))?;
    let client_name = config
        .client_name
        .ok_or_else(|| AppError::config(ConfigError::MissingField {
            field: "client_name",
        }))?;
    let client_key = config
        .client_key
        .ok_or_else(|| AppError::config(ConfigError::MissingField {
            field: "client_key",
        }))?;

    let node_count = args.nodes.or(config.nodes).unwrap_or(DEFAULT_NODES);
    let runs = args.runs.or(config.runs).unwrap_or(0);

    let run = RunConfig {
        node_count,
        run_count: RunCount::from_config(runs),
        sleep_duration: Duration::from_secs(config.sleep_duration.unwrap_or(DEFAULT_SLEEP_SECS)),
        node_name_prefix: config
            .node_name_prefix
            .unwrap_or_else(|| DEFAULT_NODE_NAME_PREFIX.to_owned()),
        run_list: config.run_list.unwrap_or_default(),
        api_get_requests: config.api_get_requests.unwrap_or_default(),
        download_cookbooks: config.download_cookbooks.unwrap_or(false),
    };

    let api = ApiSettings {
        server_url: parse_server_url(&server_url)?,
        request_timeout: resolve_duration(
            "request_timeout",
            config.request_timeout.as_ref(),
            DEFAULT_REQUEST_TIMEOUT,
        )?,
        connect_timeout: resolve_duration(
            "connect_timeout",
            config.connect_timeout.as_ref(),
            DEFAULT_CONNECT_TIMEOUT,
        )?,
        insecure: config.insecure.unwrap_or(false),
    };

    Ok(LoadSettings {
        run,
        api,
        client_name,
        client_key,
        ohai_json_file: config.ohai_json_file,
        chef_version: config
            .chef_version
            .unwrap_or_else(|| DEFAULT_CHEF_VERSION.to_owned()),
    })
}

/// Parses the organization URL and makes sure it ends with `/`, so that
/// relative API paths resolve beneath it.
fn parse_server_url(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&normalized).map_err(|source| {
        AppError::config(ConfigError::InvalidServerUrl {
            url: raw.to_owned(),
            source,
        })
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(AppError::config(ConfigError::UnsupportedScheme {
            url: raw.to_owned(),
        })),
    }
}

fn resolve_duration(
    field: &'static str,
    value: Option<&DurationValue>,
    default: Duration,
) -> AppResult<Duration> {
    value.map_or(Ok(default), |value| {
        value.to_duration(field).map_err(AppError::config)
    })
}
