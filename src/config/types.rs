use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// On-disk configuration. Every field is optional here; required ones are
/// enforced when the settings are built.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub chef_server_url: Option<String>,
    pub client_name: Option<String>,
    pub client_key: Option<PathBuf>,
    #[serde(alias = "ohai_data")]
    pub ohai_json_file: Option<PathBuf>,
    pub nodes: Option<usize>,
    pub runs: Option<u64>,
    pub node_name_prefix: Option<String>,
    /// Seconds each run sleeps before saving its node.
    pub sleep_duration: Option<u64>,
    pub run_list: Option<Vec<String>>,
    pub api_get_requests: Option<Vec<String>>,
    pub download_cookbooks: Option<bool>,
    pub request_timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub insecure: Option<bool>,
    pub chef_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    /// Resolves the value given for `field`. Bare numbers and unitless text
    /// are seconds; text may also carry `ms`, `s`, `m` or `h`.
    pub(crate) fn to_duration(&self, field: &'static str) -> Result<Duration, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidDuration { field, reason };
        let duration = match self {
            DurationValue::Seconds(secs) => Duration::from_secs(*secs),
            DurationValue::Text(text) => parse_text(text).map_err(invalid)?,
        };
        if duration.is_zero() {
            return Err(invalid("must be greater than zero".to_owned()));
        }
        Ok(duration)
    }
}

fn parse_text(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    let digits_end = text
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(text.len());
    let (amount, unit) = text.split_at(digits_end);
    let amount: u64 = amount
        .parse()
        .map_err(|_err| format!("'{}' doesn't start with a number", text))?;
    let millis_per_unit: u64 = match unit.trim() {
        "ms" => 1,
        "" | "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        other => return Err(format!("unknown unit '{}' in '{}'", other, text)),
    };
    amount
        .checked_mul(millis_per_unit)
        .map(Duration::from_millis)
        .ok_or_else(|| format!("'{}' is too large", text))
}
