//! Runtime settings.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file, then
//! `TRACE_*` environment variables. Command-line flags are applied on top by
//! the binary.
//!
//! ```toml
//! api_url = "http://localhost:8000"
//! ws_url = "ws://localhost:8000/ws"
//! region = "us-east-1"
//! tick = "1s"
//! reconnect_interval = "5s"
//! stage_delay = "800ms"
//! request_timeout = "10s"
//! offline = false
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use trace_api::ApiClient;

use crate::data::duration::parse_duration;
use crate::source::StreamSettings;

/// Environment variable prefix (`TRACE_API_URL`, `TRACE_REGION`, ...).
pub const ENV_PREFIX: &str = "TRACE";

/// Settings as written in files and the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSettings {
    api_url: String,
    ws_url: String,
    region: String,
    tick: String,
    reconnect_interval: String,
    stage_delay: String,
    request_timeout: String,
    offline: bool,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            api_url: trace_api::client::DEFAULT_ENDPOINT.to_string(),
            ws_url: "ws://localhost:8000/ws".to_string(),
            region: trace_api::client::DEFAULT_REGION.to_string(),
            tick: "1s".to_string(),
            reconnect_interval: "5s".to_string(),
            stage_delay: "800ms".to_string(),
            request_timeout: "10s".to_string(),
            offline: false,
        }
    }
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub ws_url: String,
    pub region: String,
    /// Synthetic generator interval.
    pub tick: Duration,
    pub reconnect_interval: Duration,
    /// Hold time of each remediation stage.
    pub stage_delay: Duration,
    pub request_timeout: Duration,
    /// Never try the live socket.
    pub offline: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: trace_api::client::DEFAULT_ENDPOINT.to_string(),
            ws_url: "ws://localhost:8000/ws".to_string(),
            region: trace_api::client::DEFAULT_REGION.to_string(),
            tick: Duration::from_secs(1),
            reconnect_interval: Duration::from_secs(5),
            stage_delay: Duration::from_millis(800),
            request_timeout: Duration::from_secs(10),
            offline: false,
        }
    }
}

impl Settings {
    /// Load settings from defaults, `path` (if given) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::build(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn build(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(env)
            .build()
            .context("Failed to load configuration")?;

        let raw: RawSettings = config
            .try_deserialize()
            .context("Invalid configuration")?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let duration = |name: &str, value: &str| {
            parse_duration(value).with_context(|| format!("Invalid {}: {:?}", name, value))
        };

        Ok(Self {
            tick: check_tick(duration("tick", &raw.tick)?)?,
            reconnect_interval: duration("reconnect_interval", &raw.reconnect_interval)?,
            stage_delay: duration("stage_delay", &raw.stage_delay)?,
            request_timeout: duration("request_timeout", &raw.request_timeout)?,
            api_url: raw.api_url,
            ws_url: raw.ws_url,
            region: raw.region,
            offline: raw.offline,
        })
    }

    /// Settings for the stream supervisor.
    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            ws_url: self.ws_url.clone(),
            region: self.region.clone(),
            tick: self.tick,
            reconnect_interval: self.reconnect_interval,
            offline: self.offline,
            ..StreamSettings::default()
        }
    }

    /// REST client for the configured backend.
    pub fn api_client(&self) -> ApiClient {
        ApiClient::builder()
            .endpoint(&self.api_url)
            .region(&self.region)
            .timeout(self.request_timeout)
            .build()
    }
}

/// Reject a zero generator interval.
pub fn check_tick(tick: Duration) -> Result<Duration> {
    if tick.is_zero() {
        bail!("Invalid tick: must be greater than zero");
    }
    Ok(tick)
}
