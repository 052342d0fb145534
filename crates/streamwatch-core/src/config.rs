//! streamwatch.toml configuration parser.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::types::DeviceConfig;

const DEFAULT_INTERVAL: &str = "10s";
const DEFAULT_REQUEST_TIMEOUT: &str = "10s";
const DEFAULT_METRICS_LISTEN: &str = "0.0.0.0:5000";

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSettings {
    /// Wait between the end of one cycle and the start of the next.
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Upper bound on each device API call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Listen address of the Prometheus exporter.
    #[serde(default = "default_metrics_listen")]
    pub listen: String,
}

fn default_interval() -> String {
    DEFAULT_INTERVAL.to_string()
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

fn default_metrics_listen() -> String {
    DEFAULT_METRICS_LISTEN.to_string()
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen: default_metrics_listen(),
        }
    }
}

impl MonitorSettings {
    /// Parsed inter-cycle interval.
    pub fn cycle_interval(&self) -> ConfigResult<Duration> {
        positive_duration("monitor.interval", &self.interval)
    }

    /// Parsed per-call timeout.
    pub fn call_timeout(&self) -> ConfigResult<Duration> {
        positive_duration("monitor.request_timeout", &self.request_timeout)
    }
}

impl MonitorConfig {
    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate config text.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let config: MonitorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a config for an in-memory roster with default settings.
    pub fn with_devices(devices: Vec<DeviceConfig>) -> Self {
        Self {
            monitor: MonitorSettings::default(),
            metrics: MetricsConfig::default(),
            devices,
        }
    }

    /// Startup checks. Any error here is fatal.
    ///
    /// Empty names and addresses are not rejected: those devices are
    /// skipped each cycle instead.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }

        let mut seen = HashSet::new();
        for device in &self.devices {
            let name = device.name.trim();
            if !name.is_empty() && !seen.insert(name) {
                return Err(ConfigError::DuplicateDevice(name.to_string()));
            }
        }

        self.monitor.cycle_interval()?;
        self.monitor.call_timeout()?;
        Ok(())
    }
}

fn positive_duration(field: &'static str, value: &str) -> ConfigResult<Duration> {
    match parse_duration(value) {
        Some(d) if !d.is_zero() => Ok(d),
        _ => Err(ConfigError::InvalidDuration {
            field,
            value: value.to_string(),
        }),
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[monitor]
interval = "15s"
request_timeout = "500ms"

[metrics]
listen = "127.0.0.1:9100"

[[devices]]
name = "studio-a"
address = "192.168.1.100"
critical = true
server = "srt://ingest.example:9000"
audio_bitrate = 128000
video_bitrate = 7500000
resolution = "1080p"
fps = 50
codec = "H264"
username = "admin"
password = "secret"

[[devices]]
name = "studio-b"
address = "192.168.1.101"
"#;

    #[test]
    fn parse_full_config() {
        let config = MonitorConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.devices.len(), 2);
        assert_eq!(config.metrics.listen, "127.0.0.1:9100");
        assert_eq!(config.monitor.cycle_interval().unwrap(), Duration::from_secs(15));
        assert_eq!(config.monitor.call_timeout().unwrap(), Duration::from_millis(500));

        let a = &config.devices[0];
        assert!(a.critical);
        assert_eq!(a.video_bitrate, 7_500_000);
        assert_eq!(a.codec.as_deref(), Some("H264"));
        assert_eq!(a.username.as_deref(), Some("admin"));

        let b = &config.devices[1];
        assert!(!b.critical);
        assert!(b.server.is_none());
        assert!(b.password.is_none());
    }

    #[test]
    fn defaults_apply_when_sections_missing() {
        let config = MonitorConfig::parse(
            "[[devices]]\nname = \"cam\"\naddress = \"10.0.0.1\"\n",
        )
        .unwrap();
        assert_eq!(config.monitor.cycle_interval().unwrap(), Duration::from_secs(10));
        assert_eq!(config.monitor.call_timeout().unwrap(), Duration::from_secs(10));
        assert_eq!(config.metrics.listen, "0.0.0.0:5000");
    }

    #[test]
    fn empty_roster_is_fatal() {
        let err = MonitorConfig::parse("[monitor]\ninterval = \"10s\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::NoDevices));
    }

    #[test]
    fn duplicate_names_are_fatal() {
        let config = MonitorConfig::with_devices(vec![
            DeviceConfig::new("cam", "10.0.0.1"),
            DeviceConfig::new("cam", "10.0.0.2"),
        ]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateDevice(name)) if name == "cam"
        ));
    }

    #[test]
    fn blank_names_are_not_fatal() {
        let config = MonitorConfig::with_devices(vec![
            DeviceConfig::new("", "10.0.0.1"),
            DeviceConfig::new("", "10.0.0.2"),
            DeviceConfig::new("cam", ""),
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_rejected() {
        let mut config = MonitorConfig::with_devices(vec![DeviceConfig::new("cam", "10.0.0.1")]);
        config.monitor.interval = "0s".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration { field: "monitor.interval", .. })
        ));
    }

    #[test]
    fn invalid_toml_reported() {
        assert!(matches!(
            MonitorConfig::parse("[[devices]\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn from_file_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streamwatch.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = MonitorConfig::from_file(&path).unwrap();
        assert_eq!(config.devices[0].name, "studio-a");

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            MonitorConfig::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("soon"), None);
    }
}
