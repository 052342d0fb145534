//! Device roster and device state types.

use serde::Deserialize;

/// Static configuration for a single streaming device.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    /// Friendly name, used as the `device` metric label.
    #[serde(default)]
    pub name: String,
    /// Network address (`host` or `host:port`) of the device's HTTP API.
    #[serde(default, alias = "ip_address")]
    pub address: String,
    /// Critical devices trigger the offline alert hook.
    #[serde(default)]
    pub critical: bool,
    /// Streaming server endpoint (SRT or RTMP URL).
    pub server: Option<String>,
    /// Audio bitrate in bits per second (e.g. 128000).
    #[serde(default)]
    pub audio_bitrate: u32,
    /// Video bitrate in bits per second (e.g. 7500000).
    #[serde(default)]
    pub video_bitrate: u32,
    /// Stream resolution (e.g. "1080p").
    pub resolution: Option<String>,
    /// Frames per second.
    #[serde(default)]
    pub fps: u32,
    /// Video codec (e.g. "H264").
    pub codec: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl DeviceConfig {
    /// Create a device with only a name and address set.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            critical: false,
            server: None,
            audio_bitrate: 0,
            video_bitrate: 0,
            resolution: None,
            fps: 0,
            codec: None,
            username: None,
            password: None,
        }
    }

    /// Set the login credentials.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    /// Whether the device has both a name and an address to poll.
    ///
    /// Whitespace-only values count as missing.
    pub fn is_addressable(&self) -> bool {
        !self.name.trim().is_empty() && !self.address.trim().is_empty()
    }
}

/// Live stream state reported by a device.
///
/// One instance per successful fetch; never stored across cycles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceState {
    /// Free-form status label ("On", "Idle", "Streaming", "Interrupted", ...).
    #[serde(default)]
    pub status: String,
    /// Current bitrate in bits per second.
    #[serde(default)]
    pub bitrate: u64,
    /// Buffer occupancy percentage. Nominally 0-100, not enforced.
    #[serde(default, rename = "bufferPct")]
    pub buffer_pct: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_state_decodes_wire_format() {
        let json = r#"{"status": "On", "bitrate": 7500000, "bufferPct": 30}"#;
        let state: DeviceState = serde_json::from_str(json).unwrap();
        assert_eq!(state.status, "On");
        assert_eq!(state.bitrate, 7_500_000);
        assert_eq!(state.buffer_pct, 30);
    }

    #[test]
    fn device_state_missing_fields_default() {
        let state: DeviceState = serde_json::from_str("{}").unwrap();
        assert_eq!(state.status, "");
        assert_eq!(state.bitrate, 0);
        assert_eq!(state.buffer_pct, 0);
    }

    #[test]
    fn addressable_requires_name_and_address() {
        assert!(DeviceConfig::new("cam-1", "10.0.0.1").is_addressable());
        assert!(!DeviceConfig::new("", "10.0.0.1").is_addressable());
        assert!(!DeviceConfig::new("cam-1", "").is_addressable());
        assert!(!DeviceConfig::new("cam-1", "   ").is_addressable());
    }

    #[test]
    fn ip_address_alias_accepted() {
        let device: DeviceConfig =
            toml::from_str("name = \"cam\"\nip_address = \"10.0.0.2\"").unwrap();
        assert_eq!(device.address, "10.0.0.2");
        assert!(!device.critical);
    }
}
