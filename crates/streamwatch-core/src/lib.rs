//! streamwatch-core — shared types and configuration for streamwatch.
//!
//! Holds the static device roster (`DeviceConfig`), the transient
//! per-fetch `DeviceState`, and the `streamwatch.toml` loader that
//! validates the roster once at startup.

pub mod config;
pub mod error;
pub mod types;

pub use config::{parse_duration, MetricsConfig, MonitorConfig, MonitorSettings};
pub use error::{ConfigError, ConfigResult};
pub use types::{DeviceConfig, DeviceState};
