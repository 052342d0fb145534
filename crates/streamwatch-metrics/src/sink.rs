//! The metrics capability consumed by the monitor.

use streamwatch_core::DeviceState;

/// Accepts labeled gauge updates for devices.
///
/// Updates are fire-and-forget; implementations must not fail.
pub trait MetricsSink: Send + Sync {
    /// Export status, bitrate, and buffer occupancy for `device`.
    fn report_metrics(&self, device: &str, state: &DeviceState);

    /// Set the online gauge for `device` at `address`.
    fn set_status(&self, device: &str, address: &str, online: bool);
}
