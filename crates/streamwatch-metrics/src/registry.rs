//! Gauge registry for device metrics.
//!
//! Samples are kept sorted by label values so exposition output is
//! stable between scrapes.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use streamwatch_core::DeviceState;

use crate::prometheus::render_prometheus;
use crate::sink::MetricsSink;
use crate::status::status_gauge_value;

/// A labeled gauge family. Each update overwrites the previous value
/// for the same label set.
#[derive(Debug)]
pub struct GaugeVec {
    name: &'static str,
    help: &'static str,
    label_names: &'static [&'static str],
    values: RwLock<BTreeMap<Vec<String>, f64>>,
}

impl GaugeVec {
    pub fn new(
        name: &'static str,
        help: &'static str,
        label_names: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            label_names,
            values: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn help(&self) -> &'static str {
        self.help
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        self.label_names
    }

    /// Set the gauge for a label set. Label values are positional.
    pub fn set(&self, labels: &[&str], value: f64) {
        debug_assert_eq!(labels.len(), self.label_names.len());
        let key = labels.iter().map(|l| l.to_string()).collect();
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
    }

    /// Current value for a label set, if it was ever set.
    pub fn get(&self, labels: &[&str]) -> Option<f64> {
        let key: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(&key).copied()
    }

    /// All (labels, value) pairs in label order.
    pub fn samples(&self) -> Vec<(Vec<String>, f64)> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

/// The device gauges, constructed once and shared by reference.
#[derive(Debug)]
pub struct MetricsRegistry {
    status: GaugeVec,
    bitrate: GaugeVec,
    buffer: GaugeVec,
    online: GaugeVec,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            status: GaugeVec::new(
                "tv2_device_status",
                "0=Offline, 1=Idle, 2=Streaming, -1=Interrupted",
                &["device"],
            ),
            bitrate: GaugeVec::new("tv2_device_bitrate", "Stream bitrate (bps)", &["device"]),
            buffer: GaugeVec::new(
                "tv2_device_buffer_pct",
                "Stream buffer percentage",
                &["device"],
            ),
            online: GaugeVec::new(
                "tv2_device_online",
                "Device online status (1 = online, 0 = offline)",
                &["device_name", "ip"],
            ),
        }
    }

    pub fn status(&self) -> &GaugeVec {
        &self.status
    }

    pub fn bitrate(&self) -> &GaugeVec {
        &self.bitrate
    }

    pub fn buffer(&self) -> &GaugeVec {
        &self.buffer
    }

    pub fn online(&self) -> &GaugeVec {
        &self.online
    }

    /// All gauge families in exposition order.
    pub fn families(&self) -> [&GaugeVec; 4] {
        [&self.status, &self.bitrate, &self.buffer, &self.online]
    }

    /// Render every family in Prometheus text format.
    pub fn render(&self) -> String {
        render_prometheus(&self.families())
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSink for MetricsRegistry {
    fn report_metrics(&self, device: &str, state: &DeviceState) {
        let status = status_gauge_value(&state.status);
        self.status.set(&[device], status as f64);
        self.bitrate.set(&[device], state.bitrate as f64);
        self.buffer.set(&[device], f64::from(state.buffer_pct));
        debug!(
            %device,
            status = %state.status,
            bitrate = state.bitrate,
            buffer_pct = state.buffer_pct,
            "device metrics updated"
        );
    }

    fn set_status(&self, device: &str, address: &str, online: bool) {
        self.online
            .set(&[device, address], if online { 1.0 } else { 0.0 });
    }
}
