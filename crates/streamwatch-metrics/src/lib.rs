//! streamwatch-metrics — gauges for monitored devices.
//!
//! The [`MetricsRegistry`] is built once at startup and injected into the
//! monitor as a [`MetricsSink`]. The daemon renders it on `/metrics`.
//!
//! # Architecture
//!
//! ```text
//! MetricsRegistry
//!   ├── report_metrics() → tv2_device_status / _bitrate / _buffer_pct
//!   ├── set_status()     → tv2_device_online
//!   └── render()         → Prometheus text exposition
//! ```

pub mod prometheus;
pub mod registry;
pub mod sink;
pub mod status;

pub use prometheus::{render_prometheus, CONTENT_TYPE};
pub use registry::{GaugeVec, MetricsRegistry};
pub use sink::MetricsSink;
pub use status::status_gauge_value;
