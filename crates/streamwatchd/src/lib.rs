//! streamwatchd — assembles the monitor, device client, and exporter.
//!
//! ```text
//! streamwatch.toml ─► MonitorConfig ─► MonitorLoop ──► HttpDeviceClient ─► devices
//!                                          │
//!                                          ▼
//!                                   MetricsRegistry ◄── GET /metrics
//! ```

pub mod app;
pub mod server;

pub use app::{run, summarize};
pub use server::build_router;
