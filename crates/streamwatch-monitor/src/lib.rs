//! streamwatch-monitor — device polling and remediation.
//!
//! # Architecture
//!
//! ```text
//! MonitorLoop
//!   ├── every interval, for each device in roster order:
//!   │   ├── DeviceApi::fetch_state() → MetricsSink::report_metrics / set_status(true)
//!   │   ├── RemediationWorkflow::apply()
//!   │   │     authenticate → stop stream → push config → start stream
//!   │   │     (first failure ends the sequence)
//!   │   └── failure → MetricsSink::set_status(false)
//!   └── optional AlertCallback for critical devices that are offline
//! ```
//!
//! Devices are processed one at a time. Each device's unit of work runs
//! in its own task so a panic is contained to that device. Shutdown is
//! checked before each device and during the inter-cycle wait.
//!
//! # Limitations
//!
//! Device calls are only bounded by the device client's request timeout.
//! A slow device delays every device after it in the cycle.

pub mod monitor;
pub mod remediation;

#[cfg(test)]
mod testing;

pub use monitor::{AlertCallback, MonitorLoop, DEFAULT_INTERVAL};
pub use remediation::{RemediationFailure, RemediationOutcome, RemediationWorkflow, Step};
