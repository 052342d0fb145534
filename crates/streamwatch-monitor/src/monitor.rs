//! Monitor loop: polls every device on a fixed interval.
//!
//! Each cycle walks the roster in order. For every device the loop
//! exports the fetched state and then runs the remediation workflow.
//! The per-device unit of work runs in its own task, so a failure stays
//! with that device.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use streamwatch_core::{ConfigError, ConfigResult, DeviceConfig};
use streamwatch_device::{ApiError, DeviceApi};
use streamwatch_metrics::MetricsSink;

use crate::remediation::RemediationWorkflow;

/// Wait between cycles when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Callback invoked when a critical device is offline.
///
/// Receives the device and the error that showed it was unreachable.
pub type AlertCallback = Arc<dyn Fn(&DeviceConfig, &ApiError) + Send + Sync>;

/// Drives continuous, cancellable monitoring of a fixed device roster.
pub struct MonitorLoop {
    devices: Arc<[DeviceConfig]>,
    api: Arc<dyn DeviceApi>,
    metrics: Arc<dyn MetricsSink>,
    workflow: Arc<RemediationWorkflow>,
    on_offline: Option<AlertCallback>,
    interval: Duration,
}

impl MonitorLoop {
    /// Create a monitor for `devices`.
    ///
    /// An empty roster is a configuration error; the monitor never starts.
    pub fn new(
        devices: Vec<DeviceConfig>,
        api: Arc<dyn DeviceApi>,
        metrics: Arc<dyn MetricsSink>,
    ) -> ConfigResult<Self> {
        if devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }

        Ok(Self {
            devices: devices.into(),
            workflow: Arc::new(RemediationWorkflow::new(api.clone())),
            api,
            metrics,
            on_offline: None,
            interval: DEFAULT_INTERVAL,
        })
    }

    /// Set the wait between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set a callback for critical devices found offline.
    pub fn with_alert(mut self, callback: AlertCallback) -> Self {
        self.on_offline = Some(callback);
        self
    }

    pub fn devices(&self) -> &[DeviceConfig] {
        &self.devices
    }

    /// Run cycles until `shutdown` is raised or its sender is dropped.
    ///
    /// A device already being processed runs to completion; shutdown is
    /// honored before the next device and during the inter-cycle wait.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            devices = self.devices.len(),
            interval_secs = self.interval.as_secs(),
            "device monitor started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let processed = self.run_cycle(&shutdown).await;
            debug!(devices = processed, "monitoring cycle complete");

            if self.wait_for_next_cycle(&mut shutdown).await {
                debug!("device monitor shutting down");
                break;
            }
        }

        info!("device monitor stopped");
    }

    /// Sleep out the interval. Returns true if shutdown was raised or the
    /// sender dropped; a `false` update keeps waiting.
    async fn wait_for_next_cycle(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let deadline = tokio::time::sleep(self.interval);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => return false,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return true;
                    }
                }
            }
        }
    }

    /// Process every device once, in roster order.
    ///
    /// Returns the number of devices processed, which is less than the
    /// roster size only if shutdown was raised mid-cycle.
    pub async fn run_cycle(&self, shutdown: &watch::Receiver<bool>) -> usize {
        let mut processed = 0;
        for device in self.devices.iter() {
            if *shutdown.borrow() {
                debug!(remaining = self.devices.len() - processed, "shutdown requested mid-cycle");
                break;
            }
            self.process_device(device).await;
            processed += 1;
        }
        processed
    }

    /// The isolated per-device unit of work.
    ///
    /// Never propagates a failure. A panic inside the unit is contained to
    /// its task and logged as an unexpected error.
    pub async fn process_device(&self, device: &DeviceConfig) {
        let unit = DeviceUnit {
            api: self.api.clone(),
            metrics: self.metrics.clone(),
            workflow: self.workflow.clone(),
            on_offline: self.on_offline.clone(),
        };
        let owned = device.clone();

        let handle = tokio::spawn(async move { unit.run(&owned).await });
        if let Err(e) = handle.await {
            warn!(
                device = %device.name,
                address = %device.address,
                error = %e,
                "unexpected error while processing device"
            );
        }
    }
}

/// Everything one device's unit of work needs, owned so it can run in
/// its own task.
struct DeviceUnit {
    api: Arc<dyn DeviceApi>,
    metrics: Arc<dyn MetricsSink>,
    workflow: Arc<RemediationWorkflow>,
    on_offline: Option<AlertCallback>,
}

impl DeviceUnit {
    async fn run(&self, device: &DeviceConfig) {
        if !device.is_addressable() {
            warn!(
                device = %device.name,
                address = %device.address,
                "skipping device due to missing address or name"
            );
            return;
        }

        let mut offline_reported = false;
        match self.api.fetch_state(&device.address).await {
            Ok(Some(state)) => {
                self.metrics.report_metrics(&device.name, &state);
                self.metrics.set_status(&device.name, &device.address, true);
            }
            Ok(None) => {
                debug!(device = %device.name, "device reported no state");
            }
            Err(e) => {
                offline_reported = e.is_offline();
                self.report_fault(device, &e);
            }
        }

        let outcome = self
            .workflow
            .apply(
                device,
                device.username.as_deref(),
                device.password.as_deref(),
            )
            .await;

        match outcome {
            Ok(()) => {
                info!(device = %device.name, "device updated successfully");
            }
            Err(failure) => {
                warn!(device = %device.name, reason = %failure, "device update failed");
                self.metrics.set_status(&device.name, &device.address, false);

                if let Some(e) = failure.api_error() {
                    if e.is_offline() && !offline_reported {
                        self.report_fault(device, e);
                    }
                }
            }
        }
    }

    fn report_fault(&self, device: &DeviceConfig, error: &ApiError) {
        match error {
            ApiError::Offline { .. } => {
                warn!(
                    device = %device.name,
                    address = %device.address,
                    error = %error,
                    "device offline"
                );
                if device.critical {
                    if let Some(ref alert) = self.on_offline {
                        alert(device, error);
                    }
                }
            }
            ApiError::Status { .. } | ApiError::Transport { .. } => {
                warn!(
                    device = %device.name,
                    address = %device.address,
                    error = %error,
                    "HTTP request failed"
                );
            }
            ApiError::Request { .. } => {
                warn!(
                    device = %device.name,
                    address = %device.address,
                    error = %error,
                    "unexpected error"
                );
            }
        }
    }
}
