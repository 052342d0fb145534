//! The device capability consumed by the monitor.

use std::future::Future;
use std::pin::Pin;

use streamwatch_core::{DeviceConfig, DeviceState};

use crate::error::ApiResult;

/// Boxed future alias for device API results.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// Result of a stream control step that reached the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The device answered 204 No Content.
    Acknowledged,
    /// The device answered with any other status.
    Rejected { status: u16 },
}

impl StepOutcome {
    /// Map an HTTP status to a step outcome. Only 204 counts.
    pub fn from_status(status: http::StatusCode) -> Self {
        if status == http::StatusCode::NO_CONTENT {
            StepOutcome::Acknowledged
        } else {
            StepOutcome::Rejected {
                status: status.as_u16(),
            }
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        matches!(self, StepOutcome::Acknowledged)
    }
}

/// Remote operations against a device identified by network address.
///
/// Each operation is independently fallible. Implementations are injected
/// into the monitor so tests can substitute recording doubles.
pub trait DeviceApi: Send + Sync {
    /// Fetch the live stream state.
    ///
    /// `Ok(None)` means the device answered but produced no usable state.
    fn fetch_state<'a>(&'a self, address: &'a str) -> ApiFuture<'a, Option<DeviceState>>;

    /// Log in. Any error aborts remediation.
    fn authenticate<'a>(
        &'a self,
        address: &'a str,
        username: &'a str,
        password: &'a str,
    ) -> ApiFuture<'a, ()>;

    fn stop_stream<'a>(&'a self, address: &'a str) -> ApiFuture<'a, StepOutcome>;

    /// Push the device's target encoder settings and server endpoint.
    fn update_configuration<'a>(
        &'a self,
        address: &'a str,
        device: &'a DeviceConfig,
    ) -> ApiFuture<'a, StepOutcome>;

    fn start_stream<'a>(&'a self, address: &'a str) -> ApiFuture<'a, StepOutcome>;
}
