//! Error types for device API calls.

use thiserror::Error;

/// Result type alias for device API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Transport-level faults talking to a device.
///
/// Unexpected-but-well-formed step responses are not errors; see
/// [`crate::StepOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection refused, unresolvable host, or no answer in time.
    #[error("device at {address} is offline: {reason}")]
    Offline { address: String, reason: String },

    #[error("{operation} on {address} returned HTTP {status}")]
    Status {
        address: String,
        operation: &'static str,
        status: u16,
    },

    #[error("failed to build request for {address}: {reason}")]
    Request { address: String, reason: String },

    #[error("transport error talking to {address}: {reason}")]
    Transport { address: String, reason: String },
}

impl ApiError {
    /// Whether this is the "device offline" condition.
    pub fn is_offline(&self) -> bool {
        matches!(self, ApiError::Offline { .. })
    }
}
