//! Remediation workflow: bring one device to its configured stream.
//!
//! The sequence is strictly ordered: authenticate, stop the stream, push
//! the configuration, start the stream. The first failure ends it.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use streamwatch_core::DeviceConfig;
use streamwatch_device::{ApiError, ApiFuture, DeviceApi, StepOutcome};

/// Result of one remediation attempt.
pub type RemediationOutcome = Result<(), RemediationFailure>;

/// A step of the remediation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Authenticate,
    StopStream,
    UpdateConfiguration,
    StartStream,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Authenticate => "authenticate",
            Step::StopStream => "stop stream",
            Step::UpdateConfiguration => "update configuration",
            Step::StartStream => "start stream",
        })
    }
}

/// Why remediation did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemediationFailure {
    #[error("username is missing")]
    MissingUsername,

    #[error("password is missing")]
    MissingPassword,

    #[error("address is missing")]
    MissingAddress,

    /// The device answered a step with something other than 204.
    #[error("{step} was not acknowledged (HTTP {status})")]
    Rejected { step: Step, status: u16 },

    #[error("{step} failed: {error}")]
    Failed { step: Step, error: ApiError },
}

impl RemediationFailure {
    /// The step that failed, if any step ran.
    pub fn step(&self) -> Option<Step> {
        match self {
            RemediationFailure::Rejected { step, .. } | RemediationFailure::Failed { step, .. } => {
                Some(*step)
            }
            _ => None,
        }
    }

    /// The transport error behind the failure, if there was one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            RemediationFailure::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Runs the four-step remediation sequence against a device.
pub struct RemediationWorkflow {
    api: Arc<dyn DeviceApi>,
}

impl RemediationWorkflow {
    pub fn new(api: Arc<dyn DeviceApi>) -> Self {
        Self { api }
    }

    /// Apply the device's configured stream settings.
    ///
    /// Missing credentials or address fail immediately without any
    /// network call. Never panics on device errors; every failure comes
    /// back as a [`RemediationFailure`].
    pub async fn apply(
        &self,
        device: &DeviceConfig,
        username: Option<&str>,
        password: Option<&str>,
    ) -> RemediationOutcome {
        let name = device.name.as_str();

        let Some(username) = username.filter(|u| !u.is_empty()) else {
            error!(device = %name, "username cannot be empty");
            return Err(RemediationFailure::MissingUsername);
        };
        let Some(password) = password.filter(|p| !p.is_empty()) else {
            error!(device = %name, "password cannot be empty");
            return Err(RemediationFailure::MissingPassword);
        };
        let address = device.address.as_str();
        if address.is_empty() {
            error!(device = %name, "address cannot be empty");
            return Err(RemediationFailure::MissingAddress);
        }

        if let Err(e) = self.api.authenticate(address, username, password).await {
            error!(device = %name, %address, error = %e, "authentication failed");
            return Err(RemediationFailure::Failed {
                step: Step::Authenticate,
                error: e,
            });
        }

        self.step(device, Step::StopStream, self.api.stop_stream(address))
            .await?;
        self.step(
            device,
            Step::UpdateConfiguration,
            self.api.update_configuration(address, device),
        )
        .await?;
        self.step(device, Step::StartStream, self.api.start_stream(address))
            .await?;

        debug!(device = %name, "remediation sequence complete");
        Ok(())
    }

    async fn step(
        &self,
        device: &DeviceConfig,
        step: Step,
        call: ApiFuture<'_, StepOutcome>,
    ) -> RemediationOutcome {
        match call.await {
            Ok(StepOutcome::Acknowledged) => Ok(()),
            Ok(StepOutcome::Rejected { status }) => {
                warn!(device = %device.name, %step, status, "device did not acknowledge step");
                Err(RemediationFailure::Rejected { step, status })
            }
            Err(e) => {
                error!(device = %device.name, %step, error = %e, "step failed");
                Err(RemediationFailure::Failed { step, error: e })
            }
        }
    }
}
