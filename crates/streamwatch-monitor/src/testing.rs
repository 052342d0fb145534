//! Recording test doubles for the device and metrics capabilities.

use std::collections::HashMap;
use std::sync::Mutex;

use streamwatch_core::{DeviceConfig, DeviceState};
use streamwatch_device::{ApiFuture, ApiResult, DeviceApi, StepOutcome};
use streamwatch_metrics::MetricsSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchState(String),
    Authenticate(String, String, String),
    StopStream(String),
    /// Address and pushed video bitrate.
    UpdateConfiguration(String, u32),
    StartStream(String),
}

/// Scripted responses for one device address.
#[derive(Debug, Clone)]
pub struct Script {
    pub state: ApiResult<Option<DeviceState>>,
    pub auth: ApiResult<()>,
    pub stop: ApiResult<StepOutcome>,
    pub update: ApiResult<StepOutcome>,
    pub start: ApiResult<StepOutcome>,
    pub panic_on_fetch: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            state: Ok(None),
            auth: Ok(()),
            stop: Ok(StepOutcome::Acknowledged),
            update: Ok(StepOutcome::Acknowledged),
            start: Ok(StepOutcome::Acknowledged),
            panic_on_fetch: false,
        }
    }
}

impl Script {
    pub fn reporting(state: DeviceState) -> Self {
        Self {
            state: Ok(Some(state)),
            ..Self::default()
        }
    }
}

/// Device API double: answers from per-address scripts and records calls.
#[derive(Default)]
pub struct RecordingApi {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, script: Script) -> Self {
        self.scripts.insert(address.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn script(&self, address: &str) -> Script {
        self.scripts.get(address).cloned().unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl DeviceApi for RecordingApi {
    fn fetch_state<'a>(&'a self, address: &'a str) -> ApiFuture<'a, Option<DeviceState>> {
        self.record(Call::FetchState(address.to_string()));
        let script = self.script(address);
        Box::pin(async move {
            if script.panic_on_fetch {
                panic!("device driver bug");
            }
            script.state
        })
    }

    fn authenticate<'a>(
        &'a self,
        address: &'a str,
        username: &'a str,
        password: &'a str,
    ) -> ApiFuture<'a, ()> {
        self.record(Call::Authenticate(
            address.to_string(),
            username.to_string(),
            password.to_string(),
        ));
        let result = self.script(address).auth;
        Box::pin(async move { result })
    }

    fn stop_stream<'a>(&'a self, address: &'a str) -> ApiFuture<'a, StepOutcome> {
        self.record(Call::StopStream(address.to_string()));
        let result = self.script(address).stop;
        Box::pin(async move { result })
    }

    fn update_configuration<'a>(
        &'a self,
        address: &'a str,
        device: &'a DeviceConfig,
    ) -> ApiFuture<'a, StepOutcome> {
        self.record(Call::UpdateConfiguration(
            address.to_string(),
            device.video_bitrate,
        ));
        let result = self.script(address).update;
        Box::pin(async move { result })
    }

    fn start_stream<'a>(&'a self, address: &'a str) -> ApiFuture<'a, StepOutcome> {
        self.record(Call::StartStream(address.to_string()));
        let result = self.script(address).start;
        Box::pin(async move { result })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Report(String, DeviceState),
    Status(String, String, bool),
}

/// Metrics double that records every update.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn reports_for(&self, device: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Report(name, _) if name == device))
            .count()
    }

    pub fn statuses_for(&self, device: &str, online: bool) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Status(name, _, o) if name == device && *o == online))
            .count()
    }
}

impl MetricsSink for RecordingSink {
    fn report_metrics(&self, device: &str, state: &DeviceState) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Report(device.to_string(), state.clone()));
    }

    fn set_status(&self, device: &str, address: &str, online: bool) {
        self.events.lock().unwrap().push(SinkEvent::Status(
            device.to_string(),
            address.to_string(),
            online,
        ));
    }
}
