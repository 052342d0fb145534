//! HTTP implementation of the device API.
//!
//! Uses a pooled hyper-util client. Each call (connect, request, and body
//! read) runs under a single `tokio::time::timeout`, and response bodies
//! are capped at [`MAX_BODY_BYTES`].

use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use tracing::{debug, error, warn};

use streamwatch_core::{DeviceConfig, DeviceState};

use crate::api::{ApiFuture, DeviceApi, StepOutcome};
use crate::error::{ApiError, ApiResult};

const STATE_PATH: &str = "/control/api/v1/livestreams/0";
const LOGIN_PATH: &str = "/user/login";
const STOP_PATH: &str = "/control/api/v1/livestreams/0/stop";
const START_PATH: &str = "/control/api/v1/livestreams/0/start";
const CUSTOM_PLATFORM_PATH: &str = "/control/api/v1/livestreams/customPlatforms/Custom.json";

/// Largest response body accepted from a device.
const MAX_BODY_BYTES: usize = 64 * 1024;

const AGENT: &str = concat!("streamwatch/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Body of the custom streaming platform push.
#[derive(Serialize)]
struct CustomPlatform<'a> {
    server: Option<&'a str>,
    audio_bitrate: u32,
    video_bitrate: u32,
    resolution: Option<&'a str>,
    fps: u32,
    codec: Option<&'a str>,
}

impl<'a> From<&'a DeviceConfig> for CustomPlatform<'a> {
    fn from(device: &'a DeviceConfig) -> Self {
        Self {
            server: device.server.as_deref(),
            audio_bitrate: device.audio_bitrate,
            video_bitrate: device.video_bitrate,
            resolution: device.resolution.as_deref(),
            fps: device.fps,
            codec: device.codec.as_deref(),
        }
    }
}

/// Device API client speaking plain HTTP/1.1.
#[derive(Clone)]
pub struct HttpDeviceClient {
    client: Client<HttpConnector, Full<Bytes>>,
    timeout: Duration,
}

impl HttpDeviceClient {
    /// Create a client whose calls each give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client, timeout }
    }

    async fn get_state(&self, address: &str) -> ApiResult<Option<DeviceState>> {
        let (status, body) = self.send(address, Method::GET, STATE_PATH, None).await?;
        if !status.is_success() {
            error!(%address, %status, "failed to get device state");
            return Ok(None);
        }

        match serde_json::from_slice::<DeviceState>(&body) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                error!(%address, error = %e, "failed to decode device state");
                Ok(None)
            }
        }
    }

    async fn login(&self, address: &str, username: &str, password: &str) -> ApiResult<()> {
        let body = encode(address, &LoginRequest { username, password })?;
        let (status, _) = self
            .send(address, Method::POST, LOGIN_PATH, Some(body))
            .await?;
        if status.is_success() {
            debug!(%address, "authenticated");
            Ok(())
        } else {
            Err(ApiError::Status {
                address: address.to_string(),
                operation: "login",
                status: status.as_u16(),
            })
        }
    }

    async fn control(
        &self,
        address: &str,
        path: &str,
        body: Option<Vec<u8>>,
        step: &'static str,
    ) -> ApiResult<StepOutcome> {
        let (status, _) = self.send(address, Method::PUT, path, body).await?;
        let outcome = StepOutcome::from_status(status);
        if !outcome.is_acknowledged() {
            warn!(%address, %status, step, "unexpected response from device");
        }
        Ok(outcome)
    }

    async fn push_configuration(
        &self,
        address: &str,
        device: &DeviceConfig,
    ) -> ApiResult<StepOutcome> {
        let body = encode(address, &CustomPlatform::from(device))?;
        self.control(address, CUSTOM_PLATFORM_PATH, Some(body), "update configuration")
            .await
    }

    /// Perform one request and read the whole response body.
    async fn send(
        &self,
        address: &str,
        method: Method,
        path: &str,
        json: Option<Vec<u8>>,
    ) -> ApiResult<(StatusCode, Bytes)> {
        let uri = format!("http://{address}{path}");

        let mut builder = Request::builder()
            .method(method)
            .uri(&uri)
            .header(USER_AGENT, AGENT);
        let body = match json {
            Some(bytes) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(bytes))
            }
            None => Full::new(Bytes::new()),
        };
        let req = builder.body(body).map_err(|e| ApiError::Request {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        let exchange = async {
            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| classify(address, &e))?;
            let status = resp.status();
            let body = Limited::new(resp.into_body(), MAX_BODY_BYTES)
                .collect()
                .await
                .map_err(|e| ApiError::Transport {
                    address: address.to_string(),
                    reason: e.to_string(),
                })?
                .to_bytes();
            Ok::<_, ApiError>((status, body))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                debug!(%uri, "device request timed out");
                Err(ApiError::Offline {
                    address: address.to_string(),
                    reason: format!("no response within {:?}", self.timeout),
                })
            }
        }
    }
}

impl DeviceApi for HttpDeviceClient {
    fn fetch_state<'a>(&'a self, address: &'a str) -> ApiFuture<'a, Option<DeviceState>> {
        Box::pin(self.get_state(address))
    }

    fn authenticate<'a>(
        &'a self,
        address: &'a str,
        username: &'a str,
        password: &'a str,
    ) -> ApiFuture<'a, ()> {
        Box::pin(self.login(address, username, password))
    }

    fn stop_stream<'a>(&'a self, address: &'a str) -> ApiFuture<'a, StepOutcome> {
        Box::pin(self.control(address, STOP_PATH, None, "stop stream"))
    }

    fn update_configuration<'a>(
        &'a self,
        address: &'a str,
        device: &'a DeviceConfig,
    ) -> ApiFuture<'a, StepOutcome> {
        Box::pin(self.push_configuration(address, device))
    }

    fn start_stream<'a>(&'a self, address: &'a str) -> ApiFuture<'a, StepOutcome> {
        Box::pin(self.control(address, START_PATH, None, "start stream"))
    }
}

fn encode<T: Serialize>(address: &str, body: &T) -> ApiResult<Vec<u8>> {
    serde_json::to_vec(body).map_err(|e| ApiError::Request {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Connection-level failures mean the device is offline; anything else
/// is a transport fault.
fn classify(address: &str, err: &hyper_util::client::legacy::Error) -> ApiError {
    if err.is_connect() {
        ApiError::Offline {
            address: address.to_string(),
            reason: error_chain(err),
        }
    } else {
        ApiError::Transport {
            address: address.to_string(),
            reason: error_chain(err),
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
