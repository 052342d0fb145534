//! streamwatch-device — remote control of streaming encoders.
//!
//! Exposes the five device operations as the [`DeviceApi`] capability
//! trait and implements it over plain HTTP with [`HttpDeviceClient`].
//!
//! # Wire protocol
//!
//! | Operation | Request | Success |
//! |---|---|---|
//! | fetch state | `GET /control/api/v1/livestreams/0` | 2xx + `{status, bitrate, bufferPct}` |
//! | authenticate | `POST /user/login` `{username, password}` | 2xx |
//! | stop stream | `PUT /control/api/v1/livestreams/0/stop` | exactly 204 |
//! | push config | `PUT /control/api/v1/livestreams/customPlatforms/Custom.json` | exactly 204 |
//! | start stream | `PUT /control/api/v1/livestreams/0/start` | exactly 204 |
//!
//! Every call is bounded by the client's request timeout. Connection
//! failures and timeouts surface as [`ApiError::Offline`].

pub mod api;
pub mod client;
pub mod error;

pub use api::{ApiFuture, DeviceApi, StepOutcome};
pub use client::HttpDeviceClient;
pub use error::{ApiError, ApiResult};
