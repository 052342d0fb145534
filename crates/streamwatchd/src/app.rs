//! Daemon wiring: config → subsystems → background loop + exporter.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info};

use streamwatch_core::{DeviceConfig, MonitorConfig};
use streamwatch_device::{ApiError, HttpDeviceClient};
use streamwatch_metrics::MetricsRegistry;
use streamwatch_monitor::{AlertCallback, MonitorLoop};

use crate::server::build_router;

/// Run the monitor and the exporter until Ctrl-C.
///
/// `listen` overrides `metrics.listen` from the config.
pub async fn run(config: MonitorConfig, listen: Option<String>) -> anyhow::Result<()> {
    info!(devices = config.devices.len(), "streamwatch daemon starting");

    let interval = config.monitor.cycle_interval()?;
    let timeout = config.monitor.call_timeout()?;
    let listen = listen.unwrap_or_else(|| config.metrics.listen.clone());
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid listen address '{listen}'"))?;

    // ── Subsystems ─────────────────────────────────────────────

    let registry = Arc::new(MetricsRegistry::new());
    let client = Arc::new(HttpDeviceClient::new(timeout));
    info!(timeout_ms = timeout.as_millis() as u64, "device client initialized");

    let monitor = MonitorLoop::new(config.devices, client, registry.clone())?
        .with_interval(interval)
        .with_alert(log_alert());

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor_handle = tokio::spawn(async move {
        monitor.run(shutdown_rx).await;
    });

    // ── Exporter ───────────────────────────────────────────────

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {addr}"))?;
    info!(%addr, "metrics exporter listening");

    let server = axum::serve(listener, build_router(registry)).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;
    let _ = monitor_handle.await;

    info!("streamwatch daemon stopped");
    Ok(())
}

/// Critical-device alerts are logged; delivery is left to log shipping.
fn log_alert() -> AlertCallback {
    Arc::new(|device: &DeviceConfig, err: &ApiError| {
        error!(
            device = %device.name,
            address = %device.address,
            error = %err,
            "critical device offline"
        );
    })
}

/// One line per device for `streamwatchd check`.
pub fn summarize(config: &MonitorConfig) -> Vec<String> {
    config
        .devices
        .iter()
        .map(|d| {
            let mut flags = Vec::new();
            if d.critical {
                flags.push("critical");
            }
            if !d.is_addressable() {
                flags.push("skipped: missing name or address");
            }
            if d.username.as_deref().unwrap_or("").is_empty()
                || d.password.as_deref().unwrap_or("").is_empty()
            {
                flags.push("no credentials: remediation will fail");
            }
            let name = if d.name.is_empty() { "<unnamed>" } else { d.name.as_str() };
            let address = if d.address.is_empty() { "<none>" } else { d.address.as_str() };
            if flags.is_empty() {
                format!("{name} @ {address}")
            } else {
                format!("{name} @ {address} ({})", flags.join(", "))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_flags_problem_devices() {
        let mut critical = DeviceConfig::new("studio-a", "10.0.0.1").with_credentials("admin", "pw");
        critical.critical = true;
        let config = MonitorConfig::with_devices(vec![
            critical,
            DeviceConfig::new("", "10.0.0.2").with_credentials("admin", "pw"),
            DeviceConfig::new("studio-c", "10.0.0.3"),
        ]);

        let lines = summarize(&config);
        assert_eq!(lines[0], "studio-a @ 10.0.0.1 (critical)");
        assert_eq!(
            lines[1],
            "<unnamed> @ 10.0.0.2 (skipped: missing name or address)"
        );
        assert_eq!(
            lines[2],
            "studio-c @ 10.0.0.3 (no credentials: remediation will fail)"
        );
    }

    #[tokio::test]
    async fn run_rejects_bad_listen_address() {
        let config = MonitorConfig::with_devices(vec![DeviceConfig::new("studio-a", "10.0.0.1")]);
        let err = run(config, Some("not-an-address".to_string()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid listen address"));
    }
}
