//! Tracing setup for hosts embedding scroller.
//!
//! [`init_tracing`] installs the usual subscriber stack: an `EnvFilter`
//! (`RUST_LOG`, default `info`) and a stderr fmt layer. With the `telemetry`
//! feature, an OpenTelemetry layer is added when the standard OTel
//! environment variables ask for export:
//!
//! ```bash
//! OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 my-host
//! ```
//!
//! Set `OTEL_SDK_DISABLED=true` to disable export even when the endpoint is set.

#[cfg(feature = "telemetry")]
mod otel;

#[cfg(feature = "telemetry")]
pub use otel::{OtelGuard, otel_layer};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to start runtime for OTel export: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("failed to build OTLP exporter: {0}")]
    Exporter(String),
}

/// Keeps telemetry alive. Hold it for the life of the process; dropping it
/// flushes pending spans.
#[derive(Default)]
#[must_use = "dropping the guard shuts down span export"]
pub struct TelemetryGuard {
    #[cfg(feature = "telemetry")]
    otel: Option<OtelGuard>,
}

impl TelemetryGuard {
    /// Whether spans are being exported over OTLP.
    pub fn exporting(&self) -> bool {
        #[cfg(feature = "telemetry")]
        {
            self.otel.is_some()
        }
        #[cfg(not(feature = "telemetry"))]
        {
            false
        }
    }
}

/// Install the global tracing subscriber for `service_name`.
pub fn init_tracing(service_name: &str) -> Result<TelemetryGuard, TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    #[cfg(feature = "telemetry")]
    if otel_enabled() {
        let (layer, guard) = otel::otel_layer(service_name)?;
        registry.with(layer).try_init()?;
        tracing::debug!(service = service_name, "tracing initialized with OTel export");
        return Ok(TelemetryGuard { otel: Some(guard) });
    }

    registry.try_init()?;
    tracing::debug!(service = service_name, "tracing initialized");
    Ok(TelemetryGuard::default())
}

/// Check whether OTel export should be enabled.
///
/// True when `OTEL_SDK_DISABLED` is not `"true"` and either
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set or `OTEL_TRACES_EXPORTER` is set to
/// something other than `"none"`.
pub fn otel_enabled() -> bool {
    otel_enabled_with(|key| std::env::var(key).ok())
}

fn otel_enabled_with(var: impl Fn(&str) -> Option<String>) -> bool {
    if var("OTEL_SDK_DISABLED").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
        return false;
    }

    if var("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        return true;
    }

    match var("OTEL_TRACES_EXPORTER") {
        Some(exporter) => !exporter.eq_ignore_ascii_case("none"),
        None => false,
    }
}
