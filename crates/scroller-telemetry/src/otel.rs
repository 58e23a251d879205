//! OTel internals: tracing layer and sampling.

use opentelemetry::trace::{
    Link, SamplingDecision, SamplingResult, SpanKind, TraceContextExt, TraceId, TraceState,
    TracerProvider as _,
};
use opentelemetry::{Context, KeyValue, global};
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{Sampler, SdkTracer, SdkTracerProvider, ShouldSample, SpanLimits};
use tracing_opentelemetry::OpenTelemetryLayer;

use crate::TelemetryError;

/// Shuts down the tracer provider on drop, flushing pending spans. Also keeps
/// the runtime entered when one had to be created for the gRPC exporter.
pub struct OtelGuard {
    provider: SdkTracerProvider,
    // Enter guard must drop before the runtime it refers to.
    _runtime_enter: Option<tokio::runtime::EnterGuard<'static>>,
    _runtime: Option<&'static tokio::runtime::Runtime>,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Err(e) = self.provider.shutdown() {
            eprintln!("OTel shutdown error: {e}");
        }
    }
}

/// Build an OpenTelemetry tracing layer and its guard.
///
/// The layer plugs into `tracing_subscriber::registry()`. Hosts without a
/// tokio runtime at startup get a dedicated one, leaked for the life of the
/// process.
pub fn otel_layer<S>(
    service_name: &str,
) -> Result<(OpenTelemetryLayer<S, SdkTracer>, OtelGuard), TelemetryError>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    let (exporter, runtime, enter) = match tokio::runtime::Handle::try_current() {
        Ok(_) => (build_exporter()?, None, None),
        Err(_) => {
            let rt: &'static tokio::runtime::Runtime =
                Box::leak(Box::new(tokio::runtime::Runtime::new()?));
            let guard = rt.enter();
            let exporter = rt.block_on(async { build_exporter() })?;
            (exporter, Some(rt), Some(guard))
        }
    };

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(ScrollerSampler)
        .with_resource(resource)
        .with_span_limits(SpanLimits::default())
        .build();

    global::set_tracer_provider(provider.clone());

    let tracer = provider.tracer("scroller");
    let layer = tracing_opentelemetry::layer().with_tracer(tracer);

    Ok((
        layer,
        OtelGuard {
            provider,
            _runtime_enter: enter,
            _runtime: runtime,
        },
    ))
}

fn build_exporter() -> Result<SpanExporter, TelemetryError> {
    SpanExporter::builder()
        .with_tonic()
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))
}

// ============================================================================
// ScrollerSampler: differentiated sampling by span category
// ============================================================================

/// Sampling rate by span name prefix.
///
/// | Prefix       | Rate | Notes                                  |
/// |--------------|------|----------------------------------------|
/// | `capture.*`  | 100% | One per committed snapshot             |
/// | `edit.*`     |  1%  | One per keystroke batch                |
/// | other        | 10%  |                                        |
fn sampling_rate(name: &str) -> f64 {
    if name.starts_with("capture") {
        1.0
    } else if name.starts_with("edit") {
        0.01
    } else {
        0.1
    }
}

/// Samples by [`sampling_rate`], keeping every child of a sampled parent and
/// every span marked as an error.
#[derive(Debug, Clone)]
struct ScrollerSampler;

impl ShouldSample for ScrollerSampler {
    fn should_sample(
        &self,
        parent_context: Option<&Context>,
        trace_id: TraceId,
        name: &str,
        span_kind: &SpanKind,
        attributes: &[KeyValue],
        links: &[Link],
    ) -> SamplingResult {
        if let Some(cx) = parent_context {
            let parent_span = cx.span();
            let parent_ctx = parent_span.span_context();
            if parent_ctx.is_sampled() {
                return SamplingResult {
                    decision: SamplingDecision::RecordAndSample,
                    attributes: vec![],
                    trace_state: parent_ctx.trace_state().clone(),
                };
            }
        }

        let is_error = attributes.iter().any(|kv| {
            (kv.key.as_str() == "otel.status_code" && kv.value.as_str() == "ERROR")
                || (kv.key.as_str() == "error" && kv.value.as_str() == "true")
        });
        if is_error {
            return SamplingResult {
                decision: SamplingDecision::RecordAndSample,
                attributes: vec![],
                trace_state: TraceState::default(),
            };
        }

        Sampler::TraceIdRatioBased(sampling_rate(name)).should_sample(
            parent_context,
            trace_id,
            name,
            span_kind,
            attributes,
            links,
        )
    }
}
