//! Logging and observability infrastructure for headsong
//!
//! Structured `tracing` events for every pipeline stage and adapter call.
//! Error text is redacted before it is recorded.

use tracing::{Level, debug, error, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::redaction::redact_error_message;
use crate::types::{Service, Stage};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the default filter is
/// `headsong=info,warn`, or `headsong=debug,info` when `verbose` is true.
/// Logs go to stderr so stdout stays clean for `--json` output.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("headsong=debug,info")
            } else {
                EnvFilter::try_new("headsong=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span wrapping one pipeline stage call
pub fn stage_span(stage: Stage) -> tracing::Span {
    span!(Level::INFO, "pipeline_stage", stage = %stage)
}

pub fn log_stage_start(stage: Stage) {
    info!(stage = %stage, "Starting pipeline stage");
}

pub fn log_stage_complete(stage: Stage, next: Stage, duration_ms: u128) {
    info!(
        stage = %stage,
        next = %next,
        duration_ms = %duration_ms,
        "Pipeline stage completed"
    );
}

/// Log a failed stage. The error message is redacted first.
pub fn log_stage_error(stage: Stage, error: &str, duration_ms: u128) {
    let sanitized_error = redact_error_message(error);
    error!(
        stage = %stage,
        duration_ms = %duration_ms,
        error = %sanitized_error,
        "Pipeline stage failed"
    );
}

/// Log a stage call rejected before any network traffic
pub fn log_stage_rejected(stage: Stage, reason: &str) {
    warn!(stage = %stage, reason = %reason, "Pipeline stage rejected");
}

pub fn log_adapter_request(service: Service, method: &str, url: &str) {
    debug!(
        service = service.as_str(),
        method = method,
        url = %redact_error_message(url),
        "Sending upstream request"
    );
}

pub fn log_adapter_response(service: Service, status: u16, duration_ms: u128) {
    debug!(
        service = service.as_str(),
        status = status,
        duration_ms = %duration_ms,
        "Upstream responded"
    );
}
