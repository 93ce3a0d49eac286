//! Prometheus metrics for the processing pipeline.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

use crate::pipeline::PipelineMode;

/// Register metric descriptions with the installed recorder.
pub fn describe() {
    describe_counter!(
        "process_requests_total",
        "Accepted /process requests by pipeline mode"
    );
    describe_counter!(
        "process_errors_total",
        "Failed /process requests by error kind"
    );
    describe_histogram!(
        "process_duration_seconds",
        Unit::Seconds,
        "Time spent running the /process pipeline"
    );
}

pub fn record_request(mode: PipelineMode) {
    counter!("process_requests_total", "mode" => mode.as_str()).increment(1);
}

pub fn record_error(kind: &'static str) {
    counter!("process_errors_total", "kind" => kind).increment(1);
}

pub fn record_duration(mode: PipelineMode, elapsed: Duration) {
    histogram!("process_duration_seconds", "mode" => mode.as_str()).record(elapsed.as_secs_f64());
}
