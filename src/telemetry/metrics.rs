//! Counters published through the `metrics` facade.
//!
//! Without an installed recorder these calls are no-ops, so the hot path
//! pays only for a relaxed atomic load.

use crate::transport::MessageType;

pub const MESSAGES_SENT: &str = "radbench_messages_sent_total";
pub const SEND_FAILURES: &str = "radbench_send_failures_total";
pub const DETAILS_DROPPED: &str = "radbench_details_dropped_total";
pub const ITERATIONS: &str = "radbench_iterations_total";
pub const KERNEL_TIME: &str = "radbench_kernel_time_seconds";

/// Register metric descriptions with the installed recorder.
pub fn init_metrics() {
    metrics::describe_counter!(MESSAGES_SENT, "Telemetry frames handed to the transport");
    metrics::describe_counter!(SEND_FAILURES, "Telemetry frames the transport rejected");
    metrics::describe_counter!(DETAILS_DROPPED, "Detail messages dropped by the per-iteration cap");
    metrics::describe_counter!(ITERATIONS, "Completed benchmark iterations");
    metrics::describe_gauge!(KERNEL_TIME, "Wall time of the last iteration");
}

pub fn record_message_sent(message_type: MessageType) {
    metrics::counter!(MESSAGES_SENT, "type" => message_type.as_str()).increment(1);
}

pub fn record_send_failure(message_type: MessageType) {
    metrics::counter!(SEND_FAILURES, "type" => message_type.as_str()).increment(1);
}

pub fn record_detail_dropped(kind: &'static str) {
    metrics::counter!(DETAILS_DROPPED, "kind" => kind).increment(1);
}

pub fn record_iteration(kernel_time: f64) {
    metrics::counter!(ITERATIONS).increment(1);
    metrics::gauge!(KERNEL_TIME).set(kernel_time);
}
