//! Observability: interaction counters and the sink they flow through.
//!
//! Engine code never touches the counters directly; it records
//! [`MetricsEvent`]s and the active [`MetricsSink`] decides what to do.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EntitySummary, EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
