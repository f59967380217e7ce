//! Metrics sink boundary.
//!
//! Engine logic records [`MetricsEvent`]s through [`record`]; only the
//! global sink writes into `obs::metrics`.

use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    FilterChanged { entity: String, material: bool },
    InputIgnored { entity: String, count: u64 },
    SortChanged { entity: String },
    Reload { entity: String, total: u64, rows: u64 },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink writing into the thread-local counters.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::FilterChanged { entity, material } => {
                metrics::with_state_mut(|m| {
                    m.ops.filter_changes = m.ops.filter_changes.saturating_add(1);
                    let entry = m.entities.entry(entity).or_default();
                    entry.filter_changes = entry.filter_changes.saturating_add(1);

                    if material {
                        m.ops.material_filter_changes =
                            m.ops.material_filter_changes.saturating_add(1);
                        entry.material_filter_changes =
                            entry.material_filter_changes.saturating_add(1);
                    }
                });
            }

            MetricsEvent::InputIgnored { entity, count } => {
                metrics::with_state_mut(|m| {
                    m.ops.inputs_ignored = m.ops.inputs_ignored.saturating_add(count);
                    let entry = m.entities.entry(entity).or_default();
                    entry.inputs_ignored = entry.inputs_ignored.saturating_add(count);
                });
            }

            MetricsEvent::SortChanged { entity } => {
                metrics::with_state_mut(|m| {
                    m.ops.sort_changes = m.ops.sort_changes.saturating_add(1);
                    let entry = m.entities.entry(entity).or_default();
                    entry.sort_changes = entry.sort_changes.saturating_add(1);
                });
            }

            MetricsEvent::Reload {
                entity,
                total,
                rows,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.reloads = m.ops.reloads.saturating_add(1);
                    m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows);
                    let entry = m.entities.entry(entity).or_default();
                    entry.reloads = entry.reloads.saturating_add(1);
                    entry.rows_loaded = entry.rows_loaded.saturating_add(rows);
                    entry.last_total = total;
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override. The previous sink
/// is restored on every exit, including unwinding.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
