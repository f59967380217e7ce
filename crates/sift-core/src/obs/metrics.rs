use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for form interactions.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Filter machines
    pub filter_changes: u64,
    pub material_filter_changes: u64,
    pub inputs_ignored: u64,

    // Ordering
    pub sort_changes: u64,

    // Store round trips
    pub reloads: u64,
    pub rows_loaded: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub filter_changes: u64,
    pub material_filter_changes: u64,
    pub inputs_ignored: u64,
    pub sort_changes: u64,
    pub reloads: u64,
    pub rows_loaded: u64,
    pub last_total: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: EventState,
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub reloads: u64,
    pub rows_loaded: u64,
    pub avg_rows_per_reload: f64,
    pub filter_changes: u64,
    pub inputs_ignored: u64,
    pub sort_changes: u64,
    pub last_total: u64,
}

/// Snapshot counters and derive per-entity summaries, busiest first.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let mut entity_counters: Vec<EntitySummary> = snap
        .entities
        .iter()
        .map(|(entity, c)| EntitySummary {
            entity: entity.clone(),
            reloads: c.reloads,
            rows_loaded: c.rows_loaded,
            avg_rows_per_reload: if c.reloads > 0 {
                c.rows_loaded as f64 / c.reloads as f64
            } else {
                0.0
            },
            filter_changes: c.filter_changes,
            inputs_ignored: c.inputs_ignored,
            sort_changes: c.sort_changes,
            last_total: c.last_total,
        })
        .collect();
    entity_counters.sort_by(|a, b| b.reloads.cmp(&a.reloads).then_with(|| a.entity.cmp(&b.entity)));

    EventReport {
        counters: snap,
        entity_counters,
    }
}
