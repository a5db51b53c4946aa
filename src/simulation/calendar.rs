//! Critical-time calendar
//!
//! A snapshot of every schedulable entity's next state change, refreshed
//! after each settle. The engine advances the clock to the earliest
//! scheduled entry; idle and worker-starved entries never drive time.

use crate::factory::{PartRoute, StationRegistry};
use crate::types::{Schedulable, SlotRef, TimerState};
use std::collections::BTreeMap;

/// Next critical time per arrival generator and station slot
#[derive(Debug, Clone, Default)]
pub struct CriticalTimeTable {
    entries: BTreeMap<Schedulable, TimerState>,
}

impl CriticalTimeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table contents with the current route and slot timers
    pub fn snapshot(&mut self, routes: &[PartRoute], stations: &StationRegistry) {
        self.entries.clear();
        for route in routes {
            self.entries.insert(Schedulable::Arrival(route.id), route.next_arrival());
        }
        for station in stations.iter() {
            for (slot, timer) in station.timers().iter().enumerate() {
                self.entries
                    .insert(Schedulable::completion(SlotRef::new(station.id, slot)), *timer);
            }
        }
    }

    /// Earliest scheduled entry
    ///
    /// Ties keep the entry that sorts first, so arrivals fire before
    /// completions at the same instant.
    pub fn next_event(&self) -> Option<(Schedulable, f64)> {
        let mut best: Option<(Schedulable, f64)> = None;
        for (key, timer) in &self.entries {
            if let Some(time) = timer.scheduled_time() {
                match best {
                    Some((_, current)) if current <= time => {}
                    _ => best = Some((*key, time)),
                }
            }
        }
        best
    }

    /// Timer recorded for an entity
    pub fn get(&self, key: &Schedulable) -> Option<TimerState> {
        self.entries.get(key).copied()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&Schedulable, &TimerState)> {
        self.entries.iter()
    }

    /// Number of scheduled entries
    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|timer| timer.is_scheduled()).count()
    }

    /// Number of tracked entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table tracks nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
