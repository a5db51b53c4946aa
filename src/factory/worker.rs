//! Skilled workers and the worker pool
//!
//! Each worker is either idle or bound to exactly one slot. The pool keeps an
//! assignment map alongside the per-worker binding so slot occupancy can be
//! queried without scanning the whole roster.

use crate::factory::Station;
use crate::types::{SlotRef, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// A worker able to service stations whose names appear in its skill set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// Roster index
    pub id: WorkerId,
    /// Display name
    pub name: String,
    /// Station names this worker can service
    pub skills: BTreeSet<String>,
    assignment: Option<SlotRef>,
}

impl Worker {
    /// Create an idle worker
    pub fn new<I, T>(id: WorkerId, name: impl Into<String>, skills: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            skills: skills.into_iter().map(Into::into).collect(),
            assignment: None,
        }
    }

    /// Whether this worker has the skill for `station`
    pub fn can_service(&self, station: &Station) -> bool {
        self.skills.contains(&station.name)
    }

    /// Slot this worker is bound to
    pub fn assignment(&self) -> Option<SlotRef> {
        self.assignment
    }

    /// Whether the worker is free
    pub fn is_idle(&self) -> bool {
        self.assignment.is_none()
    }
}

/// Roster of all workers with their current bindings
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    workers: Vec<Worker>,
    assignment_map: BTreeMap<WorkerId, SlotRef>,
}

impl WorkerPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worker to the roster, assigning it the next id
    pub fn add(&mut self, mut worker: Worker) -> WorkerId {
        let id = WorkerId(self.workers.len());
        worker.id = id;
        worker.assignment = None;
        self.workers.push(worker);
        id
    }

    /// Get a worker by id
    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.get(id.index())
    }

    /// Iterate workers in roster order
    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter()
    }

    /// Number of workers on the roster
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether the roster is empty
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Current worker to slot bindings
    pub fn assignment_map(&self) -> &BTreeMap<WorkerId, SlotRef> {
        &self.assignment_map
    }

    /// Bind an idle worker to `slot`
    ///
    /// Returns `false` if the worker is unknown or already bound.
    pub fn bind(&mut self, id: WorkerId, slot: SlotRef) -> bool {
        match self.workers.get_mut(id.index()) {
            Some(worker) if worker.assignment.is_none() => {
                worker.assignment = Some(slot);
                self.assignment_map.insert(id, slot);
                trace!(worker = %worker.name, slot = %slot, "bind");
                true
            }
            _ => false,
        }
    }

    /// Release every worker bound to `slot`
    pub fn release(&mut self, slot: SlotRef) -> Vec<WorkerId> {
        let released: Vec<WorkerId> = self
            .assignment_map
            .iter()
            .filter(|(_, bound)| **bound == slot)
            .map(|(id, _)| *id)
            .collect();

        for id in &released {
            self.assignment_map.remove(id);
            if let Some(worker) = self.workers.get_mut(id.index()) {
                worker.assignment = None;
            }
        }
        if !released.is_empty() {
            trace!(slot = %slot, count = released.len(), "release");
        }
        released
    }

    /// Number of workers bound to `slot`
    pub fn workers_on(&self, slot: SlotRef) -> usize {
        self.assignment_map.values().filter(|bound| **bound == slot).count()
    }

    /// First idle worker in roster order able to service `station`
    pub fn find_idle_for(&self, station: &Station) -> Option<WorkerId> {
        self.workers
            .iter()
            .find(|worker| worker.is_idle() && worker.can_service(station))
            .map(|worker| worker.id)
    }

    /// Number of unbound workers
    pub fn idle_count(&self) -> usize {
        self.workers.len() - self.assignment_map.len()
    }
}
