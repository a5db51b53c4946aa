//! Station arena
//!
//! Stations shared by several routes are stored once here; routes refer to
//! them by [`StationId`], so slot occupancy changes made on behalf of one
//! route are visible to every other route using the same station.

use crate::factory::Station;
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{SlotRef, StationId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Owning collection of stations with name lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationRegistry {
    stations: Vec<Station>,
    name_index: HashMap<String, StationId>,
}

impl StationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a station, assigning it the next id
    ///
    /// The station's own `id` field is overwritten. Adding a name twice
    /// returns the existing id and drops the new station.
    pub fn add(&mut self, mut station: Station) -> StationId {
        if let Some(&existing) = self.name_index.get(&station.name) {
            return existing;
        }
        let id = StationId(self.stations.len());
        station.id = id;
        self.name_index.insert(station.name.clone(), id);
        self.stations.push(station);
        id
    }

    /// Get a station by id
    pub fn get(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id.index())
    }

    /// Get a mutable station by id
    pub fn get_mut(&mut self, id: StationId) -> Option<&mut Station> {
        self.stations.get_mut(id.index())
    }

    /// Get a station by id or fail
    pub fn station(&self, id: StationId) -> SimulationResult<&Station> {
        self.get(id).ok_or_else(|| SimulationError::UnknownStation(id.to_string()))
    }

    /// Get a mutable station by id or fail
    pub fn station_mut(&mut self, id: StationId) -> SimulationResult<&mut Station> {
        self.stations
            .get_mut(id.index())
            .ok_or_else(|| SimulationError::UnknownStation(id.to_string()))
    }

    /// Look up a station id by name
    pub fn id_of(&self, name: &str) -> Option<StationId> {
        self.name_index.get(name).copied()
    }

    /// Look up a station by name
    pub fn by_name(&self, name: &str) -> Option<&Station> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    /// Iterate stations in id order
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Every slot of every station, in station then slot order
    pub fn slot_refs(&self) -> Vec<SlotRef> {
        self.stations
            .iter()
            .flat_map(|station| (0..station.slot_count()).map(move |slot| SlotRef::new(station.id, slot)))
            .collect()
    }

    /// Number of stations
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the registry holds no stations
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
