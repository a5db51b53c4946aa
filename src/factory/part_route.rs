//! Part types and their routes
//!
//! A [`PartRoute`] is one product: its arrival generator, the ordered list of
//! stations its parts visit, and throughput counters. Parts are ephemeral; a
//! route only counts them once they leave the last station.

use crate::factory::StationRegistry;
use crate::sampling::{DistributionSpec, Sampler};
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{PartId, RouteId, StationId, TimerState};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// One part instance travelling along its route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Route and arrival serial
    pub id: PartId,
    /// Index of the part's current station within its route
    pub step: usize,
}

impl Part {
    /// Create a part at the given route step
    pub fn new(id: PartId, step: usize) -> Self {
        Self { id, step }
    }

    /// Route this part belongs to
    pub fn route(&self) -> RouteId {
        self.id.route
    }
}

/// A part type with its ordered station sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartRoute {
    /// Route index
    pub id: RouteId,
    /// Part type name
    pub name: String,
    /// Interarrival distribution
    pub arrival: DistributionSpec,
    stations: Vec<StationId>,
    next_arrival: TimerState,
    arrivals_count: u64,
    completions_count: u64,
    dropped_count: u64,
}

impl PartRoute {
    /// Create a route over `stations`
    pub fn new(
        id: RouteId,
        name: impl Into<String>,
        arrival: DistributionSpec,
        stations: Vec<StationId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            arrival,
            stations,
            next_arrival: TimerState::Idle,
            arrivals_count: 0,
            completions_count: 0,
            dropped_count: 0,
        }
    }

    /// Stations in visiting order
    pub fn stations(&self) -> &[StationId] {
        &self.stations
    }

    /// First station of the route
    pub fn first_station(&self) -> Option<StationId> {
        self.stations.first().copied()
    }

    /// Next scheduled arrival
    pub fn next_arrival(&self) -> TimerState {
        self.next_arrival
    }

    /// Next scheduled arrival time, if any
    pub fn next_arrival_time(&self) -> Option<f64> {
        self.next_arrival.scheduled_time()
    }

    /// Parts admitted into the first station
    pub fn arrivals_count(&self) -> u64 {
        self.arrivals_count
    }

    /// Parts that left the last station
    pub fn completions_count(&self) -> u64 {
        self.completions_count
    }

    /// Arrivals lost to a full first buffer
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    /// Reject an interarrival distribution that can only yield zero
    ///
    /// Such a route would schedule every arrival at the clock it fired at and
    /// the calendar would never advance.
    pub fn check_arrival(&self) -> SimulationResult<()> {
        if self.arrival.resolve().is_ok_and(|distribution| distribution.is_always_zero()) {
            return Err(SimulationError::configuration_error(format!(
                "part type {}: interarrival time {} is always zero",
                self.name, self.arrival
            )));
        }
        Ok(())
    }

    /// Sample the next interarrival time and schedule it from `clock`
    pub fn schedule_arrival<S: Sampler + ?Sized>(
        &mut self,
        clock: f64,
        sampler: &mut S,
    ) -> SimulationResult<()> {
        let interarrival = sampler.sample(&self.arrival)?;
        self.next_arrival = TimerState::Scheduled(clock + interarrival);
        trace!(route = %self.name, next = clock + interarrival, "arrival scheduled");
        Ok(())
    }

    /// Admit a new part at the first station and schedule the next arrival
    ///
    /// An arrival that finds the first station unable to take it is lost and
    /// only counted as dropped. Returns whether the part was admitted.
    pub fn admit_arrival<S: Sampler + ?Sized>(
        &mut self,
        clock: f64,
        stations: &mut StationRegistry,
        sampler: &mut S,
    ) -> SimulationResult<bool> {
        let admitted = match self.first_station() {
            Some(first) => {
                let station = stations.station_mut(first)?;
                let part = Part::new(PartId { route: self.id, serial: self.arrivals_count }, 0);
                if station.can_accept() && station.accept(part) {
                    self.arrivals_count += 1;
                    true
                } else {
                    self.dropped_count += 1;
                    debug!(route = %self.name, station = %station.name, clock, "arrival dropped");
                    false
                }
            }
            None => false,
        };

        self.schedule_arrival(clock, sampler)?;
        Ok(admitted)
    }

    /// Move a finished part out of `station`'s `slot` if the route allows it
    ///
    /// Returns `true` when the slot was emptied, either because the part
    /// completed its route or because it moved into the next station. When
    /// the next station cannot take the part, the slot timer is set idle and
    /// the part stays put.
    pub fn advance_part(
        &mut self,
        station: StationId,
        slot: usize,
        stations: &mut StationRegistry,
    ) -> SimulationResult<bool> {
        let occupant = stations.station(station)?.occupant(slot).copied();

        let part = match occupant {
            Some(part) if part.route() == self.id && self.stations.get(part.step) == Some(&station) => part,
            other => {
                warn!(
                    route = %self.name,
                    station = %station,
                    slot,
                    occupant = ?other.map(|p| p.id),
                    "slot occupant does not belong to this route step; neutralizing timer"
                );
                stations.station_mut(station)?.set_timer(slot, TimerState::Idle)?;
                return Ok(false);
            }
        };

        let next_step = part.step + 1;
        let Some(&next_station) = self.stations.get(next_step) else {
            stations.station_mut(station)?.take_part(slot)?;
            self.completions_count += 1;
            trace!(route = %self.name, part = %part.id, "part completed");
            return Ok(true);
        };

        if !stations.station(next_station)?.can_accept() {
            stations.station_mut(station)?.set_timer(slot, TimerState::Idle)?;
            return Ok(false);
        }

        if let Some(mut moved) = stations.station_mut(station)?.take_part(slot)? {
            moved.step = next_step;
            stations.station_mut(next_station)?.accept(moved);
        }
        Ok(true)
    }

    /// Parts of this route currently held anywhere in the factory
    pub fn work_in_process(&self, stations: &StationRegistry) -> u64 {
        stations
            .iter()
            .flat_map(|station| station.resident_parts())
            .filter(|part| part.route() == self.id)
            .count() as u64
    }
}
