//! Discrete-event engine
//!
//! The [`Factory`] owns the station arena, the part routes, the worker pool
//! and the critical-time calendar. Each tick advances the clock to the
//! earliest scheduled entry, fires it, and then settles the shop floor to a
//! fixed point before taking a new calendar snapshot.

use crate::factory::{Allocator, PartRoute, StationRegistry, WorkerPool};
use crate::sampling::{RandomSampler, Sampler};
use crate::simulation::{
    CriticalTimeTable, RouteStatistics, RunReport, SimulationError, SimulationResult,
    StationStatistics,
};
use crate::types::{RouteId, RunId, Schedulable, SlotRef, TerminationReason, TimerState};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

/// Outcome of [`Factory::run`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Identifier of the run
    pub run_id: RunId,
    /// Ticks executed
    pub iterations: u64,
    /// Clock after the last tick
    pub final_clock: f64,
    /// Why the loop stopped
    pub termination: TerminationReason,
}

/// The simulated factory
#[derive(Debug)]
pub struct Factory<S: Sampler = RandomSampler> {
    run_id: RunId,
    stations: StationRegistry,
    routes: Vec<PartRoute>,
    workers: WorkerPool,
    allocator: Allocator,
    calendar: CriticalTimeTable,
    sampler: S,
    clock: f64,
    horizon: f64,
    iteration_count: u64,
    initialized: bool,
    termination: Option<TerminationReason>,
}

impl<S: Sampler> Factory<S> {
    /// Assemble a factory from already resolved parts
    ///
    /// Route ids must match their position in `routes`.
    pub fn new(
        stations: StationRegistry,
        routes: Vec<PartRoute>,
        workers: WorkerPool,
        horizon: f64,
        sampler: S,
        allocator: Allocator,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            stations,
            routes,
            workers,
            allocator,
            calendar: CriticalTimeTable::new(),
            sampler,
            clock: 0.0,
            horizon,
            iteration_count: 0,
            initialized: false,
            termination: None,
        }
    }

    /// Identifier of this run
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Current simulated time
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Configured horizon
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Ticks executed so far
    pub fn iteration_count(&self) -> u64 {
        self.iteration_count
    }

    /// Whether [`Factory::initialize_production`] has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Station arena
    pub fn stations(&self) -> &StationRegistry {
        &self.stations
    }

    /// Part routes in id order
    pub fn routes(&self) -> &[PartRoute] {
        &self.routes
    }

    /// Worker roster
    pub fn workers(&self) -> &WorkerPool {
        &self.workers
    }

    /// Calendar as of the last snapshot
    pub fn calendar(&self) -> &CriticalTimeTable {
        &self.calendar
    }

    /// Seed one arrival per route, settle, and take the first snapshot
    ///
    /// Fails if a route's interarrival distribution can only yield zero.
    /// Calling this more than once has no effect.
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub fn initialize_production(&mut self) -> SimulationResult<()> {
        if self.initialized {
            return Ok(());
        }

        for route in &self.routes {
            route.check_arrival()?;
        }
        for route in &mut self.routes {
            route.admit_arrival(0.0, &mut self.stations, &mut self.sampler)?;
        }
        self.settle()?;
        self.calendar.snapshot(&self.routes, &self.stations);
        self.initialized = true;

        crate::sim_event!(
            info,
            "production initialized",
            stations = self.stations.len(),
            routes = self.routes.len(),
            workers = self.workers.len(),
            horizon = self.horizon,
        );
        Ok(())
    }

    /// Execute one tick and return the new clock
    ///
    /// Returns `None` when no entity has a scheduled event.
    pub fn step(&mut self) -> SimulationResult<Option<f64>> {
        if !self.initialized {
            self.initialize_production()?;
        }

        let Some((event, time)) = self.calendar.next_event() else {
            return Ok(None);
        };
        self.clock = self.clock.max(time);

        if let Schedulable::Arrival(route) = event {
            self.fire_arrival(route)?;
        }
        self.settle()?;
        self.calendar.snapshot(&self.routes, &self.stations);
        self.iteration_count += 1;

        debug!(
            iteration = self.iteration_count,
            clock = self.clock,
            event = %event,
            pending = self.calendar.pending_count(),
            idle_workers = self.workers.idle_count(),
            "tick"
        );
        Ok(Some(self.clock))
    }

    /// Run until the horizon is reached or nothing is left to happen
    #[instrument(skip(self), fields(run_id = %self.run_id, horizon = self.horizon))]
    pub fn run(&mut self) -> SimulationResult<RunSummary> {
        let span = crate::perf_span!("production_run", horizon = self.horizon);
        let _guard = span.enter();

        self.initialize_production()?;
        let termination = loop {
            if self.clock >= self.horizon {
                break TerminationReason::HorizonReached;
            }
            if self.step()?.is_none() {
                break TerminationReason::CalendarExhausted;
            }
        };
        self.termination = Some(termination);

        info!(
            iterations = self.iteration_count,
            clock = self.clock,
            termination = %termination,
            "run finished"
        );
        Ok(RunSummary {
            run_id: self.run_id,
            iterations: self.iteration_count,
            final_clock: self.clock,
            termination,
        })
    }

    /// Build a report from the current state
    pub fn report(&self) -> RunReport {
        let routes = self
            .routes
            .iter()
            .map(|route| RouteStatistics {
                name: route.name.clone(),
                arrivals: route.arrivals_count(),
                completions: route.completions_count(),
                dropped: route.dropped_count(),
                work_in_process: route.work_in_process(&self.stations),
            })
            .collect();
        let stations = self
            .stations
            .iter()
            .map(|station| StationStatistics {
                name: station.name.clone(),
                queue_length: station.queue_len(),
                busy_slots: station.busy_slots(),
                slot_count: station.slot_count(),
                completed_jobs: station.completed_jobs(),
            })
            .collect();

        RunReport {
            run_id: self.run_id,
            generated_at: Utc::now(),
            clock: self.clock,
            horizon: self.horizon,
            iterations: self.iteration_count,
            termination: self.termination,
            routes,
            stations,
            total_workers: self.workers.len(),
            idle_workers: self.workers.idle_count(),
        }
    }

    fn fire_arrival(&mut self, route_id: RouteId) -> SimulationResult<()> {
        let route = self
            .routes
            .get_mut(route_id.index())
            .ok_or_else(|| SimulationError::configuration_error(format!("unknown route {}", route_id)))?;
        route.admit_arrival(self.clock, &mut self.stations, &mut self.sampler)?;

        let Some(first) = route.first_station() else {
            return Ok(());
        };
        let station = self.stations.station_mut(first)?;
        for slot in 0..station.slot_count() {
            let assigned = self.workers.workers_on(SlotRef::new(first, slot));
            let workers = station.effective_workers(assigned);
            station.try_start(slot, self.clock, workers, &mut self.sampler)?;
        }
        Ok(())
    }

    /// Rescan every slot and reallocate workers until nothing changes
    fn settle(&mut self) -> SimulationResult<()> {
        let mut passes = 0u32;
        loop {
            passes += 1;
            let mut changed = false;

            for slot_ref in self.stations.slot_refs() {
                changed |= self.settle_or_neutralize(slot_ref)?;
            }

            let bound = self
                .allocator
                .allocate(self.clock, &mut self.stations, &mut self.workers, &mut self.sampler)?;
            if bound > 0 {
                changed = true;
            }

            if !changed {
                break;
            }
        }
        trace!(clock = self.clock, passes, "settled");
        Ok(())
    }

    /// Settle one slot, neutralizing it on a recoverable error
    ///
    /// A consistent model never hits the recovery branch; it guards against
    /// slots left inconsistent by hand-assembled state.
    fn settle_or_neutralize(&mut self, slot_ref: SlotRef) -> SimulationResult<bool> {
        match self.settle_slot(slot_ref) {
            Ok(changed) => Ok(changed),
            Err(error) if error.is_recoverable() => Ok(self.neutralize(slot_ref, &error)),
            Err(error) => Err(error),
        }
    }

    fn settle_slot(&mut self, slot_ref: SlotRef) -> SimulationResult<bool> {
        let SlotRef { station: station_id, slot } = slot_ref;
        let station = self.stations.station(station_id)?;
        let timer = station
            .timer(slot)
            .ok_or_else(|| SimulationError::invalid_slot(&station.name, slot))?;
        let occupant = station.occupant(slot).copied();
        let mut changed = false;

        if let Some(part) = occupant {
            let finished = timer.is_due(self.clock) || timer == TimerState::Idle;
            if finished {
                changed |= !self.workers.release(slot_ref).is_empty();
                changed |= timer.is_scheduled();
                match self.routes.get_mut(part.route().index()) {
                    Some(route) => changed |= route.advance_part(station_id, slot, &mut self.stations)?,
                    None => {
                        warn!(slot = %slot_ref, part = %part.id, "slot holds a part of an unknown route");
                        self.stations.station_mut(station_id)?.set_timer(slot, TimerState::Idle)?;
                    }
                }
            }
        }

        let station = self.stations.station_mut(station_id)?;
        let assigned = self.workers.workers_on(slot_ref);
        let workers = station.effective_workers(assigned);
        if station.occupant(slot).is_none() {
            changed |= station.try_start(slot, self.clock, workers, &mut self.sampler)?.moved_part();
        } else if station.timer(slot) == Some(TimerState::AwaitingWorker) && workers > 0 {
            changed |= station.begin_processing(slot, self.clock, workers, &mut self.sampler)?;
        }
        Ok(changed)
    }

    /// Release the slot's workers and idle its timer; returns whether any worker was freed
    fn neutralize(&mut self, slot_ref: SlotRef, error: &SimulationError) -> bool {
        warn!(
            slot = %slot_ref,
            category = error.category(),
            error = %error,
            clock = self.clock,
            "inconsistent slot neutralized"
        );
        let released = self.workers.release(slot_ref);
        if let Some(station) = self.stations.get_mut(slot_ref.station) {
            if station.set_timer(slot_ref.slot, TimerState::Idle).is_err() {
                warn!(slot = %slot_ref, "slot does not exist");
            }
        }
        !released.is_empty()
    }
}
