//! Worker allocation
//!
//! One allocation pass hands idle workers out in two phases:
//!
//! 1. Running slots in ascending order of scheduled completion, each filled up
//!    to its station's worker cap. Every extra worker compresses the slot's
//!    remaining time through [`Station::rescale`].
//! 2. Slots holding a part with no workers, visited in shuffled order, each
//!    filled up to the cap and then started.
//!
//! Workers nobody can use stay idle until the next pass.

use crate::factory::{Station, StationRegistry, WorkerPool};
use crate::sampling::Sampler;
use crate::simulation::SimulationResult;
use crate::types::{SlotRef, TimerState, WorkerId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, trace};

/// Assigns idle workers to slots
#[derive(Debug, Clone)]
pub struct Allocator {
    rng: StdRng,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Allocator {
    /// Create an allocator; `seed` fixes the tie-break shuffle
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Run one allocation pass and return the number of new bindings
    pub fn allocate<S: Sampler + ?Sized>(
        &mut self,
        clock: f64,
        stations: &mut StationRegistry,
        workers: &mut WorkerPool,
        sampler: &mut S,
    ) -> SimulationResult<usize> {
        if workers.idle_count() == 0 {
            return Ok(0);
        }

        let mut bound = self.reinforce_running(clock, stations, workers)?;
        bound += self.staff_waiting(clock, stations, workers, sampler)?;

        if bound > 0 {
            debug!(clock, bound, idle = workers.idle_count(), "allocation pass");
        }
        Ok(bound)
    }

    fn reinforce_running(
        &mut self,
        clock: f64,
        stations: &mut StationRegistry,
        workers: &mut WorkerPool,
    ) -> SimulationResult<usize> {
        let mut running: Vec<(f64, SlotRef)> = stations
            .iter()
            .filter(|station| station.requires_workers())
            .flat_map(|station| {
                station
                    .timers()
                    .iter()
                    .enumerate()
                    .filter_map(move |(slot, timer)| {
                        timer.scheduled_time().map(|time| (time, SlotRef::new(station.id, slot)))
                    })
            })
            .collect();
        running.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut bound = 0;
        for (_, slot_ref) in running {
            if workers.idle_count() == 0 {
                break;
            }
            let station = stations.station_mut(slot_ref.station)?;
            while let Some(worker) = next_worker(station, slot_ref, workers) {
                let current = workers.workers_on(slot_ref);
                workers.bind(worker, slot_ref);
                if current > 0 {
                    station.rescale(slot_ref.slot, clock, current, current + 1)?;
                }
                trace!(slot = %slot_ref, workers = current + 1, "reinforced running slot");
                bound += 1;
            }
        }
        Ok(bound)
    }

    fn staff_waiting<S: Sampler + ?Sized>(
        &mut self,
        clock: f64,
        stations: &mut StationRegistry,
        workers: &mut WorkerPool,
        sampler: &mut S,
    ) -> SimulationResult<usize> {
        let mut waiting: Vec<SlotRef> = stations
            .iter()
            .filter(|station| station.requires_workers())
            .flat_map(|station| {
                station
                    .timers()
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| **timer == TimerState::AwaitingWorker)
                    .map(move |(slot, _)| SlotRef::new(station.id, slot))
            })
            .collect();
        waiting.shuffle(&mut self.rng);

        let mut bound = 0;
        for slot_ref in waiting {
            if workers.idle_count() == 0 {
                break;
            }
            let station = stations.station_mut(slot_ref.station)?;
            let mut staffed = 0;
            while let Some(worker) = next_worker(station, slot_ref, workers) {
                workers.bind(worker, slot_ref);
                staffed += 1;
            }
            if staffed > 0 {
                let count = workers.workers_on(slot_ref);
                station.begin_processing(slot_ref.slot, clock, count, sampler)?;
                trace!(slot = %slot_ref, workers = count, "started waiting slot");
                bound += staffed;
            }
        }
        Ok(bound)
    }
}

fn next_worker(station: &Station, slot: SlotRef, workers: &WorkerPool) -> Option<WorkerId> {
    if workers.workers_on(slot) >= station.max_workers_per_slot {
        return None;
    }
    workers.find_idle_for(station)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{Part, Worker};
    use crate::sampling::{DistributionSpec, RandomSampler};
    use crate::types::{PartId, RouteId, StationId};

    fn part(serial: u64) -> Part {
        Part::new(PartId { route: RouteId(0), serial }, 0)
    }

    fn stations(caps: &[usize]) -> StationRegistry {
        let mut registry = StationRegistry::new();
        for (i, cap) in caps.iter().enumerate() {
            registry.add(Station::new(
                StationId(i),
                format!("s{}", i),
                DistributionSpec::constant(4.0),
                None,
                1,
                *cap,
            ));
        }
        registry
    }

    fn pool(skills: &[&[&str]]) -> WorkerPool {
        let mut pool = WorkerPool::new();
        for (i, set) in skills.iter().enumerate() {
            pool.add(Worker::new(WorkerId(i), format!("w{}", i), set.iter().copied()));
        }
        pool
    }

    fn run(stations: &mut StationRegistry, station: usize, serial: u64, until: f64) {
        stations
            .station_mut(StationId(station))
            .unwrap()
            .place_in_slot(0, part(serial), TimerState::Scheduled(until))
            .unwrap();
    }

    fn wait(stations: &mut StationRegistry, station: usize, serial: u64) {
        stations
            .station_mut(StationId(station))
            .unwrap()
            .place_in_slot(0, part(serial), TimerState::AwaitingWorker)
            .unwrap();
    }

    #[test]
    fn test_reinforces_soonest_completion_first() {
        let mut stations = stations(&[2, 2]);
        let mut workers = pool(&[&["s0", "s1"], &["s0", "s1"], &["s0", "s1"]]);
        let mut sampler = RandomSampler::seeded(1);
        let mut allocator = Allocator::new(Some(1));

        run(&mut stations, 0, 0, 18.0);
        run(&mut stations, 1, 1, 14.0);
        workers.bind(WorkerId(0), SlotRef::new(StationId(0), 0));
        workers.bind(WorkerId(1), SlotRef::new(StationId(1), 0));

        let bound = allocator.allocate(10.0, &mut stations, &mut workers, &mut sampler).unwrap();
        assert_eq!(bound, 1);
        assert_eq!(workers.workers_on(SlotRef::new(StationId(1), 0)), 2);
        // remaining 4 with one worker becomes 2 with two
        assert_eq!(stations.get(StationId(1)).unwrap().timer(0), Some(TimerState::Scheduled(12.0)));
        assert_eq!(stations.get(StationId(0)).unwrap().timer(0), Some(TimerState::Scheduled(18.0)));
    }

    #[test]
    fn test_respects_worker_cap() {
        let mut stations = stations(&[1]);
        let mut workers = pool(&[&["s0"], &["s0"]]);
        let mut sampler = RandomSampler::seeded(1);
        let mut allocator = Allocator::new(Some(1));

        run(&mut stations, 0, 0, 14.0);
        workers.bind(WorkerId(0), SlotRef::new(StationId(0), 0));

        let bound = allocator.allocate(10.0, &mut stations, &mut workers, &mut sampler).unwrap();
        assert_eq!(bound, 0);
        assert_eq!(workers.idle_count(), 1);
        assert_eq!(stations.get(StationId(0)).unwrap().timer(0), Some(TimerState::Scheduled(14.0)));
    }

    #[test]
    fn test_starts_waiting_slot() {
        let mut stations = stations(&[2]);
        let mut workers = pool(&[&["s0"], &["s0"], &["s0"]]);
        let mut sampler = RandomSampler::seeded(1);
        let mut allocator = Allocator::new(Some(1));

        wait(&mut stations, 0, 0);
        let bound = allocator.allocate(3.0, &mut stations, &mut workers, &mut sampler).unwrap();
        assert_eq!(bound, 2);
        assert_eq!(workers.idle_count(), 1);
        // process time 4 shared by two workers
        assert_eq!(stations.get(StationId(0)).unwrap().timer(0), Some(TimerState::Scheduled(5.0)));
    }

    #[test]
    fn test_skills_gate_assignment() {
        let mut stations = stations(&[1, 1]);
        let mut workers = pool(&[&["s1"], &[]]);
        let mut sampler = RandomSampler::seeded(1);
        let mut allocator = Allocator::new(Some(1));

        wait(&mut stations, 0, 0);
        let bound = allocator.allocate(0.0, &mut stations, &mut workers, &mut sampler).unwrap();
        assert_eq!(bound, 0);
        assert_eq!(stations.get(StationId(0)).unwrap().timer(0), Some(TimerState::AwaitingWorker));
        assert_eq!(workers.idle_count(), 2);
    }

    #[test]
    fn test_unattended_stations_are_skipped() {
        let mut stations = stations(&[0]);
        let mut workers = pool(&[&["s0"]]);
        let mut sampler = RandomSampler::seeded(1);
        let mut allocator = Allocator::new(Some(1));

        run(&mut stations, 0, 0, 5.0);
        let bound = allocator.allocate(0.0, &mut stations, &mut workers, &mut sampler).unwrap();
        assert_eq!(bound, 0);
        assert!(workers.assignment_map().is_empty());
    }

    #[test]
    fn test_scarce_worker_goes_to_one_waiting_slot() {
        let mut stations = stations(&[1, 1, 1]);
        let mut workers = pool(&[&["s0", "s1", "s2"]]);
        let mut sampler = RandomSampler::seeded(1);
        let mut allocator = Allocator::new(Some(42));

        for station in 0..3 {
            wait(&mut stations, station, station as u64);
        }
        allocator.allocate(0.0, &mut stations, &mut workers, &mut sampler).unwrap();

        let started: Vec<StationId> = stations
            .iter()
            .filter(|s| s.timer(0).map(TimerState::is_scheduled).unwrap_or(false))
            .map(|s| s.id)
            .collect();
        assert_eq!(started.len(), 1);
        let assigned = workers.get(WorkerId(0)).unwrap().assignment().unwrap();
        assert_eq!(assigned.station, started[0]);
    }
}
