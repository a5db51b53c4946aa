//! Process stations
//!
//! A station has a FIFO input buffer, a fixed number of execution slots and one
//! timer per slot. Work in a slot is processor-shared: its remaining time
//! scales inversely with the number of workers assigned to it.

use crate::factory::Part;
use crate::sampling::{DistributionSpec, Sampler};
use crate::simulation::{SimulationError, SimulationResult};
use crate::types::{StartOutcome, StationId, TimerState};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

/// A process step with a bounded or unbounded input buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Arena index of this station
    pub id: StationId,
    /// Unique station name
    pub name: String,
    /// Process-time distribution
    pub process_time: DistributionSpec,
    /// Input buffer capacity, `None` for unbounded
    pub buffer_capacity: Option<usize>,
    /// Cap on workers assisting one slot; 0 means unattended
    pub max_workers_per_slot: usize,
    slots: Vec<Option<Part>>,
    timers: Vec<TimerState>,
    queue: VecDeque<Part>,
    completed_jobs: u64,
}

impl Station {
    /// Create a station with `slot_count` empty slots
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        process_time: DistributionSpec,
        buffer_capacity: Option<usize>,
        slot_count: usize,
        max_workers_per_slot: usize,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            process_time,
            buffer_capacity,
            max_workers_per_slot,
            slots: vec![None; slot_count],
            timers: vec![TimerState::Idle; slot_count],
            queue: VecDeque::new(),
            completed_jobs: 0,
        }
    }

    /// Number of concurrent execution slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether slots need workers to make progress
    pub fn requires_workers(&self) -> bool {
        self.max_workers_per_slot > 0
    }

    /// Worker count used for timing: unattended stations always run at rate 1
    pub fn effective_workers(&self, assigned: usize) -> usize {
        if self.requires_workers() {
            assigned
        } else {
            1
        }
    }

    /// Whether the input buffer has reached its capacity
    pub fn is_buffer_full(&self) -> bool {
        match self.buffer_capacity {
            None => false,
            Some(capacity) => self.queue.len() >= capacity,
        }
    }

    /// Append a part to the buffer tail
    ///
    /// Callers must check [`Station::is_buffer_full`] first.
    pub fn enqueue(&mut self, part: Part) {
        trace!(station = %self.name, part = %part.id, "enqueue");
        self.queue.push_back(part);
    }

    /// First empty slot, if any
    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Whether a part handed over from upstream can be taken right now
    ///
    /// A full buffer still takes a part when nothing is queued and a slot is
    /// free; with zero buffer capacity this is the only way in.
    pub fn can_accept(&self) -> bool {
        !self.is_buffer_full() || (self.queue.is_empty() && self.free_slot().is_some())
    }

    /// Take a part from upstream, into the buffer or straight into a free slot
    ///
    /// A part placed directly into a slot waits there for workers.
    pub fn accept(&mut self, part: Part) -> bool {
        if !self.is_buffer_full() {
            self.enqueue(part);
            return true;
        }
        if !self.queue.is_empty() {
            return false;
        }
        match self.free_slot() {
            Some(slot) => {
                trace!(station = %self.name, slot, part = %part.id, "direct to slot");
                self.slots[slot] = Some(part);
                self.timers[slot] = TimerState::AwaitingWorker;
                true
            }
            None => false,
        }
    }

    /// Remove and return the buffer head
    pub fn dequeue_head(&mut self) -> SimulationResult<Part> {
        self.queue.pop_front().ok_or_else(|| SimulationError::empty_queue(&self.name))
    }

    /// Parts waiting in the buffer, head first
    pub fn queue(&self) -> impl Iterator<Item = &Part> {
        self.queue.iter()
    }

    /// Current buffer length
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Occupant of a slot
    pub fn occupant(&self, slot: usize) -> Option<&Part> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Timer of a slot
    pub fn timer(&self, slot: usize) -> Option<TimerState> {
        self.timers.get(slot).copied()
    }

    /// All slot timers
    pub fn timers(&self) -> &[TimerState] {
        &self.timers
    }

    /// Number of occupied slots
    pub fn busy_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Parts that have left a slot of this station
    pub fn completed_jobs(&self) -> u64 {
        self.completed_jobs
    }

    /// Parts currently held in buffer or slots
    pub fn resident_parts(&self) -> impl Iterator<Item = &Part> {
        self.queue.iter().chain(self.slots.iter().flatten())
    }

    fn check_slot(&self, slot: usize) -> SimulationResult<()> {
        if slot < self.slots.len() {
            Ok(())
        } else {
            Err(SimulationError::invalid_slot(&self.name, slot))
        }
    }

    /// Try to move the buffer head into `slot`
    ///
    /// With workers present the process time is sampled and divided among
    /// them. Without workers the part still takes the slot but waits there
    /// for the allocator.
    pub fn try_start<S: Sampler + ?Sized>(
        &mut self,
        slot: usize,
        clock: f64,
        worker_count: usize,
        sampler: &mut S,
    ) -> SimulationResult<StartOutcome> {
        self.check_slot(slot)?;

        if self.slots[slot].is_some() {
            return Ok(StartOutcome::Occupied);
        }
        if self.queue.is_empty() {
            self.timers[slot] = TimerState::Idle;
            return Ok(StartOutcome::Starved);
        }

        if worker_count == 0 {
            let part = self.dequeue_head()?;
            trace!(station = %self.name, slot, part = %part.id, "part awaiting worker");
            self.slots[slot] = Some(part);
            self.timers[slot] = TimerState::AwaitingWorker;
            return Ok(StartOutcome::AwaitingWorker);
        }

        let sample = sampler.sample(&self.process_time)?;
        let part = self.dequeue_head()?;
        let completion = clock + sample / worker_count as f64;
        trace!(station = %self.name, slot, part = %part.id, completion, "start");
        self.slots[slot] = Some(part);
        self.timers[slot] = TimerState::Scheduled(completion);
        Ok(StartOutcome::Started)
    }

    /// Start processing a part that was waiting in `slot` for workers
    ///
    /// Returns `false` when the slot was not waiting or `worker_count` is zero.
    pub fn begin_processing<S: Sampler + ?Sized>(
        &mut self,
        slot: usize,
        clock: f64,
        worker_count: usize,
        sampler: &mut S,
    ) -> SimulationResult<bool> {
        self.check_slot(slot)?;

        if worker_count == 0 || self.timers[slot] != TimerState::AwaitingWorker {
            return Ok(false);
        }
        if self.slots[slot].is_none() {
            self.timers[slot] = TimerState::Idle;
            return Ok(false);
        }

        let sample = sampler.sample(&self.process_time)?;
        self.timers[slot] = TimerState::Scheduled(clock + sample / worker_count as f64);
        Ok(true)
    }

    /// Rescale the remaining time of a running slot after its worker count changed
    ///
    /// `remaining' = remaining * old_worker_count / new_worker_count`
    pub fn rescale(
        &mut self,
        slot: usize,
        clock: f64,
        old_worker_count: usize,
        new_worker_count: usize,
    ) -> SimulationResult<()> {
        self.check_slot(slot)?;
        if new_worker_count == 0 {
            return Err(SimulationError::division_by_zero(&self.name, slot));
        }

        if let TimerState::Scheduled(completion) = self.timers[slot] {
            let remaining = (completion - clock) * old_worker_count as f64 / new_worker_count as f64;
            self.timers[slot] = TimerState::Scheduled(clock + remaining);
        }
        Ok(())
    }

    /// Remove the occupant of `slot`, leaving the slot idle
    pub fn take_part(&mut self, slot: usize) -> SimulationResult<Option<Part>> {
        self.check_slot(slot)?;
        let part = self.slots[slot].take();
        self.timers[slot] = TimerState::Idle;
        if part.is_some() {
            self.completed_jobs += 1;
        }
        Ok(part)
    }

    /// Overwrite a slot timer
    pub fn set_timer(&mut self, slot: usize, timer: TimerState) -> SimulationResult<()> {
        self.check_slot(slot)?;
        self.timers[slot] = timer;
        Ok(())
    }

    /// Place a part directly into an empty slot
    pub fn place_in_slot(&mut self, slot: usize, part: Part, timer: TimerState) -> SimulationResult<()> {
        self.check_slot(slot)?;
        self.slots[slot] = Some(part);
        self.timers[slot] = timer;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::RandomSampler;
    use crate::types::{PartId, RouteId};

    fn part(serial: u64) -> Part {
        Part::new(PartId { route: RouteId(0), serial }, 0)
    }

    fn station(buffer: Option<usize>, slots: usize) -> Station {
        Station::new(StationId(0), "test", DistributionSpec::constant(3.0), buffer, slots, 2)
    }

    #[test]
    fn test_buffer_full() {
        let mut station = station(Some(3), 1);
        assert!(!station.is_buffer_full());
        for serial in 0..3 {
            station.enqueue(part(serial));
        }
        assert!(station.is_buffer_full());
    }

    #[test]
    fn test_unbounded_buffer_never_full() {
        let mut station = station(None, 1);
        for serial in 0..1_000 {
            station.enqueue(part(serial));
        }
        assert!(!station.is_buffer_full());
    }

    #[test]
    fn test_zero_capacity_buffer_is_always_full() {
        let station = station(Some(0), 1);
        assert!(station.is_buffer_full());
    }

    #[test]
    fn test_zero_capacity_accepts_directly_into_free_slot() {
        let mut station = station(Some(0), 1);
        assert!(station.can_accept());
        assert!(station.accept(part(1)));
        assert_eq!(station.queue_len(), 0);
        assert_eq!(station.occupant(0).unwrap().id.serial, 1);
        assert_eq!(station.timer(0), Some(TimerState::AwaitingWorker));

        assert!(!station.can_accept());
        assert!(!station.accept(part(2)));
    }

    #[test]
    fn test_full_buffer_with_queue_rejects_even_with_free_slot() {
        let mut station = station(Some(1), 1);
        station.enqueue(part(1));
        assert!(station.free_slot().is_some());
        assert!(!station.can_accept());
        assert!(!station.accept(part(2)));
    }

    #[test]
    fn test_dequeue_head_fifo() {
        let mut station = station(None, 1);
        station.enqueue(part(1));
        station.enqueue(part(2));
        assert_eq!(station.dequeue_head().unwrap().id.serial, 1);
        assert_eq!(station.dequeue_head().unwrap().id.serial, 2);
        assert!(matches!(station.dequeue_head(), Err(SimulationError::EmptyQueue { .. })));
    }

    #[test]
    fn test_try_start_empty_buffer() {
        let mut station = station(Some(3), 1);
        let mut sampler = RandomSampler::seeded(0);
        let outcome = station.try_start(0, 5.0, 1, &mut sampler).unwrap();
        assert_eq!(outcome, StartOutcome::Starved);
        assert!(station.occupant(0).is_none());
        assert_eq!(station.timer(0), Some(TimerState::Idle));
    }

    #[test]
    fn test_try_start_occupied_slot_is_noop() {
        let mut station = station(Some(3), 1);
        let mut sampler = RandomSampler::seeded(0);
        station.place_in_slot(0, part(9), TimerState::Scheduled(7.0)).unwrap();
        station.enqueue(part(1));

        let outcome = station.try_start(0, 5.0, 1, &mut sampler).unwrap();
        assert_eq!(outcome, StartOutcome::Occupied);
        assert_eq!(station.occupant(0).unwrap().id.serial, 9);
        assert_eq!(station.timer(0), Some(TimerState::Scheduled(7.0)));
        assert_eq!(station.queue_len(), 1);
    }

    #[test]
    fn test_try_start_with_workers() {
        let mut station = station(Some(3), 1);
        let mut sampler = RandomSampler::seeded(0);
        for serial in 1..=3 {
            station.enqueue(part(serial));
        }

        let outcome = station.try_start(0, 5.0, 1, &mut sampler).unwrap();
        assert!(outcome.is_started());
        assert_eq!(station.occupant(0).unwrap().id.serial, 1);
        assert_eq!(station.timer(0), Some(TimerState::Scheduled(8.0)));
        let waiting: Vec<u64> = station.queue().map(|p| p.id.serial).collect();
        assert_eq!(waiting, vec![2, 3]);
    }

    #[test]
    fn test_try_start_divides_by_workers() {
        let mut station = station(None, 1);
        let mut sampler = RandomSampler::seeded(0);
        station.enqueue(part(1));
        station.try_start(0, 1.0, 2, &mut sampler).unwrap();
        assert_eq!(station.timer(0), Some(TimerState::Scheduled(2.5)));
    }

    #[test]
    fn test_try_start_without_workers_waits_in_slot() {
        let mut station = station(None, 1);
        let mut sampler = RandomSampler::seeded(0);
        station.enqueue(part(1));

        let outcome = station.try_start(0, 1.0, 0, &mut sampler).unwrap();
        assert_eq!(outcome, StartOutcome::AwaitingWorker);
        assert!(!outcome.is_started());
        assert_eq!(station.timer(0), Some(TimerState::AwaitingWorker));
        assert_eq!(station.occupant(0).unwrap().id.serial, 1);
        assert_eq!(station.queue_len(), 0);

        assert!(station.begin_processing(0, 2.0, 1, &mut sampler).unwrap());
        assert_eq!(station.timer(0), Some(TimerState::Scheduled(5.0)));
    }

    #[test]
    fn test_try_start_invalid_slot() {
        let mut station = station(None, 2);
        let mut sampler = RandomSampler::seeded(0);
        assert!(matches!(
            station.try_start(2, 0.0, 1, &mut sampler),
            Err(SimulationError::InvalidSlot { slot: 2, .. })
        ));
    }

    #[test]
    fn test_rescale_halves_remaining_time() {
        let mut station = station(None, 1);
        station.place_in_slot(0, part(1), TimerState::Scheduled(14.0)).unwrap();
        // remaining 4 with 1 worker becomes 2 with 2 workers
        station.rescale(0, 10.0, 1, 2).unwrap();
        assert_eq!(station.timer(0), Some(TimerState::Scheduled(12.0)));
    }

    #[test]
    fn test_rescale_extends_when_workers_leave() {
        let mut station = station(None, 1);
        station.place_in_slot(0, part(1), TimerState::Scheduled(13.0)).unwrap();
        station.rescale(0, 10.0, 2, 1).unwrap();
        assert_eq!(station.timer(0), Some(TimerState::Scheduled(16.0)));
    }

    #[test]
    fn test_rescale_to_zero_workers_fails() {
        let mut station = station(None, 1);
        station.place_in_slot(0, part(1), TimerState::Scheduled(13.0)).unwrap();
        assert!(matches!(
            station.rescale(0, 10.0, 1, 0),
            Err(SimulationError::DivisionByZero { .. })
        ));
        assert_eq!(station.timer(0), Some(TimerState::Scheduled(13.0)));
    }

    #[test]
    fn test_take_part_clears_slot() {
        let mut station = station(None, 1);
        station.place_in_slot(0, part(4), TimerState::Scheduled(3.0)).unwrap();
        let taken = station.take_part(0).unwrap().unwrap();
        assert_eq!(taken.id.serial, 4);
        assert!(station.occupant(0).is_none());
        assert_eq!(station.timer(0), Some(TimerState::Idle));
        assert_eq!(station.completed_jobs(), 1);
    }

    #[test]
    fn test_unattended_station_runs_at_unit_rate() {
        let station = Station::new(StationId(1), "oven", DistributionSpec::constant(1.0), None, 1, 0);
        assert!(!station.requires_workers());
        assert_eq!(station.effective_workers(0), 1);

        let staffed = station_with_cap(3);
        assert_eq!(staffed.effective_workers(0), 0);
        assert_eq!(staffed.effective_workers(2), 2);
    }

    fn station_with_cap(cap: usize) -> Station {
        Station::new(StationId(2), "lathe", DistributionSpec::constant(1.0), None, 1, cap)
    }
}
