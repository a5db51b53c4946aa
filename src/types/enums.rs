//! Enumeration types for the production simulator
//!
//! Timer states for station slots and arrival generators, calendar keys,
//! start outcomes and output formats.

use crate::types::{RouteId, SlotRef, StationId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scheduling state of a slot or an arrival generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimerState {
    /// Nothing pending
    Idle,
    /// A state change is due at the given simulated time
    Scheduled(f64),
    /// A part sits in the slot but no worker is assigned to it
    AwaitingWorker,
}

impl TimerState {
    /// Scheduled time, if any
    pub fn scheduled_time(self) -> Option<f64> {
        match self {
            TimerState::Scheduled(time) => Some(time),
            _ => None,
        }
    }

    /// Whether the timer has a pending event
    pub fn is_scheduled(self) -> bool {
        matches!(self, TimerState::Scheduled(_))
    }

    /// Whether the timer is due at or before `clock`
    pub fn is_due(self, clock: f64) -> bool {
        matches!(self, TimerState::Scheduled(time) if time <= clock)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        TimerState::Idle
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerState::Idle => write!(f, "idle"),
            TimerState::Scheduled(time) => write!(f, "at {:.4}", time),
            TimerState::AwaitingWorker => write!(f, "awaiting worker"),
        }
    }
}

/// An entity with an entry in the critical-time calendar
///
/// Variant order matters: on equal times arrivals fire before completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Schedulable {
    /// Next arrival of a part route
    Arrival(RouteId),
    /// Completion of the job in one station slot
    Completion(StationId, usize),
}

impl Schedulable {
    /// Calendar key for a slot
    pub fn completion(slot: SlotRef) -> Self {
        Schedulable::Completion(slot.station, slot.slot)
    }
}

impl fmt::Display for Schedulable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedulable::Arrival(route) => write!(f, "arrival {}", route),
            Schedulable::Completion(station, slot) => write!(f, "completion {}#{}", station, slot),
        }
    }
}

/// Result of trying to start work in a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The queue head moved in and a completion was scheduled
    Started,
    /// The queue head moved in but the slot has no worker yet
    AwaitingWorker,
    /// The slot is free and the queue is empty
    Starved,
    /// The slot already holds a part
    Occupied,
}

impl StartOutcome {
    /// Whether processing actually began
    pub fn is_started(self) -> bool {
        matches!(self, StartOutcome::Started)
    }

    /// Whether a part moved out of the queue
    pub fn moved_part(self) -> bool {
        matches!(self, StartOutcome::Started | StartOutcome::AwaitingWorker)
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The clock reached the configured horizon
    HorizonReached,
    /// No entity had a pending event
    CalendarExhausted,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::HorizonReached => write!(f, "horizon reached"),
            TerminationReason::CalendarExhausted => write!(f, "calendar exhausted"),
        }
    }
}

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human readable table
    Text,
    /// JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
