//! Run statistics and reporting
//!
//! This module contains the end-of-run report built from a factory's
//! read-only accessors.

use crate::simulation::SimulationResult;
use crate::types::{RunId, TerminationReason};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Throughput of one part route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStatistics {
    /// Part type name
    pub name: String,
    /// Parts admitted into the first station
    pub arrivals: u64,
    /// Parts that left the last station
    pub completions: u64,
    /// Arrivals lost to a full first buffer
    pub dropped: u64,
    /// Parts still held in buffers or slots
    pub work_in_process: u64,
}

impl RouteStatistics {
    /// Completions as a percentage of admitted arrivals
    pub fn completion_percentage(&self) -> f64 {
        if self.arrivals == 0 {
            0.0
        } else {
            self.completions as f64 / self.arrivals as f64 * 100.0
        }
    }
}

/// Occupancy of one station at the end of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationStatistics {
    /// Station name
    pub name: String,
    /// Parts waiting in the input buffer
    pub queue_length: usize,
    /// Occupied slots
    pub busy_slots: usize,
    /// Total slots
    pub slot_count: usize,
    /// Parts that left a slot
    pub completed_jobs: u64,
}

/// Summary of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier of the run
    pub run_id: RunId,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Final simulated time
    pub clock: f64,
    /// Configured horizon
    pub horizon: f64,
    /// Ticks executed
    pub iterations: u64,
    /// Why the run stopped, if it has
    pub termination: Option<TerminationReason>,
    /// Per-route throughput
    pub routes: Vec<RouteStatistics>,
    /// Per-station occupancy
    pub stations: Vec<StationStatistics>,
    /// Workers on the roster
    pub total_workers: usize,
    /// Workers not bound to any slot
    pub idle_workers: usize,
}

impl RunReport {
    /// Total arrivals over all routes
    pub fn total_arrivals(&self) -> u64 {
        self.routes.iter().map(|route| route.arrivals).sum()
    }

    /// Total completions over all routes
    pub fn total_completions(&self) -> u64 {
        self.routes.iter().map(|route| route.completions).sum()
    }

    /// Render the report as a console table
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Render the report as pretty-printed JSON
    pub fn to_json(&self) -> SimulationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Production Run {} ===", self.run_id)?;
        writeln!(f, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Clock: {:.3} / {:.3}", self.clock, self.horizon)?;
        writeln!(f, "Iterations: {}", self.iterations)?;
        if let Some(reason) = self.termination {
            writeln!(f, "Stopped: {}", reason)?;
        }
        writeln!(f, "Workers: {} idle of {}", self.idle_workers, self.total_workers)?;

        writeln!(f)?;
        writeln!(
            f,
            "{:<20} {:>10} {:>12} {:>8} {:>6} {:>8}",
            "Part", "Arrivals", "Completions", "Dropped", "WIP", "Done %"
        )?;
        for route in &self.routes {
            writeln!(
                f,
                "{:<20} {:>10} {:>12} {:>8} {:>6} {:>7.1}%",
                route.name,
                route.arrivals,
                route.completions,
                route.dropped,
                route.work_in_process,
                route.completion_percentage()
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{:<20} {:>8} {:>10} {:>10}", "Station", "Queue", "Busy", "Jobs")?;
        for station in &self.stations {
            writeln!(
                f,
                "{:<20} {:>8} {:>10} {:>10}",
                station.name,
                station.queue_length,
                format!("{}/{}", station.busy_slots, station.slot_count),
                station.completed_jobs
            )?;
        }
        Ok(())
    }
}
