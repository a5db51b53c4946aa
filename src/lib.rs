//! Production Simulator
//!
//! A discrete-event simulator for multi-stage manufacturing networks. Part
//! types arrive stochastically, flow through ordered process stations with
//! finite input buffers and parallel slots, and compete for a shared pool of
//! skilled workers.
//!
//! # Overview
//!
//! Time advances from one critical instant to the next. After every event the
//! shop floor is settled to a fixed point: finished parts advance or block,
//! free slots pull from their buffers, and idle workers are handed out,
//! soonest completion first and then in shuffled order to slots that hold a
//! part but have nobody working on it. A slot's remaining work scales
//! inversely with the number of workers assigned to it.
//!
//! ## Quick Start
//!
//! ```rust
//! use prodsim::*;
//!
//! let mut config = FactoryConfig::sample();
//! config.seed = Some(7);
//! config.simulation_time = 60.0;
//!
//! let mut factory = FactoryBuilder::new(config).build()?;
//! factory.run()?;
//!
//! for route in factory.routes() {
//!     assert!(route.completions_count() <= route.arrivals_count());
//! }
//! # Ok::<(), SimulationError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, timer states, configuration
//! - [`sampling`]: named distributions behind the [`Sampler`] trait
//! - [`factory`]: stations, part routes, workers and the allocator
//! - [`simulation`]: engine, calendar, builder, reporting and logging
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

pub mod factory;
pub mod sampling;
pub mod simulation;
pub mod types;

// Configuration and core types
pub use types::{
    CliArgs, ConfigError, ConfigValidationError, FactoryConfig, OutputFormat, PartId, PartTypeConfig,
    RouteId, RunId, Schedulable, SlotRef, StationConfig, StationId, TerminationReason, TimerState,
    WorkerConfig, WorkerId,
};

// Sampling
pub use sampling::{DistributionSpec, RandomSampler, Sampler, SamplingError};

// Factory model
pub use factory::{Allocator, Part, PartRoute, Station, StationRegistry, Worker, WorkerPool};

// Simulation
pub use simulation::{
    CriticalTimeTable, Factory, FactoryBuilder, LoggingConfig, RunReport, RunSummary, SimulationError,
    SimulationResult,
};
