//! Simulation engine and control
//!
//! This module contains the discrete-event engine, the critical-time
//! calendar, factory construction, run reporting, logging setup and error
//! handling.
//!
//! # Overview
//!
//! - **Factory**: owns stations, routes and workers and advances the clock
//! - **CriticalTimeTable**: snapshot of every pending arrival and completion
//! - **FactoryBuilder**: resolves a [`FactoryConfig`](crate::types::FactoryConfig) into a factory
//! - **RunReport**: end-of-run throughput and occupancy
//! - **SimulationError**: error type shared by every simulation operation
//!
//! # Usage Example
//!
//! ```rust
//! use prodsim::simulation::*;
//! use prodsim::types::FactoryConfig;
//!
//! let mut config = FactoryConfig::sample();
//! config.seed = Some(42);
//!
//! let mut factory = FactoryBuilder::new(config).build()?;
//! let summary = factory.run()?;
//! assert!(summary.iterations > 0);
//!
//! let report = factory.report();
//! println!("{}", report.to_text());
//! # Ok::<(), SimulationError>(())
//! ```

pub mod builder;
pub mod calendar;
pub mod engine;
pub mod error;
pub mod logging;
pub mod statistics;

// Re-export all public types for convenience
pub use builder::*;
pub use calendar::*;
pub use engine::*;
pub use error::*;
pub use logging::*;
pub use statistics::*;
