//! Core types, identifiers and configuration for the production simulator
//!
//! # Overview
//!
//! - **Identifiers**: arena indices for stations, routes and workers, plus a
//!   UUID run identifier
//! - **Enums**: slot timer states, calendar keys, start outcomes
//! - **Configuration**: factory description file and command line arguments
//!
//! # Usage Example
//!
//! ```rust
//! use prodsim::types::*;
//!
//! let slot = SlotRef::new(StationId(0), 1);
//! let key = Schedulable::completion(slot);
//! assert_eq!(key, Schedulable::Completion(StationId(0), 1));
//!
//! let timer = TimerState::Scheduled(4.0);
//! assert!(timer.is_due(4.0));
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
