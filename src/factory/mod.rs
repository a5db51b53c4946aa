//! Factory model
//!
//! This module contains the simulated shop floor: process stations with their
//! buffers and slots, part routes that feed and drain them, the worker roster
//! and the allocator that assigns workers to slots.
//!
//! # Overview
//!
//! Stations live once in a [`StationRegistry`] and are shared by every
//! [`PartRoute`] that visits them. Workers are held by a [`WorkerPool`] and
//! bound to slots by the [`Allocator`].
//!
//! # Usage Example
//!
//! ```rust
//! use prodsim::factory::*;
//! use prodsim::sampling::{DistributionSpec, RandomSampler};
//! use prodsim::types::{RouteId, StationId};
//!
//! let mut stations = StationRegistry::new();
//! let drill = stations.add(Station::new(
//!     StationId(0),
//!     "drill",
//!     DistributionSpec::constant(2.0),
//!     Some(3),
//!     1,
//!     1,
//! ));
//!
//! let mut route = PartRoute::new(RouteId(0), "bracket", DistributionSpec::constant(1.0), vec![drill]);
//! let mut sampler = RandomSampler::seeded(1);
//! assert!(route.admit_arrival(0.0, &mut stations, &mut sampler).unwrap());
//! assert_eq!(stations.get(drill).unwrap().queue_len(), 1);
//! ```

pub mod allocator;
pub mod part_route;
pub mod registry;
pub mod station;
pub mod worker;

pub use allocator::Allocator;
pub use part_route::{Part, PartRoute};
pub use registry::StationRegistry;
pub use station::Station;
pub use worker::{Worker, WorkerPool};
