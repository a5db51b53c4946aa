//! Stochastic sampling
//!
//! Process times and interarrival times are drawn through the [`Sampler`]
//! trait. [`RandomSampler`] implements the Weibull distribution locally and
//! delegates the other named distributions to `rand_distr`.
//!
//! # Usage Example
//!
//! ```rust
//! use prodsim::sampling::*;
//!
//! let mut sampler = RandomSampler::seeded(7);
//! let spec = DistributionSpec::with_params("weibull", &[("shape", 1.5), ("scale", 2.0)]);
//! let sample = sampler.sample(&spec).unwrap();
//! assert!(sample >= 0.0);
//! ```

pub mod distribution;
pub mod sampler;

pub use distribution::*;
pub use sampler::*;
