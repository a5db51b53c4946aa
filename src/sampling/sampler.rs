//! Sampler capability
//!
//! Stations and arrival generators never draw random numbers themselves; they
//! hand their [`DistributionSpec`] to a [`Sampler`]. The engine is generic over
//! the sampler so tests can inject deterministic ones.

use super::{DistributionSpec, ResolvedDistribution, SamplingError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Gamma, LogNormal, Normal, Triangular};
use tracing::debug;

/// Maps a distribution spec to a nonnegative sample
pub trait Sampler {
    /// Draw one sample; the result is never negative
    fn sample(&mut self, spec: &DistributionSpec) -> Result<f64, SamplingError>;

    /// Check that `spec` can be sampled without drawing from it
    fn validate(&self, spec: &DistributionSpec) -> Result<(), SamplingError>;
}

/// Sampler backed by a seeded standard RNG
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    /// Create a sampler with an optional seed
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => {
                debug!("Sampler using deterministic seed: {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Create a deterministic sampler
    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    fn draw(&mut self, distribution: ResolvedDistribution) -> Result<f64, SamplingError> {
        let rng = &mut self.rng;
        let value = match distribution {
            ResolvedDistribution::Weibull { shape, scale } => weibull(rng, shape, scale),
            ResolvedDistribution::Constant(value) => value,
            ResolvedDistribution::Uniform { low, high } => {
                if low == high {
                    low
                } else {
                    rng.gen_range(low..high)
                }
            }
            ResolvedDistribution::Exponential { scale } => {
                Exp::new(1.0 / scale).map_err(|e| invalid("exponential", e))?.sample(rng)
            }
            ResolvedDistribution::Normal { loc, scale } => {
                Normal::new(loc, scale).map_err(|e| invalid("normal", e))?.sample(rng)
            }
            ResolvedDistribution::LogNormal { mean, sigma } => {
                LogNormal::new(mean, sigma).map_err(|e| invalid("lognormal", e))?.sample(rng)
            }
            ResolvedDistribution::Gamma { shape, scale } => {
                Gamma::new(shape, scale).map_err(|e| invalid("gamma", e))?.sample(rng)
            }
            ResolvedDistribution::Triangular { left, mode, right } => {
                Triangular::new(left, right, mode)
                    .map_err(|e| invalid("triangular", e))?
                    .sample(rng)
            }
        };

        Ok(value.max(0.0))
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Sampler for RandomSampler {
    fn sample(&mut self, spec: &DistributionSpec) -> Result<f64, SamplingError> {
        let distribution = spec.resolve()?;
        self.draw(distribution)
    }

    fn validate(&self, spec: &DistributionSpec) -> Result<(), SamplingError> {
        spec.resolve().map(|_| ())
    }
}

/// Two-parameter Weibull by inversion: `scale * (-ln(1 - U))^(1 / shape)`
fn weibull<R: Rng + ?Sized>(rng: &mut R, shape: f64, scale: f64) -> f64 {
    let u: f64 = rng.gen();
    scale * (-(1.0 - u).ln()).powf(1.0 / shape)
}

fn invalid(distribution: &str, error: impl std::fmt::Display) -> SamplingError {
    SamplingError::InvalidParameters {
        distribution: distribution.to_string(),
        reason: error.to_string(),
    }
}
