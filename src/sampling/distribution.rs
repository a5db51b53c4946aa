//! Distribution specifications
//!
//! A [`DistributionSpec`] is the (name, parameters) pair a station or route
//! carries; it is resolved into a concrete [`ResolvedDistribution`] before
//! any sample is drawn.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while resolving or drawing from a distribution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    /// No implementation matches the name
    #[error("Unknown distribution: {0}")]
    UnknownDistribution(String),

    /// A required parameter is absent
    #[error("Distribution {distribution} requires parameter {parameter}")]
    MissingParameter {
        /// Distribution name
        distribution: String,
        /// Missing parameter key
        parameter: String,
    },

    /// Parameters are present but unusable
    #[error("Invalid parameters for {distribution}: {reason}")]
    InvalidParameters {
        /// Distribution name
        distribution: String,
        /// What is wrong with them
        reason: String,
    },
}

/// Name and parameters of a sampling distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSpec {
    /// Distribution name, matched case-insensitively
    pub name: String,
    /// Keyword parameters
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl DistributionSpec {
    /// Create a spec from a name and parameter map
    pub fn new(name: impl Into<String>, parameters: BTreeMap<String, f64>) -> Self {
        Self { name: name.into(), parameters }
    }

    /// A deterministic distribution that always yields `value`
    pub fn constant(value: f64) -> Self {
        Self::new("constant", BTreeMap::from([("value".to_string(), value)]))
    }

    /// Build a spec from literal key/value pairs
    pub fn with_params(name: impl Into<String>, pairs: &[(&str, f64)]) -> Self {
        Self::new(name, pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }

    fn required(&self, key: &str) -> Result<f64, SamplingError> {
        self.parameters.get(key).copied().ok_or_else(|| SamplingError::MissingParameter {
            distribution: self.name.clone(),
            parameter: key.to_string(),
        })
    }

    fn optional(&self, key: &str, default: f64) -> f64 {
        self.parameters.get(key).copied().unwrap_or(default)
    }

    fn invalid(&self, reason: impl Into<String>) -> SamplingError {
        SamplingError::InvalidParameters { distribution: self.name.clone(), reason: reason.into() }
    }

    fn reject_unknown_keys(&self, allowed: &[&str]) -> Result<(), SamplingError> {
        match self.parameters.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(key) => Err(self.invalid(format!("unexpected parameter {}", key))),
            None => Ok(()),
        }
    }

    fn positive(&self, key: &str, value: f64) -> Result<f64, SamplingError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(self.invalid(format!("{} must be positive, got {}", key, value)))
        }
    }

    /// Resolve the spec into a concrete distribution
    pub fn resolve(&self) -> Result<ResolvedDistribution, SamplingError> {
        let resolved = match self.name.to_lowercase().as_str() {
            "weibull" => {
                self.reject_unknown_keys(&["shape", "a", "scale"])?;
                let shape = match self.parameters.get("shape") {
                    Some(value) => *value,
                    None => self.required("a")?,
                };
                ResolvedDistribution::Weibull {
                    shape: self.positive("shape", shape)?,
                    scale: self.positive("scale", self.optional("scale", 1.0))?,
                }
            }
            "constant" | "delta" | "deterministic" => {
                self.reject_unknown_keys(&["value"])?;
                let value = self.required("value")?;
                if !value.is_finite() {
                    return Err(self.invalid("value must be finite"));
                }
                ResolvedDistribution::Constant(value)
            }
            "uniform" => {
                self.reject_unknown_keys(&["low", "high"])?;
                let low = self.optional("low", 0.0);
                let high = self.optional("high", 1.0);
                if !(low.is_finite() && high.is_finite()) || low > high {
                    return Err(self.invalid(format!("need low <= high, got {} and {}", low, high)));
                }
                ResolvedDistribution::Uniform { low, high }
            }
            "exponential" => {
                self.reject_unknown_keys(&["scale"])?;
                ResolvedDistribution::Exponential {
                    scale: self.positive("scale", self.optional("scale", 1.0))?,
                }
            }
            "normal" => {
                self.reject_unknown_keys(&["loc", "scale"])?;
                let loc = self.optional("loc", 0.0);
                let scale = self.optional("scale", 1.0);
                if !loc.is_finite() || !scale.is_finite() || scale < 0.0 {
                    return Err(self.invalid("scale must be nonnegative"));
                }
                ResolvedDistribution::Normal { loc, scale }
            }
            "lognormal" => {
                self.reject_unknown_keys(&["mean", "sigma"])?;
                let mean = self.optional("mean", 0.0);
                let sigma = self.optional("sigma", 1.0);
                if !mean.is_finite() || !sigma.is_finite() || sigma < 0.0 {
                    return Err(self.invalid("sigma must be nonnegative"));
                }
                ResolvedDistribution::LogNormal { mean, sigma }
            }
            "gamma" => {
                self.reject_unknown_keys(&["shape", "scale"])?;
                ResolvedDistribution::Gamma {
                    shape: self.positive("shape", self.required("shape")?)?,
                    scale: self.positive("scale", self.optional("scale", 1.0))?,
                }
            }
            "triangular" => {
                self.reject_unknown_keys(&["left", "mode", "right"])?;
                let left = self.required("left")?;
                let mode = self.required("mode")?;
                let right = self.required("right")?;
                if !(left <= mode && mode <= right && left < right) {
                    return Err(self.invalid("need left <= mode <= right and left < right"));
                }
                ResolvedDistribution::Triangular { left, mode, right }
            }
            _ => return Err(SamplingError::UnknownDistribution(self.name.clone())),
        };

        Ok(resolved)
    }
}

impl fmt::Display for DistributionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, ")")
    }
}

/// A distribution whose parameters have been checked
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedDistribution {
    /// Two-parameter Weibull
    Weibull {
        /// Shape `k`
        shape: f64,
        /// Scale `lambda`
        scale: f64,
    },
    /// Always the same value
    Constant(f64),
    /// Uniform on `[low, high)`
    Uniform {
        /// Lower bound
        low: f64,
        /// Upper bound
        high: f64,
    },
    /// Exponential with the given mean
    Exponential {
        /// Mean (inverse rate)
        scale: f64,
    },
    /// Gaussian
    Normal {
        /// Mean
        loc: f64,
        /// Standard deviation
        scale: f64,
    },
    /// Log-normal, parameterized by the underlying normal
    LogNormal {
        /// Mean of the underlying normal
        mean: f64,
        /// Standard deviation of the underlying normal
        sigma: f64,
    },
    /// Gamma with shape and scale
    Gamma {
        /// Shape `k`
        shape: f64,
        /// Scale `theta`
        scale: f64,
    },
    /// Triangular on `[left, right]` peaking at `mode`
    Triangular {
        /// Lower bound
        left: f64,
        /// Peak
        mode: f64,
        /// Upper bound
        right: f64,
    },
}

impl ResolvedDistribution {
    /// Whether every sample, once clamped at zero, is exactly zero
    pub fn is_always_zero(&self) -> bool {
        match *self {
            ResolvedDistribution::Constant(value) => value <= 0.0,
            ResolvedDistribution::Uniform { high, .. } => high <= 0.0,
            ResolvedDistribution::Normal { loc, scale } => scale == 0.0 && loc <= 0.0,
            ResolvedDistribution::Triangular { right, .. } => right <= 0.0,
            ResolvedDistribution::Weibull { .. }
            | ResolvedDistribution::Exponential { .. }
            | ResolvedDistribution::LogNormal { .. }
            | ResolvedDistribution::Gamma { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_weibull_defaults_scale() {
        let spec = DistributionSpec::with_params("Weibull", &[("shape", 2.0)]);
        assert_eq!(
            spec.resolve().unwrap(),
            ResolvedDistribution::Weibull { shape: 2.0, scale: 1.0 }
        );
    }

    #[test]
    fn test_resolve_weibull_accepts_a_for_shape() {
        let spec = DistributionSpec::with_params("weibull", &[("a", 1.5), ("scale", 3.0)]);
        assert_eq!(
            spec.resolve().unwrap(),
            ResolvedDistribution::Weibull { shape: 1.5, scale: 3.0 }
        );
    }

    #[test]
    fn test_unknown_distribution() {
        let spec = DistributionSpec::with_params("zipf", &[("a", 2.0)]);
        assert_eq!(
            spec.resolve().unwrap_err(),
            SamplingError::UnknownDistribution("zipf".to_string())
        );
    }

    #[test]
    fn test_missing_parameter() {
        let spec = DistributionSpec::with_params("gamma", &[("scale", 2.0)]);
        assert!(matches!(
            spec.resolve(),
            Err(SamplingError::MissingParameter { parameter, .. }) if parameter == "shape"
        ));
    }

    #[test]
    fn test_unexpected_parameter_rejected() {
        let spec = DistributionSpec::with_params("uniform", &[("low", 1.0), ("hi", 2.0)]);
        assert!(matches!(spec.resolve(), Err(SamplingError::InvalidParameters { .. })));
    }

    #[test]
    fn test_invalid_ranges() {
        let uniform = DistributionSpec::with_params("uniform", &[("low", 5.0), ("high", 1.0)]);
        assert!(uniform.resolve().is_err());

        let exponential = DistributionSpec::with_params("exponential", &[("scale", 0.0)]);
        assert!(exponential.resolve().is_err());

        let triangular = DistributionSpec::with_params(
            "triangular",
            &[("left", 1.0), ("mode", 5.0), ("right", 3.0)],
        );
        assert!(triangular.resolve().is_err());
    }

    #[test]
    fn test_always_zero_detection() {
        assert!(DistributionSpec::constant(0.0).resolve().unwrap().is_always_zero());
        assert!(DistributionSpec::constant(-2.0).resolve().unwrap().is_always_zero());
        let uniform = DistributionSpec::with_params("uniform", &[("low", 0.0), ("high", 0.0)]);
        assert!(uniform.resolve().unwrap().is_always_zero());
        let normal = DistributionSpec::with_params("normal", &[("loc", -1.0), ("scale", 0.0)]);
        assert!(normal.resolve().unwrap().is_always_zero());

        assert!(!DistributionSpec::constant(0.5).resolve().unwrap().is_always_zero());
        let uniform = DistributionSpec::with_params("uniform", &[("low", 0.0), ("high", 1.0)]);
        assert!(!uniform.resolve().unwrap().is_always_zero());
        let normal = DistributionSpec::with_params("normal", &[("loc", -1.0), ("scale", 1.0)]);
        assert!(!normal.resolve().unwrap().is_always_zero());
    }

    #[test]
    fn test_display() {
        let spec = DistributionSpec::with_params("uniform", &[("low", 2.0), ("high", 4.0)]);
        assert_eq!(spec.to_string(), "uniform(high=4, low=2)");
    }
}
