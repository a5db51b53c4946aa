//! Error types and handling
//!
//! This module contains the error type shared by the station, route, allocator
//! and engine operations.

use crate::sampling::SamplingError;
use crate::types::{ConfigError, ConfigValidationError};
use thiserror::Error;

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration could not be loaded or resolved
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A distribution could not be sampled
    #[error("Sampling error: {0}")]
    SamplingError(#[from] SamplingError),

    /// Dequeue from an empty input buffer
    #[error("Input buffer of station {station} is empty")]
    EmptyQueue {
        /// Station name
        station: String,
    },

    /// Slot index outside the station's slot range
    #[error("Station {station} has no slot {slot}")]
    InvalidSlot {
        /// Station name
        station: String,
        /// Offending slot index
        slot: usize,
    },

    /// Rescaling a slot to zero workers
    #[error("Cannot rescale slot {slot} of station {station} to zero workers")]
    DivisionByZero {
        /// Station name
        station: String,
        /// Slot index
        slot: usize,
    },

    /// A name or id that resolves to no station
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    /// A report could not be serialized
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigError> for SimulationError {
    fn from(error: ConfigError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create an empty-queue error
    pub fn empty_queue(station: impl Into<String>) -> Self {
        Self::EmptyQueue { station: station.into() }
    }

    /// Create an invalid-slot error
    pub fn invalid_slot(station: impl Into<String>, slot: usize) -> Self {
        Self::InvalidSlot { station: station.into(), slot }
    }

    /// Create a division-by-zero error
    pub fn division_by_zero(station: impl Into<String>, slot: usize) -> Self {
        Self::DivisionByZero { station: station.into(), slot }
    }

    /// Whether the run may neutralize the affected slot and continue
    ///
    /// Internal consistency errors touch a single slot; everything else means
    /// the model itself cannot be evaluated.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::EmptyQueue { .. }
            | SimulationError::InvalidSlot { .. }
            | SimulationError::DivisionByZero { .. } => true,
            SimulationError::ConfigurationError(_)
            | SimulationError::SamplingError(_)
            | SimulationError::UnknownStation(_)
            | SimulationError::SerializationError(_) => false,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::SamplingError(_) => "Sampling",
            SimulationError::EmptyQueue { .. } => "Buffer",
            SimulationError::InvalidSlot { .. } => "Slot",
            SimulationError::DivisionByZero { .. } => "Rescale",
            SimulationError::UnknownStation(_) => "Station Lookup",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = SimulationError::empty_queue("drill");
        assert!(matches!(error, SimulationError::EmptyQueue { .. }));
        assert_eq!(error.to_string(), "Input buffer of station drill is empty");

        let error = SimulationError::invalid_slot("drill", 4);
        assert_eq!(error.to_string(), "Station drill has no slot 4");

        let error = SimulationError::division_by_zero("drill", 0);
        assert_eq!(error.to_string(), "Cannot rescale slot 0 of station drill to zero workers");
    }

    #[test]
    fn test_error_from_sampling() {
        let error: SimulationError = SamplingError::UnknownDistribution("zipf".to_string()).into();
        assert!(matches!(error, SimulationError::SamplingError(_)));
        assert_eq!(error.to_string(), "Sampling error: Unknown distribution: zipf");
    }

    #[test]
    fn test_error_from_serialization() {
        let json_error = serde_json::from_str::<f64>("not a number").unwrap_err();
        let error: SimulationError = json_error.into();
        assert!(matches!(error, SimulationError::SerializationError(_)));
        assert_eq!(error.category(), "Serialization");
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_error_from_validation() {
        let error: SimulationError = ConfigValidationError::NoStations.into();
        assert!(matches!(error, SimulationError::ConfigurationError(_)));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_error_recoverability() {
        assert!(SimulationError::empty_queue("a").is_recoverable());
        assert!(SimulationError::invalid_slot("a", 1).is_recoverable());
        assert!(SimulationError::division_by_zero("a", 1).is_recoverable());
        assert!(!SimulationError::configuration_error("bad").is_recoverable());
        assert!(!SimulationError::UnknownStation("a".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(SimulationError::configuration_error("x").category(), "Configuration");
        assert_eq!(SimulationError::empty_queue("x").category(), "Buffer");
        assert_eq!(SimulationError::invalid_slot("x", 0).category(), "Slot");
        assert_eq!(SimulationError::division_by_zero("x", 0).category(), "Rescale");
    }
}
