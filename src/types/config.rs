//! Configuration structures for the production simulator
//!
//! This module contains the factory description loaded from a JSON file, the
//! command line arguments that can override it, and the validation logic that
//! runs before any simulation object is built.

use super::OutputFormat;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "prodsim",
    version = "0.1.0",
    about = "Factory-level production simulator",
    long_about = "Simulates part types arriving at a factory, flowing through ordered process stations with finite buffers, and competing for a shared pool of skilled workers.

EXAMPLES:
    # Run a factory description
    prodsim factory.json

    # Override the horizon and seed
    prodsim factory.json --simulation-time 480 --seed 7

    # Emit the report as JSON
    prodsim factory.json --output-format json

    # Generate a configuration template
    prodsim --print-config > factory.json

    # Validate configuration without running
    prodsim factory.json --dry-run

CONFIGURATION:
    Values given on the command line override the file.
    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Factory description file path (JSON format)
    #[arg(
        help = "Factory description file (JSON format)",
        required_unless_present = "print_config"
    )]
    pub config: Option<String>,

    /// Simulation horizon override
    #[arg(long, help = "Simulation horizon in simulator time units")]
    pub simulation_time: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long, help = "Random seed for reproducible results")]
    pub seed: Option<u64>,

    /// Report output format
    #[arg(
        long,
        default_value = "text",
        help = "Report output format (text or json)"
    )]
    pub output_format: String,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print a sample configuration and exit
    #[arg(long, help = "Print a sample factory description in JSON format and exit")]
    pub print_config: bool,
}

/// One process station in the factory description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationConfig {
    /// Unique station name
    pub name: String,
    /// Process-time distribution name
    pub distribution: String,
    /// Process-time distribution parameters
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    /// Input buffer capacity, `None` for unbounded
    #[serde(default)]
    pub buffer_size: Option<usize>,
    /// Parts that may be processed concurrently
    #[serde(default = "default_max_parts")]
    pub max_parts_in_process: usize,
    /// Cap on workers assisting one part; 0 means the station runs unattended
    #[serde(default = "default_max_workers")]
    pub max_workers_per_part: usize,
}

fn default_max_parts() -> usize {
    1
}

fn default_max_workers() -> usize {
    1
}

/// One part type and its route through the factory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartTypeConfig {
    /// Unique part type name
    pub part_name: String,
    /// Interarrival distribution name
    pub part_arrival_distribution: String,
    /// Interarrival distribution parameters
    #[serde(default)]
    pub part_arrival_parameters: BTreeMap<String, f64>,
    /// Ordered station names
    pub process_list: Vec<String>,
}

/// A group of identically skilled workers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerConfig {
    /// Name prefix; workers are named `name0`, `name1`, ...
    pub name: String,
    /// Station names the workers may service
    #[serde(default)]
    pub skills: Vec<String>,
    /// How many workers to instantiate
    #[serde(default = "default_quantity")]
    pub quantity: usize,
}

fn default_quantity() -> usize {
    1
}

/// Complete factory description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactoryConfig {
    /// Process stations
    #[serde(alias = "processes")]
    pub stations: Vec<StationConfig>,
    /// Part types with their routes
    pub part_types: Vec<PartTypeConfig>,
    /// Worker groups
    #[serde(default)]
    pub workers: Vec<WorkerConfig>,
    /// Simulation horizon
    pub simulation_time: f64,
    /// Random seed for reproducible results
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration path given
    #[error("No factory description file given")]
    MissingConfigPath,

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),

    /// Output format not recognized
    #[error("{0}")]
    InvalidOutputFormat(String),
}

/// Validation errors for a factory description
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// No stations defined
    #[error("Factory must define at least one station")]
    NoStations,

    /// No part types defined
    #[error("Factory must define at least one part type")]
    NoPartTypes,

    /// Two stations share a name
    #[error("Duplicate station name: {0}")]
    DuplicateStation(String),

    /// Two part types share a name
    #[error("Duplicate part type name: {0}")]
    DuplicatePartType(String),

    /// Station cannot process anything
    #[error("Station {0} must allow at least one part in process")]
    InvalidSlotCount(String),

    /// Route visits no station
    #[error("Part type {0} has an empty process list")]
    EmptyProcessList(String),

    /// Route names a station that does not exist
    #[error("Part type {part} references unknown station {station}")]
    UnknownStation {
        /// Part type with the bad reference
        part: String,
        /// The unknown station name
        station: String,
    },

    /// Horizon is not a positive finite number
    #[error("Simulation time must be positive and finite, got {0}")]
    InvalidSimulationTime(f64),
}

impl FactoryConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let path = args.config.as_deref().ok_or(ConfigError::MissingConfigPath)?;
        let mut config = Self::from_file(path)?;

        // CLI takes precedence over the file
        if let Some(value) = args.simulation_time {
            config.simulation_time = value;
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                Self::from_json(&content)
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the factory description
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.stations.is_empty() {
            return Err(ConfigValidationError::NoStations);
        }
        if self.part_types.is_empty() {
            return Err(ConfigValidationError::NoPartTypes);
        }
        if !self.simulation_time.is_finite() || self.simulation_time <= 0.0 {
            return Err(ConfigValidationError::InvalidSimulationTime(self.simulation_time));
        }

        let mut station_names = HashSet::new();
        for station in &self.stations {
            if !station_names.insert(station.name.as_str()) {
                return Err(ConfigValidationError::DuplicateStation(station.name.clone()));
            }
            if station.max_parts_in_process == 0 {
                return Err(ConfigValidationError::InvalidSlotCount(station.name.clone()));
            }
        }

        let mut part_names = HashSet::new();
        for part in &self.part_types {
            if !part_names.insert(part.part_name.as_str()) {
                return Err(ConfigValidationError::DuplicatePartType(part.part_name.clone()));
            }
            if part.process_list.is_empty() {
                return Err(ConfigValidationError::EmptyProcessList(part.part_name.clone()));
            }
            if let Some(missing) =
                part.process_list.iter().find(|name| !station_names.contains(name.as_str()))
            {
                return Err(ConfigValidationError::UnknownStation {
                    part: part.part_name.clone(),
                    station: missing.clone(),
                });
            }
        }

        Ok(())
    }

    /// Total number of workers after expanding every group
    pub fn total_workers(&self) -> usize {
        self.workers.iter().map(|group| group.quantity).sum()
    }

    /// A small two-product factory used as a configuration template
    pub fn sample() -> Self {
        let params = |pairs: &[(&str, f64)]| -> BTreeMap<String, f64> {
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        };

        Self {
            stations: vec![
                StationConfig {
                    name: "cutting".to_string(),
                    distribution: "uniform".to_string(),
                    parameters: params(&[("low", 2.0), ("high", 4.0)]),
                    buffer_size: Some(3),
                    max_parts_in_process: 1,
                    max_workers_per_part: 2,
                },
                StationConfig {
                    name: "welding".to_string(),
                    distribution: "weibull".to_string(),
                    parameters: params(&[("shape", 1.5), ("scale", 3.0)]),
                    buffer_size: Some(2),
                    max_parts_in_process: 2,
                    max_workers_per_part: 1,
                },
                StationConfig {
                    name: "painting".to_string(),
                    distribution: "exponential".to_string(),
                    parameters: params(&[("scale", 2.5)]),
                    buffer_size: None,
                    max_parts_in_process: 1,
                    max_workers_per_part: 2,
                },
                StationConfig {
                    name: "inspection".to_string(),
                    distribution: "constant".to_string(),
                    parameters: params(&[("value", 1.0)]),
                    buffer_size: Some(5),
                    max_parts_in_process: 1,
                    max_workers_per_part: 0,
                },
            ],
            part_types: vec![
                PartTypeConfig {
                    part_name: "bracket".to_string(),
                    part_arrival_distribution: "uniform".to_string(),
                    part_arrival_parameters: params(&[("low", 1.0), ("high", 5.0)]),
                    process_list: vec![
                        "cutting".to_string(),
                        "welding".to_string(),
                        "inspection".to_string(),
                    ],
                },
                PartTypeConfig {
                    part_name: "panel".to_string(),
                    part_arrival_distribution: "exponential".to_string(),
                    part_arrival_parameters: params(&[("scale", 4.0)]),
                    process_list: vec![
                        "cutting".to_string(),
                        "painting".to_string(),
                        "inspection".to_string(),
                    ],
                },
            ],
            workers: vec![
                WorkerConfig {
                    name: "operator".to_string(),
                    skills: vec!["cutting".to_string(), "welding".to_string()],
                    quantity: 2,
                },
                WorkerConfig {
                    name: "painter".to_string(),
                    skills: vec!["painting".to_string()],
                    quantity: 1,
                },
            ],
            simulation_time: 30.0,
            seed: None,
        }
    }
}

impl CliArgs {
    /// Parse the requested report format
    pub fn get_output_format(&self) -> Result<OutputFormat, ConfigError> {
        self.output_format.parse().map_err(ConfigError::InvalidOutputFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_is_valid() {
        let config = FactoryConfig::sample();
        assert!(config.validate().is_ok());
        assert_eq!(config.stations.len(), 4);
        assert_eq!(config.total_workers(), 3);
    }

    #[test]
    fn test_config_parsing_with_defaults() {
        let json = r#"{
            "stations": [
                {"name": "drill", "distribution": "constant", "parameters": {"value": 2.0}}
            ],
            "part_types": [
                {
                    "part_name": "gear",
                    "part_arrival_distribution": "constant",
                    "part_arrival_parameters": {"value": 1.0},
                    "process_list": ["drill"]
                }
            ],
            "simulation_time": 10
        }"#;

        let config = FactoryConfig::from_json(json).unwrap();
        let station = &config.stations[0];
        assert_eq!(station.buffer_size, None);
        assert_eq!(station.max_parts_in_process, 1);
        assert_eq!(station.max_workers_per_part, 1);
        assert!(config.workers.is_empty());
        assert_eq!(config.simulation_time, 10.0);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_processes_alias_accepted() {
        let json = r#"{
            "processes": [
                {"name": "a", "distribution": "constant", "parameters": {"value": 1.0},
                 "buffer_size": 3, "max_parts_in_process": 2, "max_workers_per_part": 1}
            ],
            "part_types": [
                {"part_name": "p", "part_arrival_distribution": "constant",
                 "part_arrival_parameters": {"value": 1.0}, "process_list": ["a"]}
            ],
            "workers": [{"name": "w", "skills": ["a"], "quantity": 4}],
            "simulation_time": 30
        }"#;

        let config = FactoryConfig::from_json(json).unwrap();
        assert_eq!(config.stations[0].buffer_size, Some(3));
        assert_eq!(config.stations[0].max_parts_in_process, 2);
        assert_eq!(config.total_workers(), 4);
    }

    #[test]
    fn test_validation_unknown_station() {
        let mut config = FactoryConfig::sample();
        config.part_types[0].process_list.push("polishing".to_string());

        match config.validate() {
            Err(ConfigValidationError::UnknownStation { part, station }) => {
                assert_eq!(part, "bracket");
                assert_eq!(station, "polishing");
            }
            other => panic!("Expected UnknownStation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_duplicate_station() {
        let mut config = FactoryConfig::sample();
        let copy = config.stations[0].clone();
        config.stations.push(copy);

        match config.validate() {
            Err(ConfigValidationError::DuplicateStation(name)) => assert_eq!(name, "cutting"),
            other => panic!("Expected DuplicateStation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_zero_slots() {
        let mut config = FactoryConfig::sample();
        config.stations[1].max_parts_in_process = 0;

        match config.validate() {
            Err(ConfigValidationError::InvalidSlotCount(name)) => assert_eq!(name, "welding"),
            other => panic!("Expected InvalidSlotCount error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_simulation_time() {
        let mut config = FactoryConfig::sample();
        config.simulation_time = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidSimulationTime(_))
        ));

        config.simulation_time = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidSimulationTime(_))
        ));
    }

    #[test]
    fn test_validation_empty_process_list() {
        let mut config = FactoryConfig::sample();
        config.part_types[1].process_list.clear();

        match config.validate() {
            Err(ConfigValidationError::EmptyProcessList(name)) => assert_eq!(name, "panel"),
            other => panic!("Expected EmptyProcessList error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_file_loading() {
        use std::io::Write;
        use tempfile::Builder;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let json = FactoryConfig::sample().print_json().unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = FactoryConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config, FactoryConfig::sample());
    }

    #[test]
    fn test_unsupported_extension() {
        use tempfile::Builder;

        let temp_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        match FactoryConfig::from_file(temp_file.path()) {
            Err(ConfigError::UnsupportedFormat(ext)) => assert_eq!(ext, "yaml"),
            other => panic!("Expected UnsupportedFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FactoryConfig::from_file("/definitely/not/here.json"),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_cli_overrides() {
        use std::io::Write;
        use tempfile::Builder;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let json = FactoryConfig::sample().print_json().unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let path = temp_file.path().to_str().unwrap().to_string();
        let args = CliArgs::try_parse_from([
            "prodsim",
            path.as_str(),
            "--simulation-time",
            "120",
            "--seed",
            "99",
        ])
        .unwrap();

        let config = FactoryConfig::from_cli_args(&args).unwrap();
        assert_eq!(config.simulation_time, 120.0);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.stations.len(), 4);
    }

    #[test]
    fn test_cli_requires_config_unless_printing() {
        assert!(CliArgs::try_parse_from(["prodsim"]).is_err());
        let args = CliArgs::try_parse_from(["prodsim", "--print-config"]).unwrap();
        assert!(args.print_config);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_cli_output_format() {
        let args = CliArgs::try_parse_from(["prodsim", "f.json", "--output-format", "json"]).unwrap();
        assert_eq!(args.get_output_format().unwrap(), OutputFormat::Json);

        let args = CliArgs::try_parse_from(["prodsim", "f.json", "--output-format", "xml"]).unwrap();
        assert!(matches!(args.get_output_format(), Err(ConfigError::InvalidOutputFormat(_))));
    }
}
