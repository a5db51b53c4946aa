// Production Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/prodsim factory.json
// ```
//
// Or with overrides:
//
// ```console
// $ ./target/release/prodsim factory.json --simulation-time 480 --seed 7 --verbose
// ```

use anyhow::Context;
use clap::Parser;
use prodsim::simulation::{FactoryBuilder, LoggingConfig};
use prodsim::types::config::CliArgs;
use prodsim::types::{FactoryConfig, OutputFormat};
use std::process;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        match FactoryConfig::sample().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize sample configuration: {}", e);
                process::exit(1);
            }
        }
    }

    let logging_result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        LoggingConfig::init_quiet()
    };

    if let Err(e) = logging_result {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> anyhow::Result<()> {
    let output_format = args.get_output_format().context("Invalid command line arguments")?;

    let config = FactoryConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return Ok(());
    }

    print_configuration_summary(&config);

    let mut factory = FactoryBuilder::new(config).build().context("Failed to build factory")?;
    let summary = factory.run().context("Simulation failed")?;
    info!(
        iterations = summary.iterations,
        clock = summary.final_clock,
        termination = %summary.termination,
        "simulation completed"
    );

    let report = factory.report();
    match output_format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json().context("Failed to serialize report")?),
    }
    Ok(())
}

fn print_configuration_summary(config: &FactoryConfig) {
    eprintln!("Configuration:");
    eprintln!("  Stations: {}", config.stations.len());
    eprintln!("  Part Types: {}", config.part_types.len());
    eprintln!("  Workers: {}", config.total_workers());
    eprintln!("  Simulation Time: {}", config.simulation_time);
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    eprintln!();
}
