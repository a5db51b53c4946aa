//! Factory construction from a configuration
//!
//! Resolves station names into the arena, expands worker groups into
//! individually named workers and checks every distribution against the
//! sampler before the first tick.

use crate::factory::{Allocator, PartRoute, Station, StationRegistry, Worker, WorkerPool};
use crate::sampling::{DistributionSpec, RandomSampler, Sampler};
use crate::simulation::{Factory, SimulationError, SimulationResult};
use crate::types::{FactoryConfig, RouteId, StationId, WorkerId};
use tracing::{debug, info, instrument, warn};

/// Builds a [`Factory`] from a [`FactoryConfig`]
#[derive(Debug, Clone)]
pub struct FactoryBuilder {
    config: FactoryConfig,
}

impl FactoryBuilder {
    /// Create a builder over `config`
    pub fn new(config: FactoryConfig) -> Self {
        Self { config }
    }

    /// Configuration being built
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Build with a [`RandomSampler`] seeded from the configuration
    pub fn build(self) -> SimulationResult<Factory<RandomSampler>> {
        let sampler = RandomSampler::new(self.config.seed);
        self.build_with_sampler(sampler)
    }

    /// Build with a caller-supplied sampler
    #[instrument(skip_all, fields(stations = self.config.stations.len(), part_types = self.config.part_types.len()))]
    pub fn build_with_sampler<S: Sampler>(self, sampler: S) -> SimulationResult<Factory<S>> {
        self.config.validate()?;

        let stations = self.build_stations(&sampler)?;
        let routes = self.build_routes(&stations, &sampler)?;
        let workers = self.build_workers(&stations);

        info!(
            stations = stations.len(),
            routes = routes.len(),
            workers = workers.len(),
            horizon = self.config.simulation_time,
            "factory built"
        );

        Ok(Factory::new(
            stations,
            routes,
            workers,
            self.config.simulation_time,
            sampler,
            Allocator::new(self.config.seed),
        ))
    }

    fn build_stations<S: Sampler>(&self, sampler: &S) -> SimulationResult<StationRegistry> {
        let mut registry = StationRegistry::new();
        for (index, station) in self.config.stations.iter().enumerate() {
            let process_time = DistributionSpec::new(&station.distribution, station.parameters.clone());
            sampler.validate(&process_time).map_err(|error| {
                SimulationError::configuration_error(format!("station {}: {}", station.name, error))
            })?;

            let id = registry.add(Station::new(
                StationId(index),
                &station.name,
                process_time,
                station.buffer_size,
                station.max_parts_in_process,
                station.max_workers_per_part,
            ));
            debug!(station = %station.name, id = %id, "station registered");
        }
        Ok(registry)
    }

    fn build_routes<S: Sampler>(
        &self,
        stations: &StationRegistry,
        sampler: &S,
    ) -> SimulationResult<Vec<PartRoute>> {
        self.config
            .part_types
            .iter()
            .enumerate()
            .map(|(index, part)| {
                let arrival = DistributionSpec::new(
                    &part.part_arrival_distribution,
                    part.part_arrival_parameters.clone(),
                );
                sampler.validate(&arrival).map_err(|error| {
                    SimulationError::configuration_error(format!("part type {}: {}", part.part_name, error))
                })?;

                let sequence = part
                    .process_list
                    .iter()
                    .map(|name| {
                        stations
                            .id_of(name)
                            .ok_or_else(|| SimulationError::UnknownStation(name.clone()))
                    })
                    .collect::<SimulationResult<Vec<StationId>>>()?;

                let route = PartRoute::new(RouteId(index), &part.part_name, arrival, sequence);
                route.check_arrival()?;
                Ok(route)
            })
            .collect()
    }

    fn build_workers(&self, stations: &StationRegistry) -> WorkerPool {
        let mut pool = WorkerPool::new();
        for group in &self.config.workers {
            for skill in &group.skills {
                if stations.id_of(skill).is_none() {
                    warn!(worker = %group.name, skill = %skill, "skill matches no station");
                }
            }
            for n in 0..group.quantity {
                pool.add(Worker::new(WorkerId(0), format!("{}{}", group.name, n), group.skills.iter().cloned()));
            }
        }
        pool
    }
}
