//! Simulation configuration (spec §6, component C1/C13).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// All parameters a run needs. Loadable from a JSON profile or built in
/// code (tests construct one directly rather than going through a file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimConfig {
    pub num_runways_per_airport: u32,
    pub num_airports: u32,
    pub num_airplanes: u32,
    pub distance_min: i64,
    pub distance_max: i64,
    pub runway_time_to_land: i64,
    pub required_time_on_ground: i64,
    pub runway_time_to_takeoff: i64,
    pub seed: u64,
    pub max_simulation_time: i64,
}

impl Default for SimConfig {
    /// Mirrors the defaults in the original `airport_conf.py`.
    fn default() -> Self {
        SimConfig {
            num_runways_per_airport: 5,
            num_airports: 3,
            num_airplanes: 1000,
            distance_min: 600,
            distance_max: 4000,
            runway_time_to_land: 30,
            required_time_on_ground: 100,
            runway_time_to_takeoff: 30,
            seed: 1,
            max_simulation_time: 100_000,
        }
    }
}

impl SimConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config JSON: {}", path.display()))?;
        Ok(config)
    }

    /// Validates the configuration-error taxonomy in spec §7. Must be
    /// called (and pass) before any executor is constructed.
    pub fn validate(&self, n_lp: u32) -> Result<(), SimError> {
        if n_lp == 0 {
            return Err(SimError::config("number of logical processes must be >= 1"));
        }
        if self.num_airports < n_lp {
            return Err(SimError::config(format!(
                "num_airports ({}) must be >= number of LPs ({})",
                self.num_airports, n_lp
            )));
        }
        if self.num_airports < 2 {
            return Err(SimError::config("num_airports must be >= 2 (a plane needs a destination)"));
        }
        if self.num_runways_per_airport == 0 {
            return Err(SimError::config("num_runways_per_airport must be >= 1"));
        }
        if self.distance_min > self.distance_max {
            return Err(SimError::config("distance_min must be <= distance_max"));
        }
        if self.distance_min <= 0 {
            return Err(SimError::config("distance_min must be > 0 (lookahead requires positive distances)"));
        }
        for (name, value) in [
            ("runway_time_to_land", self.runway_time_to_land),
            ("required_time_on_ground", self.required_time_on_ground),
            ("runway_time_to_takeoff", self.runway_time_to_takeoff),
        ] {
            if value <= 0 {
                return Err(SimError::config(format!("{name} must be > 0")));
            }
        }
        if self.max_simulation_time <= 0 {
            return Err(SimError::config("max_simulation_time must be > 0"));
        }
        Ok(())
    }

    /// Number of airports owned by each LP (the last LP may own fewer).
    pub fn airports_per_process(&self, n_lp: u32) -> u32 {
        (self.num_airports + n_lp - 1) / n_lp
    }

    pub fn owner(&self, airport_id: u32, n_lp: u32) -> u32 {
        airport_id / self.airports_per_process(n_lp)
    }

    pub fn airport_ids_for_rank(&self, rank: u32, n_lp: u32) -> Vec<u32> {
        (0..self.num_airports)
            .filter(|&id| self.owner(id, n_lp) == rank)
            .collect()
    }
}
