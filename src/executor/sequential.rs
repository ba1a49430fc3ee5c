//! Sequential executor (spec §4.5, component C7): the oracle every parallel
//! protocol is checked against. Grounded on `main_singlethread.py`, with one
//! deliberate departure — see `bootstrap` below and DESIGN.md's
//! "bootstrap/executor independence" decision.

use std::collections::HashMap;
use std::time::Instant;

use crate::airport::Airport;
use crate::bootstrap::bootstrap_plan;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::event::{Event, EventKind, PriorityQueue};
use crate::lookahead::DistanceMatrix;
use crate::logger::EventLogger;
use crate::scheduling::passes_soft_stop;
use crate::stats::{Report, Stats};

use super::{create_owned_airports, dispatch};

pub struct SequentialExecutor {
    config: SimConfig,
    distances: DistanceMatrix,
    airports: HashMap<u32, Airport>,
    pq: PriorityQueue,
    now: i64,
    logger: Box<dyn EventLogger>,
}

impl SequentialExecutor {
    pub fn new(config: SimConfig, distances: DistanceMatrix, logger: Box<dyn EventLogger>) -> Self {
        let airports = create_owned_airports(&config, 0, 1);
        SequentialExecutor { config, distances, airports, pq: PriorityQueue::new(), now: 0, logger }
    }

    /// Bootstraps from the `n_lp`-way plan, rank-major. `n_lp` only
    /// matters when this run is meant to be checked against a parallel run
    /// with that many LPs; a standalone sequential run passes `1`. Either
    /// way every event in the plan targets an airport this executor owns,
    /// since it owns all of them.
    pub fn bootstrap(&mut self, n_lp: u32) {
        for bootstrap_event in bootstrap_plan(&self.config, n_lp.max(1)) {
            self.schedule(
                bootstrap_event.request.kind,
                bootstrap_event.request.timestamp,
                bootstrap_event.request.airport_id,
                bootstrap_event.request.plane_id,
            );
        }
    }

    fn schedule(&mut self, kind: EventKind, timestamp: i64, airport_id: u32, plane_id: u64) {
        if !passes_soft_stop(kind, self.now, self.config.max_simulation_time) {
            return;
        }
        self.pq.schedule(Event { kind, timestamp, airport_id: Some(airport_id), source_lp: None, seq: 0, plane_id });
    }

    pub fn run(&mut self) -> Result<Report, SimError> {
        tracing::info!(num_airports = self.airports.len(), "sequential run starting");
        let start = Instant::now();
        while let Some(event) = self.pq.pop_min() {
            self.now = event.timestamp;
            let requests = dispatch(&mut self.airports, &self.distances, self.logger.as_mut(), self.now, &event)?;
            for req in requests {
                self.schedule(req.kind, req.timestamp, req.airport_id, req.plane_id);
            }
        }
        let elapsed_seconds = start.elapsed().as_secs_f64();
        let stats = Stats::from_airports(self.airports.values());
        tracing::info!(landings = stats.landings, departures = stats.departures, "sequential run finished");
        Ok(Report { elapsed_seconds, stats })
    }
}
