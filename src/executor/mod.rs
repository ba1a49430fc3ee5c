//! Shared executor scaffolding. Each protocol (sequential, YAWNS,
//! null-message) gets its own submodule; this module holds only what's
//! identical across all three: airport construction and the dispatch step.

pub mod nullmsg;
pub mod sequential;
pub mod yawns;

use std::collections::HashMap;

use crate::airport::Airport;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::event::Event;
use crate::lookahead::DistanceMatrix;
use crate::logger::EventLogger;
use crate::scheduling::ScheduleRequest;

/// Creates one `Airport` for every id this rank owns under an `n_lp`-way
/// split (spec §3 "LP ownership").
pub fn create_owned_airports(config: &SimConfig, rank: u32, n_lp: u32) -> HashMap<u32, Airport> {
    config
        .airport_ids_for_rank(rank, n_lp)
        .into_iter()
        .map(|id| (id, Airport::new(id, rank, config.num_airports, config)))
        .collect()
}

/// Looks up the owning airport, writes the trace line, and applies the
/// transition (spec §4.1) — the one piece of per-event logic identical
/// across all three executors.
pub fn dispatch(
    airports: &mut HashMap<u32, Airport>,
    distances: &DistanceMatrix,
    logger: &mut dyn EventLogger,
    now: i64,
    event: &Event,
) -> Result<Vec<ScheduleRequest>, SimError> {
    let airport_id = event
        .airport_id
        .ok_or_else(|| SimError::invariant("cannot dispatch an event with no airport_id"))?;
    let airport = airports
        .get_mut(&airport_id)
        .ok_or_else(|| SimError::invariant(format!("event dispatched for non-owned airport {airport_id}")))?;
    logger.log(event, now, &airport.name)?;
    let requests = airport.handle_event(event, now, distances);
    airport.check_invariants()?;
    Ok(requests)
}
