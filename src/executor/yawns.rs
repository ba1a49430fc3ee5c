//! YAWNS executor (spec §4.6, component C8): barrier-synchronized conservative
//! parallel simulation. Grounded on `main_yawns.py` — `exchange_messages`,
//! `get_lbts`, and the per-iteration loop in `run` all mirror it closely.

use std::collections::HashMap;
use std::time::Instant;

use crate::airport::Airport;
use crate::bootstrap::bootstrap_plan;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::event::{Event, PriorityQueue};
use crate::lookahead::{DistanceMatrix, LookaheadMatrix};
use crate::logger::EventLogger;
use crate::scheduling::{passes_soft_stop, ScheduleRequest};
use crate::stats::{Report, Stats};
use crate::transport::{decode_event, encode_event, Transport};

use super::{create_owned_airports, dispatch};

pub struct YawnsExecutor<T: Transport> {
    config: SimConfig,
    distances: DistanceMatrix,
    lookahead: LookaheadMatrix,
    transport: T,
    airports: HashMap<u32, Airport>,
    pq: PriorityQueue,
    outgoing: Vec<Vec<ScheduleRequest>>,
    now: i64,
    logger: Box<dyn EventLogger>,
}

impl<T: Transport> YawnsExecutor<T> {
    pub fn new(
        config: SimConfig,
        distances: DistanceMatrix,
        lookahead: LookaheadMatrix,
        transport: T,
        logger: Box<dyn EventLogger>,
    ) -> Self {
        let airports = create_owned_airports(&config, transport.rank(), transport.size());
        let outgoing = vec![Vec::new(); transport.size() as usize];
        YawnsExecutor { config, distances, lookahead, transport, airports, pq: PriorityQueue::new(), outgoing, now: 0, logger }
    }

    /// Every rank recomputes the whole plan (a pure function of
    /// `config`/`n_lp`) and keeps only the events it owns — no
    /// communication needed, and every rank's view agrees by construction.
    pub fn bootstrap(&mut self) {
        let rank = self.transport.rank();
        for bootstrap_event in bootstrap_plan(&self.config, self.transport.size()) {
            if bootstrap_event.owner_rank == rank {
                self.schedule(bootstrap_event.request);
            }
        }
    }

    fn schedule(&mut self, req: ScheduleRequest) {
        if !passes_soft_stop(req.kind, self.now, self.config.max_simulation_time) {
            return;
        }
        let owner = self.config.owner(req.airport_id, self.transport.size());
        if owner == self.transport.rank() {
            self.pq.schedule(Event {
                kind: req.kind,
                timestamp: req.timestamp,
                airport_id: Some(req.airport_id),
                source_lp: None,
                seq: 0,
                plane_id: req.plane_id,
            });
        } else {
            self.outgoing[owner as usize].push(req);
        }
    }

    /// Ships everything queued for peers, then blocks until every message
    /// addressed to this rank this round has arrived.
    fn exchange_messages(&mut self) -> Result<(), SimError> {
        let size = self.transport.size();
        let rank = self.transport.rank();
        let outgoing_sizes: Vec<i64> = (0..size).map(|pid| self.outgoing[pid as usize].len() as i64).collect();
        let incoming_sizes = self.transport.all_reduce_sum(&outgoing_sizes);

        for pid in 0..size {
            if pid == rank {
                continue;
            }
            for req in self.outgoing[pid as usize].drain(..) {
                let event = Event {
                    kind: req.kind,
                    timestamp: req.timestamp,
                    airport_id: Some(req.airport_id),
                    source_lp: None,
                    seq: 0,
                    plane_id: req.plane_id,
                };
                self.transport.send(pid, encode_event(&event, rank));
            }
        }

        let expected = incoming_sizes[rank as usize] as usize;
        for _ in 0..expected {
            let wire = self.transport.recv_any();
            let event = decode_event(wire)?;
            self.pq.schedule(event);
        }
        Ok(())
    }

    /// Lower bound on the next timestamp any LP could still causally affect
    /// this one with (spec §4.3): every peer's current clock plus the
    /// lookahead to reach here, minimum over peers.
    fn compute_lbts(&self) -> i64 {
        let size = self.transport.size();
        let rank = self.transport.rank();
        let mut local = vec![0i64; size as usize];
        local[rank as usize] = self.now;
        let clocks = self.transport.all_reduce_sum(&local);

        let mut bound = i64::MAX;
        for q in 0..size {
            if q == rank {
                continue;
            }
            let candidate = clocks[q as usize].saturating_add(self.lookahead.get(rank, q));
            bound = bound.min(candidate);
        }
        bound
    }

    pub fn run(&mut self) -> Result<Report, SimError> {
        tracing::info!(rank = self.transport.rank(), size = self.transport.size(), "yawns run starting");
        self.transport.barrier();
        let start = Instant::now();
        let mut lbts = 0i64;
        let mut iteration = 0u64;
        loop {
            iteration += 1;
            while matches!(self.pq.peek(), Some(event) if event.timestamp <= lbts) {
                let event = self.pq.pop_min().expect("just peeked");
                self.now = event.timestamp;
                let requests = dispatch(&mut self.airports, &self.distances, self.logger.as_mut(), self.now, &event)?;
                for req in requests {
                    self.schedule(req);
                }
            }
            self.now = lbts;

            self.transport.barrier();
            self.exchange_messages()?;
            self.transport.barrier();

            lbts = self.compute_lbts();

            let vote = if self.pq.is_empty() { 1 } else { 0 };
            let votes = self.transport.all_reduce_sum(&[vote]);
            if votes[0] as u32 == self.transport.size() {
                break;
            }
        }
        tracing::debug!(rank = self.transport.rank(), iteration, "yawns reached halt consensus");

        self.transport.barrier();
        let elapsed_micros = (start.elapsed().as_secs_f64() * 1_000_000.0).round() as i64;
        let summed_micros = self.transport.all_reduce_sum(&[elapsed_micros]);
        let elapsed_seconds = summed_micros[0] as f64 / self.transport.size() as f64 / 1_000_000.0;

        let local_stats = Stats::from_airports(self.airports.values());
        let stats = self.transport.reduce_sum(&local_stats.to_reduce_vec(), 0).map(|v| Stats::from_reduce_vec(&v)).unwrap_or_default();
        Ok(Report { elapsed_seconds, stats })
    }
}
