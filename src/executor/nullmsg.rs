//! Null-message (Chandy-Misra-Bryant) executor (spec §4.6, component C9).
//! Grounded on `main_nullmsg.py`: every LP blocks on `recv_any` whenever any
//! peer channel looks empty, and broadcasts a null message on every peer
//! channel whenever its own clock actually advances.

use std::collections::HashMap;
use std::time::Instant;

use crate::airport::Airport;
use crate::bootstrap::bootstrap_plan;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::event::{Event, EventKind, PriorityQueue};
use crate::lookahead::{DistanceMatrix, LookaheadMatrix};
use crate::logger::EventLogger;
use crate::scheduling::{passes_soft_stop, ScheduleRequest};
use crate::stats::{Report, Stats};
use crate::transport::{decode_event, encode_event, Transport};

use super::{create_owned_airports, dispatch};

pub struct NullMsgExecutor<T: Transport> {
    config: SimConfig,
    distances: DistanceMatrix,
    lookahead: LookaheadMatrix,
    transport: T,
    airports: HashMap<u32, Airport>,
    pq: PriorityQueue,
    /// Count of not-yet-consumed messages buffered per source rank — the
    /// liveness counter `is_any_empty` checks against (spec §4.6).
    incoming_counts: Vec<usize>,
    now: i64,
    logger: Box<dyn EventLogger>,
}

impl<T: Transport> NullMsgExecutor<T> {
    pub fn new(
        config: SimConfig,
        distances: DistanceMatrix,
        lookahead: LookaheadMatrix,
        transport: T,
        logger: Box<dyn EventLogger>,
    ) -> Self {
        assert!(transport.size() >= 2, "the null-message protocol needs at least two LPs to exchange null messages with");
        let airports = create_owned_airports(&config, transport.rank(), transport.size());
        let incoming_counts = vec![0usize; transport.size() as usize];
        NullMsgExecutor { config, distances, lookahead, transport, airports, pq: PriorityQueue::new(), incoming_counts, now: 0, logger }
    }

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
        let event = Event {
            kind: req.kind,
            timestamp: req.timestamp,
            airport_id: Some(req.airport_id),
            source_lp: None,
            seq: 0,
            plane_id: req.plane_id,
        };
        if owner == self.transport.rank() {
            self.pq.schedule(event);
        } else {
            self.transport.send(owner, encode_event(&event, self.transport.rank()));
        }
    }

    fn send_null(&self, dest: u32) {
        let timestamp = self.now + self.lookahead.get(self.transport.rank(), dest);
        let event = Event { kind: EventKind::Null, timestamp, airport_id: None, source_lp: None, seq: 0, plane_id: 0 };
        self.transport.send(dest, encode_event(&event, self.transport.rank()));
    }

    fn broadcast_null(&self) {
        for dest in 0..self.transport.size() {
            if dest != self.transport.rank() {
                self.send_null(dest);
            }
        }
    }

    fn any_incoming_empty(&self) -> bool {
        let rank = self.transport.rank();
        (0..self.transport.size()).filter(|&p| p != rank).any(|p| self.incoming_counts[p as usize] == 0)
    }

    pub fn run(&mut self) -> Result<Report, SimError> {
        tracing::info!(rank = self.transport.rank(), size = self.transport.size(), "null-message run starting");
        self.transport.barrier();
        let start = Instant::now();
        let deadline = self.config.max_simulation_time + 2 * self.config.distance_max;

        while self.now <= deadline {
            if self.now == 0 {
                self.broadcast_null();
            }

            while self.any_incoming_empty() {
                let wire = self.transport.recv_any();
                let event = decode_event(wire)?;
                let source = event.source_lp.expect("events received over the transport always carry source_lp");
                self.incoming_counts[source as usize] += 1;
                self.pq.schedule(event);
            }

            let event = self.pq.pop_min().expect("every channel has at least one buffered message once primed");
            if let Some(source) = event.source_lp {
                if source != self.transport.rank() {
                    self.incoming_counts[source as usize] -= 1;
                }
            }

            let old_now = self.now;
            self.now = self.now.max(event.timestamp);

            if event.kind != EventKind::Null {
                let requests = dispatch(&mut self.airports, &self.distances, self.logger.as_mut(), self.now, &event)?;
                for req in requests {
                    self.schedule(req);
                }
            }

            if self.now > old_now {
                self.broadcast_null();
            }
        }

        self.transport.barrier();
        let elapsed_micros = (start.elapsed().as_secs_f64() * 1_000_000.0).round() as i64;
        let summed_micros = self.transport.all_reduce_sum(&[elapsed_micros]);
        let elapsed_seconds = summed_micros[0] as f64 / self.transport.size() as f64 / 1_000_000.0;

        let local_stats = Stats::from_airports(self.airports.values());
        tracing::debug!(rank = self.transport.rank(), now = self.now, "null-message run past deadline");
        let stats = self.transport.reduce_sum(&local_stats.to_reduce_vec(), 0).map(|v| Stats::from_reduce_vec(&v)).unwrap_or_default();
        Ok(Report { elapsed_seconds, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NullEventLogger;
    use crate::transport::InProcessTransport;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::thread;

    #[test]
    fn two_ranks_converge_to_consistent_totals() {
        let cfg = SimConfig { num_airports: 4, num_airplanes: 40, max_simulation_time: 300, seed: 11, ..SimConfig::default() };
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let distances = DistanceMatrix::generate(&cfg, &mut rng);
        let n_lp = 2;
        let lookahead = LookaheadMatrix::from_distance(&distances, &cfg, n_lp);
        let transports = InProcessTransport::build(n_lp);

        let handles: Vec<_> = transports
            .into_iter()
            .map(|t| {
                let cfg = cfg;
                let distances = distances.clone();
                let lookahead = lookahead.clone();
                thread::spawn(move || {
                    let mut exec = NullMsgExecutor::new(cfg, distances, lookahead, t, Box::new(NullEventLogger));
                    exec.bootstrap();
                    exec.run().unwrap()
                })
            })
            .collect();

        let reports: Vec<Report> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(reports[0].stats.departures, reports[0].stats.landings);
        assert!(reports[0].stats.departures > 0);
        assert_eq!(reports[1].stats, Stats::default());
    }

    #[test]
    #[should_panic(expected = "at least two LPs")]
    fn refuses_a_single_lp() {
        let cfg = SimConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let distances = DistanceMatrix::generate(&cfg, &mut rng);
        let lookahead = LookaheadMatrix::from_distance(&distances, &cfg, 1);
        let transport = InProcessTransport::build(1).into_iter().next().unwrap();
        NullMsgExecutor::new(cfg, distances, lookahead, transport, Box::new(NullEventLogger));
    }
}
