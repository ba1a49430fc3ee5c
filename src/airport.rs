//! Per-airport state machine (spec §4.1, component C3).

use std::collections::VecDeque;

use rand::rngs::StdRng;

use crate::config::SimConfig;
use crate::event::{Event, EventKind};
use crate::lookahead::DistanceMatrix;
use crate::rng::{rng_for_airport, DestinationRng};
use crate::scheduling::ScheduleRequest;

#[derive(Debug)]
pub struct Airport {
    pub id: u32,
    pub name: String,
    pub owner_lp: u32,
    capacity: u32,
    num_airports: u32,
    runway_time_to_land: i64,
    required_time_on_ground: i64,
    runway_time_to_takeoff: i64,

    pub runways_in_use: u32,
    pub landings: u64,
    pub departures: u64,
    pub waiting_to_land_count: u64,
    pub waiting_to_depart_count: u64,
    pub total_wait_land: i64,
    pub total_wait_depart: i64,

    landing_wait: VecDeque<Event>,
    takeoff_wait: VecDeque<Event>,

    rng: StdRng,
}

impl Airport {
    pub fn new(id: u32, owner_lp: u32, num_airports: u32, config: &SimConfig) -> Self {
        Airport {
            id,
            name: format!("AIRPORT-{id}"),
            owner_lp,
            capacity: config.num_runways_per_airport,
            num_airports,
            runway_time_to_land: config.runway_time_to_land,
            required_time_on_ground: config.required_time_on_ground,
            runway_time_to_takeoff: config.runway_time_to_takeoff,
            runways_in_use: 0,
            landings: 0,
            departures: 0,
            waiting_to_land_count: 0,
            waiting_to_depart_count: 0,
            total_wait_land: 0,
            total_wait_depart: 0,
            landing_wait: VecDeque::new(),
            takeoff_wait: VecDeque::new(),
            rng: rng_for_airport(config.seed, id),
        }
    }

    /// Invariant check (spec §3): `0 <= runways_in_use <= capacity` and the
    /// waiting counters agree with the actual queue lengths.
    pub fn check_invariants(&self) -> Result<(), crate::error::SimError> {
        if self.runways_in_use > self.capacity {
            return Err(crate::error::SimError::invariant(format!(
                "airport {}: runways_in_use {} exceeds capacity {}",
                self.id, self.runways_in_use, self.capacity
            )));
        }
        if self.waiting_to_land_count as usize != self.landing_wait.len() {
            return Err(crate::error::SimError::invariant(format!(
                "airport {}: waiting_to_land_count mismatch",
                self.id
            )));
        }
        if self.waiting_to_depart_count as usize != self.takeoff_wait.len() {
            return Err(crate::error::SimError::invariant(format!(
                "airport {}: waiting_to_depart_count mismatch",
                self.id
            )));
        }
        Ok(())
    }

    /// Applies one event transition, returning the follow-on events to
    /// schedule. `now` is the dispatching executor's current simulated
    /// time, which always equals `event.timestamp`.
    pub fn handle_event(
        &mut self,
        event: &Event,
        now: i64,
        distances: &DistanceMatrix,
    ) -> Vec<ScheduleRequest> {
        let mut out = Vec::new();
        match event.kind {
            EventKind::PlaneArrives => {
                if self.runways_in_use < self.capacity {
                    self.runways_in_use += 1;
                    out.push(ScheduleRequest {
                        kind: EventKind::PlaneLanded,
                        timestamp: now + self.runway_time_to_land,
                        airport_id: self.id,
                        plane_id: event.plane_id,
                    });
                } else {
                    self.waiting_to_land_count += 1;
                    self.landing_wait.push_back(*event);
                }
            }
            EventKind::PlaneLanded => {
                self.landings += 1;
                self.runways_in_use -= 1;
                out.push(ScheduleRequest {
                    kind: EventKind::ReadyForTakeoff,
                    timestamp: now + self.required_time_on_ground,
                    airport_id: self.id,
                    plane_id: event.plane_id,
                });
                self.release_runway(now, &mut out);
            }
            EventKind::ReadyForTakeoff => {
                if self.runways_in_use < self.capacity {
                    self.runways_in_use += 1;
                    out.push(ScheduleRequest {
                        kind: EventKind::PlaneDeparts,
                        timestamp: now + self.runway_time_to_takeoff,
                        airport_id: self.id,
                        plane_id: event.plane_id,
                    });
                } else {
                    self.waiting_to_depart_count += 1;
                    self.takeoff_wait.push_back(*event);
                }
            }
            EventKind::PlaneDeparts => {
                self.departures += 1;
                self.runways_in_use -= 1;
                let dest = self.rng.choose_destination(self.id, self.num_airports);
                let travel_time = distances.get(self.id, dest);
                out.push(ScheduleRequest {
                    kind: EventKind::PlaneArrives,
                    timestamp: now + travel_time,
                    airport_id: dest,
                    plane_id: event.plane_id,
                });
                self.release_runway(now, &mut out);
            }
            EventKind::Null => {}
        }
        out
    }

    /// Runway release policy (spec §4.1): landings preferred over
    /// departures, and only one queued plane drains per freed runway.
    fn release_runway(&mut self, now: i64, out: &mut Vec<ScheduleRequest>) {
        if let Some(pending) = self.landing_wait.pop_front() {
            self.waiting_to_land_count -= 1;
            self.runways_in_use += 1;
            self.total_wait_land += now - pending.timestamp;
            out.push(ScheduleRequest {
                kind: EventKind::PlaneLanded,
                timestamp: now + self.runway_time_to_land,
                airport_id: self.id,
                plane_id: pending.plane_id,
            });
        } else if let Some(pending) = self.takeoff_wait.pop_front() {
            self.waiting_to_depart_count -= 1;
            self.runways_in_use += 1;
            self.total_wait_depart += now - pending.timestamp;
            out.push(ScheduleRequest {
                kind: EventKind::PlaneDeparts,
                timestamp: now + self.runway_time_to_takeoff,
                airport_id: self.id,
                plane_id: pending.plane_id,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn distances(n: u32, d: i64) -> DistanceMatrix {
        let cfg = SimConfig { num_airports: n, distance_min: d, distance_max: d, ..SimConfig::default() };
        let mut rng = StdRng::seed_from_u64(1);
        DistanceMatrix::generate(&cfg, &mut rng)
    }

    fn arrives(now: i64, airport: u32, plane_id: u64) -> Event {
        Event { kind: EventKind::PlaneArrives, timestamp: now, airport_id: Some(airport), source_lp: None, seq: 0, plane_id }
    }

    #[test]
    fn arrival_takes_a_runway_when_free() {
        let cfg = SimConfig { num_airports: 2, num_runways_per_airport: 1, runway_time_to_land: 10, ..SimConfig::default() };
        let mut airport = Airport::new(0, 0, 2, &cfg);
        let d = distances(2, 100);
        let reqs = airport.handle_event(&arrives(5, 0, 1), 5, &d);
        assert_eq!(airport.runways_in_use, 1);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].kind, EventKind::PlaneLanded);
        assert_eq!(reqs[0].timestamp, 15);
        airport.check_invariants().unwrap();
    }

    #[test]
    fn arrival_queues_when_runway_busy() {
        let cfg = SimConfig { num_airports: 2, num_runways_per_airport: 1, ..SimConfig::default() };
        let mut airport = Airport::new(0, 0, 2, &cfg);
        let d = distances(2, 100);
        airport.handle_event(&arrives(0, 0, 1), 0, &d);
        let reqs = airport.handle_event(&arrives(1, 0, 2), 1, &d);
        assert!(reqs.is_empty());
        assert_eq!(airport.waiting_to_land_count, 1);
        airport.check_invariants().unwrap();
    }

    #[test]
    fn release_prefers_landing_over_departure() {
        let cfg = SimConfig {
            num_airports: 2,
            num_runways_per_airport: 1,
            runway_time_to_land: 5,
            runway_time_to_takeoff: 5,
            ..SimConfig::default()
        };
        let mut airport = Airport::new(0, 0, 2, &cfg);
        let d = distances(2, 100);

        // Occupy the only runway with a plane on the ground ready to land.
        airport.handle_event(&arrives(0, 0, 1), 0, &d);
        // A second plane queues to land, a third queues to take off.
        airport.handle_event(&arrives(1, 0, 2), 1, &d);
        let takeoff_event = Event { kind: EventKind::ReadyForTakeoff, timestamp: 1, airport_id: Some(0), source_lp: None, seq: 0, plane_id: 3 };
        airport.handle_event(&takeoff_event, 1, &d);
        assert_eq!(airport.waiting_to_land_count, 1);
        assert_eq!(airport.waiting_to_depart_count, 1);

        // Landing of plane 1 frees the runway; the queued landing (plane 2)
        // must be drained before the queued takeoff (plane 3).
        let landed = Event { kind: EventKind::PlaneLanded, timestamp: 5, airport_id: Some(0), source_lp: None, seq: 0, plane_id: 1 };
        let reqs = airport.handle_event(&landed, 5, &d);
        let release = reqs.iter().find(|r| r.plane_id != 1).expect("a release request");
        assert_eq!(release.kind, EventKind::PlaneLanded);
        assert_eq!(release.plane_id, 2);
        assert_eq!(airport.waiting_to_land_count, 0);
        assert_eq!(airport.waiting_to_depart_count, 1);
        airport.check_invariants().unwrap();
    }

    #[test]
    fn departure_never_picks_self_as_destination() {
        let cfg = SimConfig { num_airports: 3, num_runways_per_airport: 1, ..SimConfig::default() };
        let mut airport = Airport::new(1, 0, 3, &cfg);
        let d = distances(3, 50);
        let ready = Event { kind: EventKind::ReadyForTakeoff, timestamp: 0, airport_id: Some(1), source_lp: None, seq: 0, plane_id: 9 };
        airport.handle_event(&ready, 0, &d);
        let departs = Event { kind: EventKind::PlaneDeparts, timestamp: 1, airport_id: Some(1), source_lp: None, seq: 0, plane_id: 9 };
        let reqs = airport.handle_event(&departs, 1, &d);
        let arrival = reqs.iter().find(|r| r.kind == EventKind::PlaneArrives).unwrap();
        assert_ne!(arrival.airport_id, 1);
    }
}
