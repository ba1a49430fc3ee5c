//! Checks that all three executors agree on final aggregate statistics for
//! the same configuration: the oracle-equivalence property of the
//! sequential executor against both parallel protocols.

use std::thread;

use airtraffic_des::config::SimConfig;
use airtraffic_des::executor::nullmsg::NullMsgExecutor;
use airtraffic_des::executor::sequential::SequentialExecutor;
use airtraffic_des::executor::yawns::YawnsExecutor;
use airtraffic_des::logger::NullEventLogger;
use airtraffic_des::lookahead::{DistanceMatrix, LookaheadMatrix};
use airtraffic_des::rng::rng_for_distance_matrix;
use airtraffic_des::stats::Stats;
use airtraffic_des::transport::InProcessTransport;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn config() -> SimConfig {
    SimConfig {
        num_airports: 6,
        num_airplanes: 120,
        num_runways_per_airport: 2,
        max_simulation_time: 2_000,
        seed: 1234,
        ..SimConfig::default()
    }
}

fn distances(cfg: &SimConfig) -> DistanceMatrix {
    let mut rng = rng_for_distance_matrix(cfg.seed);
    DistanceMatrix::generate(cfg, &mut rng)
}

fn run_sequential(cfg: SimConfig, n_lp_for_bootstrap: u32) -> Stats {
    let d = distances(&cfg);
    let mut exec = SequentialExecutor::new(cfg, d, Box::new(NullEventLogger));
    exec.bootstrap(n_lp_for_bootstrap);
    exec.run().unwrap().stats
}

fn run_yawns(cfg: SimConfig, n_lp: u32) -> Stats {
    let d = distances(&cfg);
    let la = LookaheadMatrix::from_distance(&d, &cfg, n_lp);
    let transports = InProcessTransport::build(n_lp);
    let handles: Vec<_> = transports
        .into_iter()
        .map(|t| {
            let d = d.clone();
            let la = la.clone();
            thread::spawn(move || {
                let mut exec = YawnsExecutor::new(cfg, d, la, t, Box::new(NullEventLogger));
                exec.bootstrap();
                exec.run().unwrap()
            })
        })
        .collect();
    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    reports[0].stats
}

fn run_nullmsg(cfg: SimConfig, n_lp: u32) -> Stats {
    let d = distances(&cfg);
    let la = LookaheadMatrix::from_distance(&d, &cfg, n_lp);
    let transports = InProcessTransport::build(n_lp);
    let handles: Vec<_> = transports
        .into_iter()
        .map(|t| {
            let d = d.clone();
            let la = la.clone();
            thread::spawn(move || {
                let mut exec = NullMsgExecutor::new(cfg, d, la, t, Box::new(NullEventLogger));
                exec.bootstrap();
                exec.run().unwrap()
            })
        })
        .collect();
    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    reports[0].stats
}

#[test]
fn sequential_matches_yawns_with_three_lps() {
    let cfg = config();
    let sequential = run_sequential(cfg, 3);
    let yawns = run_yawns(cfg, 3);
    assert_eq!(sequential, yawns);
}

#[test]
fn sequential_matches_nullmsg_with_two_lps() {
    let cfg = config();
    let sequential = run_sequential(cfg, 2);
    let nullmsg = run_nullmsg(cfg, 2);
    assert_eq!(sequential, nullmsg);
}

#[test]
fn yawns_and_nullmsg_agree_at_matching_lp_count() {
    let cfg = config();
    let yawns = run_yawns(cfg, 2);
    let nullmsg = run_nullmsg(cfg, 2);
    assert_eq!(yawns, nullmsg);
}
