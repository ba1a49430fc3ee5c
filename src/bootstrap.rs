//! Bootstrapping of initial events (spec §4.8/§6 "Bootstrap contract", C10).
//!
//! Computed once from `(config, seed, n_lp)` alone, independent of which
//! executor will run it — see DESIGN.md's "bootstrap/executor independence"
//! decision, which is what lets the sequential oracle reproduce a parallel
//! run's per-airport tie-break order exactly.

use rand::Rng;

use crate::config::SimConfig;
use crate::rng::rng_for_rank;
use crate::scheduling::ScheduleRequest;

/// One initial plane: which LP originates it, and the `ReadyForTakeoff`
/// request itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapEvent {
    pub owner_rank: u32,
    pub request: ScheduleRequest,
}

/// Builds the full bootstrap plan across all `n_lp` ranks, rank-major (all
/// of rank 0's planes, in draw order, then all of rank 1's, ...). LP 0
/// takes the remainder of `num_airplanes / n_lp` (spec §6).
pub fn bootstrap_plan(config: &SimConfig, n_lp: u32) -> Vec<BootstrapEvent> {
    let base_count = config.num_airplanes / n_lp;
    let remainder = config.num_airplanes - base_count * n_lp;

    let mut plan = Vec::with_capacity(config.num_airplanes as usize);
    let mut plane_id = 0u64;
    for rank in 0..n_lp {
        let count = if rank == 0 { base_count + remainder } else { base_count };
        let owned = config.airport_ids_for_rank(rank, n_lp);
        if owned.is_empty() {
            continue;
        }
        let mut rng = rng_for_rank(config.seed, rank);
        for _ in 0..count {
            let airport_id = owned[rng.gen_range(0..owned.len())];
            let timestamp = rng.gen_range(0..20);
            plan.push(BootstrapEvent {
                owner_rank: rank,
                request: ScheduleRequest {
                    kind: crate::event::EventKind::ReadyForTakeoff,
                    timestamp,
                    airport_id,
                    plane_id,
                },
            });
            plane_id += 1;
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_remainder_to_rank_zero() {
        let cfg = SimConfig { num_airports: 4, num_airplanes: 10, ..SimConfig::default() };
        let plan = bootstrap_plan(&cfg, 4);
        let rank0 = plan.iter().filter(|e| e.owner_rank == 0).count();
        let rank1 = plan.iter().filter(|e| e.owner_rank == 1).count();
        assert_eq!(rank0, 4); // 10/4 = 2 + remainder 2
        assert_eq!(rank1, 2);
        assert_eq!(plan.len(), 10);
    }

    #[test]
    fn is_deterministic_for_fixed_seed() {
        let cfg = SimConfig { num_airports: 6, num_airplanes: 30, seed: 42, ..SimConfig::default() };
        let a = bootstrap_plan(&cfg, 3);
        let b = bootstrap_plan(&cfg, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn every_plane_lands_on_its_owning_rank_airports() {
        let cfg = SimConfig { num_airports: 6, num_airplanes: 12, ..SimConfig::default() };
        let n_lp = 3;
        let plan = bootstrap_plan(&cfg, n_lp);
        for e in &plan {
            assert_eq!(cfg.owner(e.request.airport_id, n_lp), e.owner_rank);
            assert!(e.request.timestamp < 20);
        }
    }

    #[test]
    fn sequential_plan_matches_concatenation_of_per_rank_plans() {
        // The property DESIGN.md relies on for oracle equivalence: the
        // rank-major plan used by a single-LP (sequential) run is exactly
        // the concatenation of what each individual rank would bootstrap
        // in a parallel run with the same n_lp.
        let cfg = SimConfig { num_airports: 8, num_airplanes: 50, seed: 5, ..SimConfig::default() };
        let n_lp = 4;
        let full = bootstrap_plan(&cfg, n_lp);
        let mut expected = Vec::new();
        for rank in 0..n_lp {
            expected.extend(full.iter().filter(|e| e.owner_rank == rank).cloned());
        }
        assert_eq!(full, expected);
    }
}
