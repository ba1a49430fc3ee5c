//! Shared scheduling helpers used identically by all three executors.

use crate::event::EventKind;

/// What an airport handler asks to have scheduled next. Deliberately
/// decoupled from `Event`: the executor decides whether this lands in its
/// own queue or gets routed to a peer LP, and assigns the `seq` tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub kind: EventKind,
    pub timestamp: i64,
    pub airport_id: u32,
    pub plane_id: u64,
}

/// Soft-stop gate (spec §4.1): refuses only `ReadyForTakeoff` events whose
/// triggering time is past `max_simulation_time`. `PlaneArrives` is never
/// gated here — a plane already in the air lands regardless, matching the
/// original (see DESIGN.md / SPEC_FULL.md §2b).
pub fn passes_soft_stop(kind: EventKind, now: i64, max_simulation_time: i64) -> bool {
    !(kind == EventKind::ReadyForTakeoff && now > max_simulation_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_ready_for_takeoff_past_deadline() {
        assert!(!passes_soft_stop(EventKind::ReadyForTakeoff, 101, 100));
        assert!(passes_soft_stop(EventKind::ReadyForTakeoff, 100, 100));
    }

    #[test]
    fn never_blocks_other_kinds() {
        assert!(passes_soft_stop(EventKind::PlaneArrives, 1_000_000, 100));
        assert!(passes_soft_stop(EventKind::PlaneLanded, 1_000_000, 100));
        assert!(passes_soft_stop(EventKind::PlaneDeparts, 1_000_000, 100));
    }
}
