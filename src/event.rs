//! Event records and the per-LP priority queue (spec §3, §4.2, component C4).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Event kinds. `Null` only ever appears in the null-message protocol and
/// is never logged (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PlaneArrives,
    PlaneLanded,
    ReadyForTakeoff,
    PlaneDeparts,
    Null,
}

impl EventKind {
    pub fn log_message(self) -> Option<&'static str> {
        match self {
            EventKind::PlaneArrives => Some("Plane arrives at "),
            EventKind::PlaneLanded => Some("Plane landed at "),
            EventKind::ReadyForTakeoff => Some("Plane ready for takeoff from "),
            EventKind::PlaneDeparts => Some("Plane departing from "),
            EventKind::Null => None,
        }
    }
}

/// A scheduled event. `airport_id` is `None` only for `Null` messages
/// (spec §6 wire format: "null messages use `airport_id = -1`").
/// `source_lp` is set only on events that arrived over the transport in a
/// parallel run. `seq` is the stable tie-breaker (spec §4.2) assigned by
/// whichever `PriorityQueue` the event was scheduled into. `plane_id` is
/// an expansion (spec §9) threading a single plane's lifecycle through
/// its chain of events for tracing; it plays no role in ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub timestamp: i64,
    pub airport_id: Option<u32>,
    pub source_lp: Option<u32>,
    pub seq: u64,
    pub plane_id: u64,
}

/// Order key is `(timestamp, seq)` only — two events are never equal
/// unless every other field matches too, but `Ord`/`PartialOrd` must look
/// only at the order key for the heap to behave as spec'd.
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.timestamp, self.seq).cmp(&(other.timestamp, other.seq))
    }
}

/// Min-heap over `Event` ordered by `(timestamp, seq)`, via `Reverse` since
/// `BinaryHeap` is a max-heap.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<std::cmp::Reverse<Event>>,
    next_seq: u64,
}

impl PriorityQueue {
    pub fn new() -> Self {
        PriorityQueue { heap: BinaryHeap::new(), next_seq: 0 }
    }

    /// Assigns the next tie-breaking sequence number and pushes `event`
    /// (whose `seq` field is overwritten) onto the queue.
    pub fn schedule(&mut self, mut event: Event) {
        event.seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(std::cmp::Reverse(event));
    }

    pub fn pop_min(&mut self) -> Option<Event> {
        self.heap.pop().map(|std::cmp::Reverse(e)| e)
    }

    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek().map(|std::cmp::Reverse(e)| e)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
