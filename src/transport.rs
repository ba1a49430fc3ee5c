//! Transport abstraction (spec §4.7, C6) and an in-process implementation
//! sufficient to run and test the parallel protocols without MPI (C15).

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Barrier, Condvar, Mutex};

use crate::event::{Event, EventKind};

/// Wire representation of one event: `(kind, timestamp, airport_id,
/// source_rank, plane_id)`. `airport_id == -1` marks a `Null` message
/// (spec §6). The `plane_id` slot is this crate's extension to the
/// spec's 4-tuple wire format, carrying the causal-tracing id (SPEC_FULL.md
/// §3) across LPs; it is still a fixed-width integer vector as required.
pub type EventWire = [i64; 5];

fn kind_to_i64(kind: EventKind) -> i64 {
    match kind {
        EventKind::PlaneArrives => 1,
        EventKind::PlaneLanded => 2,
        EventKind::ReadyForTakeoff => 3,
        EventKind::PlaneDeparts => 4,
        EventKind::Null => 5,
    }
}

fn kind_from_i64(v: i64) -> Option<EventKind> {
    match v {
        1 => Some(EventKind::PlaneArrives),
        2 => Some(EventKind::PlaneLanded),
        3 => Some(EventKind::ReadyForTakeoff),
        4 => Some(EventKind::PlaneDeparts),
        5 => Some(EventKind::Null),
        _ => None,
    }
}

pub fn encode_event(event: &Event, source_rank: u32) -> EventWire {
    [
        kind_to_i64(event.kind),
        event.timestamp,
        event.airport_id.map(|a| a as i64).unwrap_or(-1),
        source_rank as i64,
        event.plane_id as i64,
    ]
}

pub fn decode_event(wire: EventWire) -> Result<Event, crate::error::SimError> {
    let kind = kind_from_i64(wire[0])
        .ok_or_else(|| crate::error::SimError::transport(format!("malformed event kind {}", wire[0])))?;
    let airport_id = if wire[2] < 0 { None } else { Some(wire[2] as u32) };
    Ok(Event {
        kind,
        timestamp: wire[1],
        airport_id,
        source_lp: Some(wire[3] as u32),
        seq: 0,
        plane_id: wire[4] as u64,
    })
}

/// Abstract process-group operations consumed by the YAWNS and
/// null-message executors (spec §4.7). Implementations may be MPI, TCP
/// with a coordinator, or in-process channels; this crate ships only the
/// latter, since MPI-style transport is explicitly out of scope.
pub trait Transport: Send {
    fn rank(&self) -> u32;
    fn size(&self) -> u32;
    fn barrier(&self);
    fn send(&self, dest: u32, wire: EventWire);
    /// Blocks until a message is available from any source; returns it.
    fn recv_any(&self) -> EventWire;
    /// Every rank calls this with its own contribution and gets back the
    /// elementwise sum across all ranks.
    fn all_reduce_sum(&self, local: &[i64]) -> Vec<i64>;
    /// Every rank calls this with its own contribution; only `root` gets
    /// `Some(sum)` back, everyone else gets `None`. All ranks still block
    /// until the root's contribution has arrived, same as a real
    /// collective.
    fn reduce_sum(&self, local: &[i64], root: u32) -> Option<Vec<i64>>;
}

/// A single barrier-style rendezvous reused for every reduction call made
/// over this transport's lifetime. Safe because the protocols this
/// transport serves make reduction calls in lockstep: every rank reaches
/// each `all_reduce_sum`/`reduce_sum` call site in the same relative order
/// (the two executors have no data-dependent branches around a
/// reduce call), so a simple generation counter disambiguates which call
/// a given contribution belongs to without needing a unique handle per
/// call site.
struct Rendezvous {
    state: Mutex<RendezvousState>,
    cond: Condvar,
}

struct RendezvousState {
    generation: u64,
    arrived: u32,
    contributions: Vec<Vec<i64>>,
    result: Vec<i64>,
}

impl Rendezvous {
    fn new(size: usize) -> Self {
        Rendezvous {
            state: Mutex::new(RendezvousState {
                generation: 0,
                arrived: 0,
                contributions: vec![Vec::new(); size],
                result: Vec::new(),
            }),
            cond: Condvar::new(),
        }
    }

    /// All `size` ranks contribute `local`; everyone gets the elementwise
    /// sum back.
    fn combine_sum(&self, rank: usize, size: usize, local: &[i64]) -> Vec<i64> {
        let mut guard = self.state.lock().unwrap();
        let my_generation = guard.generation;
        guard.contributions[rank] = local.to_vec();
        guard.arrived += 1;
        if guard.arrived as usize == size {
            let len = local.len();
            let mut sum = vec![0i64; len];
            for contribution in &guard.contributions {
                for (i, v) in contribution.iter().enumerate() {
                    sum[i] += v;
                }
            }
            guard.result = sum;
            guard.arrived = 0;
            guard.generation += 1;
            self.cond.notify_all();
        } else {
            while guard.generation == my_generation {
                guard = self.cond.wait(guard).unwrap();
            }
        }
        guard.result.clone()
    }
}

/// `Transport` over OS threads: one `mpsc` channel per rank for inbound
/// messages (any rank may send into it, preserving each sender's relative
/// order, which is all the spec requires of "per-pair FIFO"), a shared
/// `Barrier` for `barrier()`, and a shared `Rendezvous` for the two
/// collectives.
pub struct InProcessTransport {
    rank: u32,
    size: u32,
    senders: Vec<Sender<EventWire>>,
    receiver: Mutex<Receiver<EventWire>>,
    barrier: Arc<Barrier>,
    rendezvous: Arc<Rendezvous>,
}

impl InProcessTransport {
    /// Builds one `InProcessTransport` per rank, wired to each other.
    pub fn build(size: u32) -> Vec<InProcessTransport> {
        assert!(size >= 1);
        let mut senders = Vec::with_capacity(size as usize);
        let mut receivers = Vec::with_capacity(size as usize);
        for _ in 0..size {
            let (tx, rx) = mpsc::channel();
            senders.push(tx);
            receivers.push(rx);
        }
        let barrier = Arc::new(Barrier::new(size as usize));
        let rendezvous = Arc::new(Rendezvous::new(size as usize));
        receivers
            .into_iter()
            .enumerate()
            .map(|(rank, receiver)| InProcessTransport {
                rank: rank as u32,
                size,
                senders: senders.clone(),
                receiver: Mutex::new(receiver),
                barrier: Arc::clone(&barrier),
                rendezvous: Arc::clone(&rendezvous),
            })
            .collect()
    }
}

impl Transport for InProcessTransport {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn barrier(&self) {
        self.barrier.wait();
    }

    fn send(&self, dest: u32, wire: EventWire) {
        // Unbounded channel: matches the spec's "asynchronous, non-blocking
        // send" — the sender never waits for a matching receive to be posted.
        let _ = self.senders[dest as usize].send(wire);
    }

    fn recv_any(&self) -> EventWire {
        self.receiver.lock().unwrap().recv().expect("sender half dropped while a receive was pending")
    }

    fn all_reduce_sum(&self, local: &[i64]) -> Vec<i64> {
        self.rendezvous.combine_sum(self.rank as usize, self.size as usize, local)
    }

    fn reduce_sum(&self, local: &[i64], root: u32) -> Option<Vec<i64>> {
        let sum = self.rendezvous.combine_sum(self.rank as usize, self.size as usize, local);
        if self.rank == root {
            Some(sum)
        } else {
            None
        }
    }
}
