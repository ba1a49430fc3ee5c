//! Per-event textual trace, sharded by LP (spec §6 "Log output", C5).
//!
//! This is distinct from `tracing`-based operational logging (SPEC_FULL.md
//! §2a/C12): this is the simulation's own data output, one line per
//! dispatched event, in the exact wire format callers may assert on.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::SimError;
use crate::event::Event;

pub trait EventLogger: Send {
    fn log(&mut self, event: &Event, now: i64, airport_name: &str) -> Result<(), SimError>;
}

/// Writes `<base_dir>/<name>/output_<rank>.txt`, one line per non-`Null`
/// event: `<timestamp>: <message> <airport_name>`.
pub struct FileEventLogger {
    writer: BufWriter<File>,
}

impl FileEventLogger {
    /// The caller is responsible for creating/clearing `base_dir/name`
    /// once (typically rank 0, before any LP thread starts) — see
    /// `prepare_output_dir`. This mirrors the original's "only rank 0
    /// clears the directory" rule without racing concurrent LP threads.
    pub fn new(base_dir: impl AsRef<Path>, name: &str, rank: u32) -> Result<Self, SimError> {
        let dir = base_dir.as_ref().join(name);
        let path = dir.join(format!("output_{rank}.txt"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SimError::transport(format!("failed to open log file {}: {e}", path.display())))?;
        Ok(FileEventLogger { writer: BufWriter::new(file) })
    }
}

impl EventLogger for FileEventLogger {
    fn log(&mut self, event: &Event, now: i64, airport_name: &str) -> Result<(), SimError> {
        let Some(message) = event.kind.log_message() else {
            return Ok(());
        };
        writeln!(self.writer, "{now}: {message}{airport_name}")
            .map_err(|e| SimError::transport(format!("failed to write log line: {e}")))
    }
}

/// Discards everything; used in tests that don't care about the trace.
#[derive(Default)]
pub struct NullEventLogger;

impl EventLogger for NullEventLogger {
    fn log(&mut self, _event: &Event, _now: i64, _airport_name: &str) -> Result<(), SimError> {
        Ok(())
    }
}

/// Clears and recreates `base_dir/name`. Call once, before spawning LP
/// threads, not per-LP (the original guards this with `if rank == 0`; here
/// there's no race to guard against because it happens before any LP
/// exists).
pub fn prepare_output_dir(base_dir: impl AsRef<Path>, name: &str) -> Result<PathBuf, SimError> {
    let dir = base_dir.as_ref().join(name);
    if dir.exists() {
        std::fs::remove_dir_all(&dir)
            .map_err(|e| SimError::transport(format!("failed to clear log dir {}: {e}", dir.display())))?;
    }
    std::fs::create_dir_all(&dir)
        .map_err(|e| SimError::transport(format!("failed to create log dir {}: {e}", dir.display())))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn writes_expected_line_format() {
        let base = std::env::temp_dir().join(format!("airtraffic-des-logger-{}", std::process::id()));
        prepare_output_dir(&base, "sequential").unwrap();
        let mut logger = FileEventLogger::new(&base, "sequential", 0).unwrap();
        let event = Event { kind: EventKind::PlaneArrives, timestamp: 42, airport_id: Some(3), source_lp: None, seq: 0, plane_id: 0 };
        logger.log(&event, 42, "AIRPORT-3").unwrap();
        drop(logger);

        let contents = std::fs::read_to_string(base.join("sequential").join("output_0.txt")).unwrap();
        assert_eq!(contents, "42: Plane arrives at AIRPORT-3\n");
        std::fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn null_events_are_not_logged() {
        let base = std::env::temp_dir().join(format!("airtraffic-des-logger-null-{}", std::process::id()));
        prepare_output_dir(&base, "nullmsg").unwrap();
        let mut logger = FileEventLogger::new(&base, "nullmsg", 1).unwrap();
        let event = Event { kind: EventKind::Null, timestamp: 1, airport_id: None, source_lp: Some(2), seq: 0, plane_id: 0 };
        logger.log(&event, 1, "").unwrap();
        drop(logger);

        let contents = std::fs::read_to_string(base.join("nullmsg").join("output_1.txt")).unwrap();
        assert!(contents.is_empty());
        std::fs::remove_dir_all(&base).ok();
    }
}
