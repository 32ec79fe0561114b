// BugSleuth - core/accumulator.rs
//
// Two-state stack-trace accumulator. A header opens a record, `at` frames
// extend it, and anything else closes it. Every transition that closes a
// record hands it back to the caller; nothing is flushed implicitly.

use crate::core::model::{LogTimestamp, TraceRecord};

/// Accumulator state. `Open` owns the record being built.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Closed,
    Open(TraceRecord),
}

/// Groups a header line and its consecutive frame lines into one record.
#[derive(Debug, Clone)]
pub struct TraceAccumulator {
    state: State,
    max_frames: usize,
    frames_dropped: u64,
}

impl TraceAccumulator {
    /// `max_frames` caps the frames kept per record (the header is not
    /// counted). Frames past the cap are dropped but keep the record open.
    pub fn new(max_frames: usize) -> Self {
        Self {
            state: State::Closed,
            max_frames,
            frames_dropped: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// Total frames dropped by the cap across all records.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    /// Start a fresh record. A record that was already open is closed first
    /// and returned.
    pub fn start(
        &mut self,
        header: &str,
        line_number: u64,
        timestamp: LogTimestamp,
    ) -> Option<TraceRecord> {
        let previous = self.close();
        self.state = State::Open(TraceRecord::new(header, line_number, timestamp));
        previous
    }

    /// Append a frame to the open record. Returns false if no record is
    /// open, in which case the frame is ignored.
    pub fn push_frame(&mut self, frame: &str) -> bool {
        match &mut self.state {
            State::Open(record) => {
                // fragments[0] is the header
                if record.fragments.len() > self.max_frames {
                    self.frames_dropped += 1;
                } else {
                    record.fragments.push(frame.to_string());
                }
                true
            }
            State::Closed => false,
        }
    }

    /// Close the open record, if any, and return it.
    pub fn close(&mut self) -> Option<TraceRecord> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(record) => Some(record),
            State::Closed => None,
        }
    }

    /// End-of-input flush: returns the record still open, if any.
    pub fn finish(mut self) -> Option<TraceRecord> {
        self.close()
    }
}

impl Default for TraceAccumulator {
    fn default() -> Self {
        Self::new(crate::util::constants::DEFAULT_MAX_TRACE_FRAMES)
    }
}
