//! Runtime event stream payloads.

use crate::types::LogSeq;

/// Events emitted by the persistence worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A generation reached disk.
    Persisted {
        /// Sequence written.
        sequence: LogSeq,
    },
    /// A save failed; the in-memory log is unaffected.
    PersistFailed {
        /// Sequence that was being written.
        sequence: LogSeq,
        /// Rendered error.
        reason: String,
    },
}
