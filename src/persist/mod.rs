pub mod json;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::log::{DiveLog, StoreError},
    record::DiveRecord,
    types::{LOG_MAJOR, LogSeq},
};

/// Failure to load or save the persisted log.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem failure.
    #[error("{context}: {source}")]
    Io {
        /// Step that failed.
        context: &'static str,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid envelope or holds an invalid record field.
    #[error("decode log operation failed: {0}")]
    Decode(#[source] serde_json::Error),
    /// Serializing the envelope failed.
    #[error("encode log operation failed: {0}")]
    Encode(#[source] serde_json::Error),
    /// Bad version tag or modified timestamp.
    #[error("corrupted log file: {0}")]
    Corrupted(String),
    /// The records could not be rebuilt into a log.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The blocking save task panicked or was cancelled.
    #[error("persistence task failed: {0}")]
    Task(String),
}

impl PersistError {
    pub(crate) fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Io { context, source }
    }
}

/// Result alias for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Storage backend driven by the persistence worker.
pub trait LogStore: Send {
    /// Replaces the contents of `log` with the persisted generation.
    fn load(&mut self, log: &mut DiveLog) -> PersistResult<()>;
    /// Writes the current contents of `log`, returning the sequence written.
    fn save(&mut self, log: &mut DiveLog) -> PersistResult<LogSeq>;
}

/// On-disk representation of the whole log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedDiveLog {
    /// `<major>:<sequence>`, see [`LogVersion`].
    pub version: String,
    /// RFC3339 time of the write.
    pub modified: String,
    /// Dive records; order on disk is not significant.
    pub dives: Vec<DiveRecord>,
}

/// Parsed envelope version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogVersion {
    /// Format major version.
    pub major: u32,
    /// Generation number.
    pub sequence: LogSeq,
}

impl LogVersion {
    /// Tag for `sequence` at [`LOG_MAJOR`].
    pub fn current(sequence: LogSeq) -> Self {
        Self {
            major: LOG_MAJOR,
            sequence,
        }
    }
}

impl fmt::Display for LogVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.sequence)
    }
}

impl FromStr for LogVersion {
    type Err = PersistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let corrupted = || PersistError::Corrupted(format!("bad version tag {s:?}"));
        let parts: Vec<&str> = s.split(':').collect();
        let [major, sequence] = parts.as_slice() else {
            return Err(corrupted());
        };
        Ok(Self {
            major: major.parse().map_err(|_| corrupted())?,
            sequence: sequence.parse().map_err(|_| corrupted())?,
        })
    }
}
