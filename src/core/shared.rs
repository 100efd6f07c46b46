use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::log::DiveLog;

/// A [`DiveLog`] co-located with the lock that guards it.
///
/// Queries go through [`SharedDiveLog::read`], mutations through [`SharedDiveLog::write`].
/// Holding one guard across a lookup and the mutation that follows makes the pair atomic.
#[derive(Debug, Clone, Default)]
pub struct SharedDiveLog {
    inner: Arc<RwLock<DiveLog>>,
}

impl SharedDiveLog {
    /// Wraps an existing log.
    pub fn new(log: DiveLog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(log)),
        }
    }

    /// Shared guard for queries.
    pub fn read(&self) -> RwLockReadGuard<'_, DiveLog> {
        self.inner.read()
    }

    /// Exclusive guard for mutations.
    pub fn write(&self) -> RwLockWriteGuard<'_, DiveLog> {
        self.inner.write()
    }
}
