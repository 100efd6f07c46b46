use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, NaiveDateTime, Utc};
use hashbrown::HashMap;
use thiserror::Error;

use crate::{
    dive::{Dive, ReconstructError},
    record::DiveRecord,
    types::{DiveId, LogSeq},
};

/// Rejected mutation or rebuild of a [`DiveLog`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No dive with this id.
    #[error("dive {0} not found")]
    MissingDive(DiveId),
    /// The id, or the start time it derives from, is already taken.
    #[error("dive {0} already exists")]
    AlreadyExists(DiveId),
    /// The dive has no start time.
    #[error("dive has no date and time assigned")]
    Unidentified,
    /// A record of a rebuild batch failed to reconstruct.
    #[error("reconstruction failed: {source} @ /dives/{index}")]
    Reconstruct {
        /// Index of the record in the batch.
        index: usize,
        /// Underlying failure.
        #[source]
        source: ReconstructError,
    },
}

/// Time-ordered index of dives.
///
/// Start times are unique, so ids re-derived from stored records on load never collide.
///
/// Not internally synchronized: share it through
/// [`SharedDiveLog`](crate::core::shared::SharedDiveLog), which hands out read guards for
/// queries and write guards for mutations.
#[derive(Debug, Default)]
pub struct DiveLog {
    dives: HashMap<DiveId, Dive>,
    sorted: Vec<DiveId>,
    renumbered: AtomicBool,
    sequence: LogSeq,
    last_persisted: Option<DateTime<Utc>>,
}

impl DiveLog {
    /// Empty log at sequence 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dives in ascending start-time order.
    pub fn all(&self) -> Vec<&Dive> {
        self.sorted
            .iter()
            .filter_map(|id| self.dives.get(id))
            .collect()
    }

    /// Ids in ascending start-time order.
    pub fn ordered_ids(&self) -> &[DiveId] {
        &self.sorted
    }

    /// Dive with `id`, if present.
    pub fn find(&self, id: &str) -> Option<&Dive> {
        self.dives.get(id)
    }

    /// Number of dives.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// True when the log holds no dives.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Records of every dive, in log order.
    pub fn records(&self) -> Vec<DiveRecord> {
        self.all().into_iter().map(|d| d.record().clone()).collect()
    }

    /// Appends `dive`, then walks it back until its predecessor is not later.
    ///
    /// Cost is proportional to the displacement, since dives are mostly logged in
    /// chronological order.
    pub fn insert(&mut self, mut dive: Dive) -> Result<(), StoreError> {
        let Some(time) = dive.date_time_in() else {
            return Err(StoreError::Unidentified);
        };
        if dive.id().is_empty() {
            return Err(StoreError::Unidentified);
        }
        if self.dives.contains_key(dive.id()) {
            return Err(StoreError::AlreadyExists(dive.id().to_string()));
        }
        if let Some(taken) = self.id_starting_at(time) {
            return Err(StoreError::AlreadyExists(taken.clone()));
        }
        dive.canonicalize_record();

        let id = dive.id().to_string();
        let mut ix = self.sorted.len();
        self.sorted.push(id.clone());

        while ix > 0 {
            let prev_id = &self.sorted[ix - 1];
            let Some(prev) = self.dives.get_mut(prev_id) else {
                break;
            };
            if prev.date_time_in().is_none_or(|prev_time| time >= prev_time) {
                break;
            }
            prev.set_position(Some(ix));
            self.sorted.swap(ix - 1, ix);
            ix -= 1;
        }

        dive.set_position(Some(ix));
        self.dives.insert(id, dive);

        if ix != self.sorted.len() - 1 {
            self.renumbered.store(true, Ordering::Release);
        }
        Ok(())
    }

    /// Removes the dive with `id`, shifting every later dive down one slot.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(removed) = self.dives.remove(id) else {
            return false;
        };
        let Some(ix) = removed
            .position()
            .or_else(|| self.sorted.iter().position(|s| s == id))
        else {
            return true;
        };

        self.sorted.remove(ix);
        for (pos, shifted) in self.sorted.iter().enumerate().skip(ix) {
            if let Some(d) = self.dives.get_mut(shifted) {
                d.set_position(Some(pos));
            }
        }

        if ix != self.sorted.len() {
            self.renumbered.store(true, Ordering::Release);
        }
        true
    }

    /// Replaces the dive `existing_id` with `updated`.
    ///
    /// `updated` keeps the existing id; its own start time decides where it lands. A start
    /// time already held by another dive is rejected and leaves the log unchanged.
    pub fn replace(&mut self, existing_id: &str, mut updated: Dive) -> Result<(), StoreError> {
        if !self.dives.contains_key(existing_id) {
            return Err(StoreError::MissingDive(existing_id.to_string()));
        }
        let Some(time) = updated.date_time_in() else {
            return Err(StoreError::Unidentified);
        };
        if let Some(taken) = self
            .id_starting_at(time)
            .filter(|taken| taken.as_str() != existing_id)
        {
            return Err(StoreError::AlreadyExists(taken.clone()));
        }

        updated.adopt_id(existing_id.to_string());
        updated.set_position(None);
        self.delete(existing_id);
        self.insert(updated)
    }

    /// Returns true once after a mutation displaced existing dives, then false until
    /// the next one.
    pub fn is_renumbered(&self) -> bool {
        self.renumbered
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Rebuilds the whole log from `records`.
    ///
    /// Every record is reconstructed before any state is touched.
    pub fn reconstruct_all(&mut self, records: Vec<DiveRecord>) -> Result<(), StoreError> {
        let mut rebuilt = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let dive =
                Dive::reconstruct(record).map_err(|source| StoreError::Reconstruct { index, source })?;
            rebuilt.push(dive);
        }
        rebuilt.sort_by_key(|d| d.date_time_in());

        let mut dives = HashMap::with_capacity(rebuilt.len());
        let mut sorted = Vec::with_capacity(rebuilt.len());
        for (pos, mut dive) in rebuilt.into_iter().enumerate() {
            let id = dive.id().to_string();
            if dives.contains_key(&id) {
                return Err(StoreError::AlreadyExists(id));
            }
            dive.set_position(Some(pos));
            sorted.push(id.clone());
            dives.insert(id, dive);
        }

        self.dives = dives;
        self.sorted = sorted;
        self.renumbered.store(false, Ordering::Release);
        Ok(())
    }

    /// Id of the dive starting exactly at `time`.
    fn id_starting_at(&self, time: NaiveDateTime) -> Option<&DiveId> {
        let start_of = |id: &DiveId| self.dives.get(id).and_then(Dive::date_time_in);
        let ix = self
            .sorted
            .partition_point(|id| start_of(id).is_some_and(|t| t < time));
        self.sorted
            .get(ix)
            .filter(|id| start_of(*id) == Some(time))
    }

    /// Sequence number the next save will write.
    pub fn sequence(&self) -> LogSeq {
        self.sequence
    }

    /// Time of the last successful save or load.
    pub fn last_persisted(&self) -> Option<DateTime<Utc>> {
        self.last_persisted
    }

    /// Records a completed save of generation `written`.
    pub(crate) fn mark_persisted(&mut self, written: LogSeq, at: DateTime<Utc>) {
        self.sequence = self.sequence.max(written.saturating_add(1));
        self.last_persisted = Some(at);
    }

    /// Restores counters from a loaded generation `loaded`.
    pub(crate) fn restore_persistence(&mut self, loaded: LogSeq, at: DateTime<Utc>) {
        self.sequence = loaded.saturating_add(1);
        self.last_persisted = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("time")
    }

    #[test]
    fn delete_of_unpositioned_dive_clears_both_containers() {
        let mut log = DiveLog::new();
        log.insert(Dive::new(at(9))).expect("insert");
        log.insert(Dive::new(at(10))).expect("insert");
        let id = log.ordered_ids()[0].clone();
        log.dives
            .get_mut(&id)
            .expect("present")
            .set_position(None);

        assert!(log.delete(&id));
        assert_eq!(log.len(), 1);
        assert_eq!(log.dives.len(), 1);
        assert_eq!(log.all()[0].position(), Some(0));
        assert!(log.is_renumbered());
    }
}
