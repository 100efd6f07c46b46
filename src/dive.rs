//! In-memory dive model reconstructed from a [`DiveRecord`].

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::{
    record::DiveRecord,
    types::{DATE_TIME_LAYOUT, DiveId, ID_LAYOUT},
};

/// Failure to rebuild a [`Dive`] from its record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructError {
    /// The start time does not match [`DATE_TIME_LAYOUT`].
    #[error("invalid {field} {value:?}: {source}")]
    InvalidDateTime {
        /// Offending record field.
        field: &'static str,
        /// Raw field value.
        value: String,
        /// Underlying parse failure.
        source: chrono::ParseError,
    },
}

/// A single dive as held by a [`crate::core::log::DiveLog`].
///
/// The id is derived from the start time the first time one is known and never
/// changes afterwards. The position is assigned by the log.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dive {
    id: DiveId,
    position: Option<usize>,
    date_time_in: Option<NaiveDateTime>,
    record: DiveRecord,
}

impl Dive {
    /// Blank dive with no identity, used to back an empty "new dive" form.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a dive starting at `time` with an otherwise default record.
    pub fn new(time: NaiveDateTime) -> Self {
        let mut dive = Self::default();
        dive.set_date_time_and_assign_id(time);
        dive
    }

    /// Rebuilds the derived state of a dive from `record`.
    pub fn reconstruct(record: DiveRecord) -> Result<Self, ReconstructError> {
        let time = NaiveDateTime::parse_from_str(&record.date_time, DATE_TIME_LAYOUT).map_err(
            |source| ReconstructError::InvalidDateTime {
                field: "date_time",
                value: record.date_time.clone(),
                source,
            },
        )?;
        let mut dive = Self {
            record,
            ..Self::default()
        };
        dive.set_date_time_and_assign_id(time);
        Ok(dive)
    }

    /// Assigns the start time and the id derived from it. No-op once an id exists.
    pub fn set_date_time_and_assign_id(&mut self, time: NaiveDateTime) {
        if !self.id.is_empty() {
            return;
        }
        self.date_time_in = Some(time);
        self.record.date_time = time.format(DATE_TIME_LAYOUT).to_string();
        self.id = time.format(ID_LAYOUT).to_string();
    }

    /// Stable identifier, empty until a start time is assigned.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Zero-based index in the log, `None` when not inserted.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Cardinal dive number ("dive #7"), `None` when not inserted.
    pub fn num(&self) -> Option<usize> {
        self.position.map(|p| p + 1)
    }

    /// Parsed start time.
    pub fn date_time_in(&self) -> Option<NaiveDateTime> {
        self.date_time_in
    }

    /// End of the dive: start time plus duration.
    pub fn time_out(&self) -> Option<NaiveDateTime> {
        let duration = chrono::Duration::from_std(self.record.duration.value()).ok()?;
        self.date_time_in?.checked_add_signed(duration)
    }

    /// Underlying record.
    pub fn record(&self) -> &DiveRecord {
        &self.record
    }

    /// Mutable access for a dive that is not yet owned by a log.
    ///
    /// `date_time` is rewritten from the start time when the dive is inserted.
    pub fn record_mut(&mut self) -> &mut DiveRecord {
        &mut self.record
    }

    /// Consumes the dive, returning its record.
    pub fn into_record(self) -> DiveRecord {
        self.record
    }

    /// Brings `record.date_time` back in line with the start time.
    pub(crate) fn canonicalize_record(&mut self) {
        if let Some(time) = self.date_time_in {
            self.record.date_time = time.format(DATE_TIME_LAYOUT).to_string();
        }
    }

    pub(crate) fn set_position(&mut self, position: Option<usize>) {
        self.position = position;
    }

    pub(crate) fn adopt_id(&mut self, id: DiveId) {
        self.id = id;
    }
}
