//! Shared primitive IDs, sequence numbers, and layout constants.

/// Dive identifier derived from the dive start time ([`ID_LAYOUT`]).
pub type DiveId = String;
/// Monotonic persistence generation number.
pub type LogSeq = u64;

/// Canonical `strftime` layout of [`crate::record::DiveRecord::date_time`].
pub const DATE_TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M";
/// URL-safe layout used to derive a [`DiveId`].
pub const ID_LAYOUT: &str = "%Y%m%dT%H%M";
/// Date-only input layout.
pub const DATE_LAYOUT: &str = "%Y-%m-%d";
/// Time-of-day input layout.
pub const TIME_LAYOUT: &str = "%H:%M";

/// Major version written into and expected from the persisted envelope.
pub const LOG_MAJOR: u32 = 1;
