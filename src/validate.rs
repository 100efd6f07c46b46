//! Field validators for dive input.
//!
//! Error messages are client-facing and rendered as-is next to the offending field.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::{
    dive::Dive,
    duration::Duration,
    types::{DATE_LAYOUT, TIME_LAYOUT},
};

/// Longest dive accepted from form input, in minutes.
pub const MAX_DURATION_MINUTES: u64 = 180;

/// Rejected form value; `Display` is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Not a `YYYY-MM-DD` calendar date.
    #[error("Please provide a valid dive date.")]
    InvalidDate,
    /// Not an `hh:mm` time of day.
    #[error("Please provide a valid dive start time.")]
    InvalidTime,
    /// Blank site name.
    #[error("Please provide the name of the dive site.")]
    MissingSite,
    /// Not an integer number of minutes.
    #[error("Please provide a valid duration in minutes.")]
    InvalidDuration,
    /// Outside `1..=180` minutes.
    #[error("Dive duration must be between 1 and 180 minutes.")]
    DurationOutOfRange,
    /// Blank value.
    #[error("Please provide a non-empty value.")]
    Empty,
}

/// Parses a `YYYY-MM-DD` dive date.
pub fn validate_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input, DATE_LAYOUT).map_err(|_| ValidationError::InvalidDate)
}

/// Parses an `hh:mm` start time.
pub fn validate_time(input: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(input, TIME_LAYOUT).map_err(|_| ValidationError::InvalidTime)
}

/// Trims the site name, rejecting a blank one.
pub fn validate_site(input: &str) -> Result<String, ValidationError> {
    match input.trim() {
        "" => Err(ValidationError::MissingSite),
        site => Ok(site.to_string()),
    }
}

/// Parses whole minutes in `1..=MAX_DURATION_MINUTES`.
pub fn validate_duration_minutes(input: &str) -> Result<Duration, ValidationError> {
    let mins: i64 = input
        .parse()
        .map_err(|_| ValidationError::InvalidDuration)?;
    match u64::try_from(mins) {
        Ok(m @ 1..=MAX_DURATION_MINUTES) => Ok(Duration::from_minutes(m)),
        _ => Err(ValidationError::DurationOutOfRange),
    }
}

/// Trims an optional text field, rejecting a blank one.
pub fn validate_non_empty(input: &str) -> Result<String, ValidationError> {
    match input.trim() {
        "" => Err(ValidationError::Empty),
        value => Ok(value.to_string()),
    }
}

/// Form field a [`ValidationError`] is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    /// Dive date.
    Date,
    /// Start time.
    TimeIn,
    /// Site name.
    Site,
    /// Duration in minutes.
    Duration,
}

/// Errors keyed by field, in form order.
pub type FormErrors = BTreeMap<FormField, ValidationError>;

/// Raw "new/edit dive" form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiveForm {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `hh:mm`.
    pub time_in: String,
    /// Site name.
    pub site: String,
    /// Whole minutes.
    pub duration_min: String,
    /// Optional location.
    pub geo: String,
    /// `"true"` when checked.
    pub deco_dive: String,
}

impl DiveForm {
    /// Validates every field and builds a dive, or returns all errors found.
    pub fn build(&self) -> Result<Dive, FormErrors> {
        let mut errors = FormErrors::new();

        let date = validate_date(&self.date)
            .map_err(|e| errors.insert(FormField::Date, e))
            .ok();
        let time_in = validate_time(&self.time_in)
            .map_err(|e| errors.insert(FormField::TimeIn, e))
            .ok();
        let site = validate_site(&self.site)
            .map_err(|e| errors.insert(FormField::Site, e))
            .ok();
        let duration = validate_duration_minutes(&self.duration_min)
            .map_err(|e| errors.insert(FormField::Duration, e))
            .ok();

        let (Some(date), Some(time_in), Some(site), Some(duration)) = (date, time_in, site, duration)
        else {
            return Err(errors);
        };

        let mut dive = Dive::new(date.and_time(time_in));
        let record = dive.record_mut();
        record.site = site;
        record.duration = duration;
        // Optional: an empty value after trimming is accepted.
        record.geo = validate_non_empty(&self.geo).unwrap_or_default();
        record.deco_dive = self.deco_dive == "true";
        Ok(dive)
    }
}
