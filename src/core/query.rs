use chrono::{NaiveDate, NaiveDateTime};

use crate::dive::Dive;

use super::log::DiveLog;

/// Date-range restriction over the dive list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiveFilter {
    /// Keep dives starting strictly before midnight of this date.
    pub before: Option<NaiveDate>,
    /// Keep dives starting strictly after midnight of this date.
    pub after: Option<NaiveDate>,
}

impl DiveFilter {
    /// True when no bound is set.
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }

    /// Whether `dive` falls inside both bounds.
    pub fn matches(&self, dive: &Dive) -> bool {
        let Some(start) = dive.date_time_in() else {
            return false;
        };
        self.before.is_none_or(|d| start < midnight(d))
            && self.after.is_none_or(|d| start > midnight(d))
    }

    /// Dives passing the filter, in log order.
    pub fn apply<'a>(&self, log: &'a DiveLog) -> Vec<&'a Dive> {
        log.all().into_iter().filter(|d| self.matches(d)).collect()
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

/// Returns the zero-based page `page_num` of `items`, or an empty slice when out of range.
pub fn paginate<T>(items: &[T], page_num: usize, page_size: usize) -> &[T] {
    if items.is_empty() || page_size < 1 {
        return &[];
    }
    let Some(start) = page_num.checked_mul(page_size) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
