//! Calendar-date handling for archive records.
//!
//! Source documents carry dates at mixed precision: a full day, a month,
//! or only a year. This module resolves those partial strings into
//! concrete [`NaiveDate`] values and provides the [`DateRange`] type used
//! for the visible time window and for historic interval bands.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Resolve an archive date string into a concrete calendar date.
///
/// Accepts `YYYY`, `YYYY-MM` and `YYYY-MM-DD`; missing parts snap to the
/// first month/day. Returns `None` for anything else, which downstream
/// stages treat as "no resolvable date" rather than an error.
///
/// # Examples
///
/// ```
/// use btv_rust::models::dates::resolve_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(resolve_date("1905"), NaiveDate::from_ymd_opt(1905, 1, 1));
/// assert_eq!(resolve_date("1905-03"), NaiveDate::from_ymd_opt(1905, 3, 1));
/// assert_eq!(resolve_date("1905-03-02"), NaiveDate::from_ymd_opt(1905, 3, 2));
/// assert_eq!(resolve_date("unknown"), None);
/// ```
pub fn resolve_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut parts = trimmed.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Resolve an optional raw date field.
pub fn resolve_opt(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(resolve_date)
}

/// Days between two dates, negative when `to` precedes `from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// A contiguous calendar interval with inclusive endpoints.
///
/// # Examples
///
/// ```
/// use btv_rust::models::dates::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::from_ymd(1938, 1, 1, 1945, 12, 31);
/// assert!(range.contains(NaiveDate::from_ymd_opt(1940, 6, 1).unwrap()));
/// assert!(!range.contains(NaiveDate::from_ymd_opt(1950, 1, 1).unwrap()));
/// assert_eq!(range.duration_days(), 2921);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, swapping the endpoints if given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Convenience constructor for literal ranges.
    ///
    /// Panics on out-of-range components, so only suitable for constants
    /// and tests with known-valid inputs.
    pub fn from_ymd(y0: i32, m0: u32, d0: u32, y1: i32, m1: u32, d1: u32) -> Self {
        let start = NaiveDate::from_ymd_opt(y0, m0, d0)
            .unwrap_or_else(|| panic!("invalid date {y0}-{m0}-{d0}"));
        let end = NaiveDate::from_ymd_opt(y1, m1, d1)
            .unwrap_or_else(|| panic!("invalid date {y1}-{m1}-{d1}"));
        Self::new(start, end)
    }

    /// Inclusive containment check.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Length of the range in days.
    pub fn duration_days(&self) -> i64 {
        days_between(self.start, self.end)
    }

    /// Clamp a date into the range.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.max(self.start).min(self.end)
    }

    /// Overlapping part of two ranges, if any.
    pub fn intersect(&self, other: DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start <= end {
            Some(DateRange { start, end })
        } else {
            None
        }
    }

    /// Years covered by the range, first to last inclusive.
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.start.year()..=self.end.year()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_full_date() {
        assert_eq!(
            resolve_date("1897-11-30"),
            NaiveDate::from_ymd_opt(1897, 11, 30)
        );
    }

    #[test]
    fn test_resolve_partial_dates() {
        assert_eq!(resolve_date("1897"), NaiveDate::from_ymd_opt(1897, 1, 1));
        assert_eq!(resolve_date("1897-11"), NaiveDate::from_ymd_opt(1897, 11, 1));
        assert_eq!(resolve_date("  1897 "), NaiveDate::from_ymd_opt(1897, 1, 1));
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert_eq!(resolve_date(""), None);
        assert_eq!(resolve_date("ca. 1900"), None);
        assert_eq!(resolve_date("1897-13"), None);
        assert_eq!(resolve_date("1897-02-30"), None);
    }

    #[test]
    fn test_range_normalizes_order() {
        let a = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let range = DateRange::new(a, b);
        assert_eq!(range.start, b);
        assert_eq!(range.end, a);
    }

    #[test]
    fn test_range_intersect() {
        let war = DateRange::from_ymd(1914, 7, 28, 1918, 11, 11);
        let life = DateRange::from_ymd(1890, 1, 1, 1916, 3, 1);
        let overlap = war.intersect(life).unwrap();
        assert_eq!(overlap.start, war.start);
        assert_eq!(overlap.end, life.end);

        let later = DateRange::from_ymd(1960, 1, 1, 1970, 1, 1);
        assert!(war.intersect(later).is_none());
    }

    #[test]
    fn test_days_between_signed() {
        let a = NaiveDate::from_ymd_opt(1938, 3, 12).unwrap();
        let b = NaiveDate::from_ymd_opt(1938, 3, 13).unwrap();
        assert_eq!(days_between(a, b), 1);
        assert_eq!(days_between(b, a), -1);
    }
}
