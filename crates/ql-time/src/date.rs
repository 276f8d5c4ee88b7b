//! `Date` — a calendar date backed by [`chrono::NaiveDate`]
//! (translates `ql/time/date.hpp`).

use crate::time_unit::TimeUnit;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use ql_core::errors::{Error, Result};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// A calendar date.
///
/// Arithmetic saturates at the limits of the underlying `NaiveDate` range
/// instead of panicking.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Date(NaiveDate);

impl Date {
    /// Latest representable date.
    pub const MAX: Date = Date(NaiveDate::MAX);

    /// Earliest representable date.
    pub const MIN: Date = Date(NaiveDate::MIN);

    /// Construct from year, month (1–12) and day of month.
    ///
    /// # Errors
    /// Returns [`Error::Date`] for a non-existent date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| Error::Date(format!("invalid date {year}-{month:02}-{day:02}")))
    }

    /// Wrap a `chrono` date.
    pub fn from_naive(date: NaiveDate) -> Self {
        Date(date)
    }

    /// The underlying `chrono` date.
    pub fn naive(self) -> NaiveDate {
        self.0
    }

    /// Calendar year.
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Month of year, 1–12.
    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// Day of month, 1–31.
    pub fn day_of_month(self) -> u32 {
        self.0.day()
    }

    /// Day of year, 1–366.
    pub fn day_of_year(self) -> u32 {
        self.0.ordinal()
    }

    /// Day of week.
    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    /// `true` for Saturdays and Sundays.
    pub fn is_weekend(self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// `true` if `year` is a leap year.
    pub fn is_leap(year: i32) -> bool {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }

    /// Last calendar day of this date's month.
    pub fn end_of_month(self) -> Self {
        let first = self.0.with_day(1).unwrap_or(self.0);
        first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .map(Date)
            .unwrap_or(self)
    }

    /// `true` if this is the last calendar day of its month.
    pub fn is_end_of_month(self) -> bool {
        self.end_of_month() == self
    }

    /// Move by `n` units.  Month and year steps clamp to the end of the
    /// target month (31 Jan + 1M = 28/29 Feb).
    pub fn advance(self, n: i32, unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Days => self + i64::from(n),
            TimeUnit::Weeks => self + 7 * i64::from(n),
            TimeUnit::Months => self.add_months(n),
            TimeUnit::Years => self.add_months(n.saturating_mul(12)),
        }
    }

    fn add_months(self, n: i32) -> Self {
        let months = Months::new(n.unsigned_abs());
        let moved = if n >= 0 {
            self.0.checked_add_months(months)
        } else {
            self.0.checked_sub_months(months)
        };
        Date(moved.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN }))
    }

    /// Signed number of calendar days from `self` to `other`.
    pub fn days_until(self, other: Date) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl Add<i64> for Date {
    type Output = Date;

    fn add(self, days: i64) -> Date {
        let moved = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        Date(moved.unwrap_or(if days >= 0 { NaiveDate::MAX } else { NaiveDate::MIN }))
    }
}

impl AddAssign<i64> for Date {
    fn add_assign(&mut self, days: i64) {
        *self = *self + days;
    }
}

impl Sub<i64> for Date {
    type Output = Date;

    fn sub(self, days: i64) -> Date {
        self + (-days)
    }
}

impl SubAssign<i64> for Date {
    fn sub_assign(&mut self, days: i64) {
        *self = *self - days;
    }
}

impl Sub<Date> for Date {
    type Output = i64;

    /// Number of calendar days between two dates.
    fn sub(self, rhs: Date) -> i64 {
        rhs.days_until(self)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Date({self})")
    }
}

impl FromStr for Date {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|e| Error::Date(format!("cannot parse '{s}' as a date: {e}")))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn invalid_date_is_rejected() {
        assert!(matches!(Date::from_ymd(2025, 2, 30), Err(Error::Date(_))));
    }

    #[test]
    fn month_arithmetic_clamps_to_month_end() {
        assert_eq!(date(2024, 1, 31).advance(1, TimeUnit::Months), date(2024, 2, 29));
        assert_eq!(date(2025, 1, 31).advance(1, TimeUnit::Months), date(2025, 2, 28));
        assert_eq!(date(2025, 3, 31).advance(-1, TimeUnit::Months), date(2025, 2, 28));
        assert_eq!(date(2024, 2, 29).advance(1, TimeUnit::Years), date(2025, 2, 28));
    }

    #[test]
    fn day_arithmetic() {
        let d = date(2025, 1, 2);
        assert_eq!(d + 30, date(2025, 2, 1));
        assert_eq!(date(2025, 2, 1) - d, 30);
        assert_eq!(d.advance(2, TimeUnit::Weeks), date(2025, 1, 16));
    }

    #[test]
    fn end_of_month() {
        assert_eq!(date(2024, 2, 10).end_of_month(), date(2024, 2, 29));
        assert!(date(2025, 4, 30).is_end_of_month());
        assert!(!date(2025, 4, 29).is_end_of_month());
    }

    #[test]
    fn display_and_parse() {
        let d = date(2025, 7, 4);
        assert_eq!(d.to_string(), "2025-07-04");
        assert_eq!("2025-07-04".parse::<Date>().unwrap(), d);
        assert!("04/07/2025".parse::<Date>().is_err());
    }
}
