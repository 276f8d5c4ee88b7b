//! Day-count conventions (translates `ql/time/daycounters/*.hpp`).
//!
//! The conventions form a closed set, so they are a `Copy` enum rather than
//! a trait object.

use crate::date::Date;
use ql_core::errors::{Error, Result};
use ql_core::Time;
use std::fmt;
use std::str::FromStr;

/// A day-count convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayCounter {
    /// Actual/360.
    Actual360,
    /// Actual/365 (Fixed).
    Actual365Fixed,
    /// 30/360 (Bond Basis).
    Thirty360,
    /// Actual/Actual (ISDA).
    ActualActualIsda,
}

impl DayCounter {
    /// Name of the convention.
    pub fn name(self) -> &'static str {
        match self {
            DayCounter::Actual360 => "Actual/360",
            DayCounter::Actual365Fixed => "Actual/365 (Fixed)",
            DayCounter::Thirty360 => "30/360 (Bond Basis)",
            DayCounter::ActualActualIsda => "Actual/Actual (ISDA)",
        }
    }

    /// Number of days between `d1` and `d2` under the convention.
    pub fn day_count(self, d1: Date, d2: Date) -> i64 {
        match self {
            DayCounter::Thirty360 => {
                let mut dd1 = i64::from(d1.day_of_month());
                let mut dd2 = i64::from(d2.day_of_month());
                if dd1 == 31 {
                    dd1 = 30;
                }
                if dd2 == 31 && dd1 >= 30 {
                    dd2 = 30;
                }
                360 * i64::from(d2.year() - d1.year())
                    + 30 * (i64::from(d2.month()) - i64::from(d1.month()))
                    + (dd2 - dd1)
            }
            _ => d2 - d1,
        }
    }

    /// Year fraction between `d1` and `d2`.
    pub fn year_fraction(self, d1: Date, d2: Date) -> Time {
        match self {
            DayCounter::Actual360 => (d2 - d1) as Time / 360.0,
            DayCounter::Actual365Fixed => (d2 - d1) as Time / 365.0,
            DayCounter::Thirty360 => self.day_count(d1, d2) as Time / 360.0,
            DayCounter::ActualActualIsda => {
                if d1 > d2 {
                    return -self.year_fraction(d2, d1);
                }
                if d1 == d2 {
                    return 0.0;
                }
                let (y1, y2) = (d1.year(), d2.year());
                let days_in = |y: i32| if Date::is_leap(y) { 366.0 } else { 365.0 };
                if y1 == y2 {
                    return (d2 - d1) as Time / days_in(y1);
                }
                // both boundaries are valid dates for any representable year
                let start_next = Date::from_ymd(y1 + 1, 1, 1).unwrap_or(d2);
                let start_last = Date::from_ymd(y2, 1, 1).unwrap_or(d1);
                (start_next - d1) as Time / days_in(y1)
                    + Time::from(y2 - y1 - 1)
                    + (d2 - start_last) as Time / days_in(y2)
            }
        }
    }
}

impl fmt::Display for DayCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayCounter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "actual360" | "act360" => Ok(DayCounter::Actual360),
            "actual365fixed" | "act365fixed" | "actual365" | "act365" => {
                Ok(DayCounter::Actual365Fixed)
            }
            "thirty360" | "30360" | "30360bondbasis" => Ok(DayCounter::Thirty360),
            "actualactual" | "actualactualisda" | "actact" | "actactisda" => {
                Ok(DayCounter::ActualActualIsda)
            }
            _ => Err(Error::Configuration(format!("unknown day counter '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn actual_conventions() {
        let (d1, d2) = (date(2025, 1, 2), date(2025, 7, 2));
        assert_abs_diff_eq!(DayCounter::Actual360.year_fraction(d1, d2), 181.0 / 360.0);
        assert_abs_diff_eq!(DayCounter::Actual365Fixed.year_fraction(d1, d2), 181.0 / 365.0);
    }

    #[test]
    fn thirty_360_month_ends() {
        let dc = DayCounter::Thirty360;
        assert_eq!(dc.day_count(date(2025, 1, 31), date(2025, 3, 31)), 60);
        assert_eq!(dc.day_count(date(2025, 1, 15), date(2025, 7, 15)), 180);
        assert_abs_diff_eq!(dc.year_fraction(date(2025, 1, 15), date(2026, 1, 15)), 1.0);
    }

    #[test]
    fn actual_actual_isda_spans_years() {
        let dc = DayCounter::ActualActualIsda;
        let yf = dc.year_fraction(date(2023, 11, 1), date(2024, 5, 1));
        assert_abs_diff_eq!(yf, 61.0 / 365.0 + 121.0 / 366.0, epsilon = 1e-14);
        assert_abs_diff_eq!(dc.year_fraction(date(2024, 5, 1), date(2023, 11, 1)), -yf);
    }

    #[test]
    fn parse_names() {
        assert_eq!("Actual/360".parse::<DayCounter>().unwrap(), DayCounter::Actual360);
        assert_eq!("30/360".parse::<DayCounter>().unwrap(), DayCounter::Thirty360);
        assert!("Bus/252".parse::<DayCounter>().is_err());
    }
}
