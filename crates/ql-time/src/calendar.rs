//! Calendars and date adjustment (translates `ql/time/calendar.hpp`).
//!
//! Holiday tables for real markets are outside the scope of this crate; the
//! available calendars are the null calendar, a weekends-only calendar and a
//! bespoke calendar built from an explicit holiday list.

use crate::business_day_convention::BusinessDayConvention;
use crate::date::Date;
use crate::period::Period;
use crate::time_unit::TimeUnit;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A user-defined holiday list, optionally on top of weekends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BespokeCalendar {
    name: String,
    weekends: bool,
    holidays: BTreeSet<Date>,
}

impl BespokeCalendar {
    /// A bespoke calendar; `weekends` marks Saturdays and Sundays as holidays.
    pub fn new(name: impl Into<String>, weekends: bool, holidays: impl IntoIterator<Item = Date>) -> Self {
        Self {
            name: name.into(),
            weekends,
            holidays: holidays.into_iter().collect(),
        }
    }
}

/// A calendar of business days.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Calendar {
    /// Every day is a business day.
    #[default]
    Null,
    /// Saturdays and Sundays are holidays.
    WeekendsOnly,
    /// A user-defined holiday list.
    Bespoke(Arc<BespokeCalendar>),
}

impl Calendar {
    /// A bespoke calendar with weekends and the given holidays.
    pub fn bespoke(name: impl Into<String>, holidays: impl IntoIterator<Item = Date>) -> Self {
        Calendar::Bespoke(Arc::new(BespokeCalendar::new(name, true, holidays)))
    }

    /// Name of the calendar.
    pub fn name(&self) -> &str {
        match self {
            Calendar::Null => "Null",
            Calendar::WeekendsOnly => "Weekends only",
            Calendar::Bespoke(b) => &b.name,
        }
    }

    /// `true` if `d` is a business day.
    pub fn is_business_day(&self, d: Date) -> bool {
        match self {
            Calendar::Null => true,
            Calendar::WeekendsOnly => !d.is_weekend(),
            Calendar::Bespoke(b) => !(b.weekends && d.is_weekend()) && !b.holidays.contains(&d),
        }
    }

    /// `true` if `d` is not a business day.
    pub fn is_holiday(&self, d: Date) -> bool {
        !self.is_business_day(d)
    }

    /// `true` if `d` is the last business day of its month.
    pub fn is_end_of_month(&self, d: Date) -> bool {
        d.month() != self.adjust(d + 1, BusinessDayConvention::Following).month()
    }

    /// Last business day of `d`'s month.
    pub fn end_of_month(&self, d: Date) -> Date {
        self.adjust(d.end_of_month(), BusinessDayConvention::Preceding)
    }

    /// Roll `d` onto a business day.
    pub fn adjust(&self, d: Date, convention: BusinessDayConvention) -> Date {
        use BusinessDayConvention::*;
        match convention {
            Unadjusted => d,
            Following | ModifiedFollowing => {
                let mut d1 = d;
                while self.is_holiday(d1) {
                    d1 += 1;
                }
                if convention == ModifiedFollowing && d1.month() != d.month() {
                    return self.adjust(d, Preceding);
                }
                d1
            }
            Preceding | ModifiedPreceding => {
                let mut d1 = d;
                while self.is_holiday(d1) {
                    d1 -= 1;
                }
                if convention == ModifiedPreceding && d1.month() != d.month() {
                    return self.adjust(d, Following);
                }
                d1
            }
        }
    }

    /// Move `n` business days (negative moves backwards).  With `n == 0`
    /// the date is adjusted with `Following`.
    pub fn advance_business_days(&self, d: Date, n: i32) -> Date {
        if n == 0 {
            return self.adjust(d, BusinessDayConvention::Following);
        }
        let step: i64 = if n > 0 { 1 } else { -1 };
        let mut remaining = n.unsigned_abs();
        let mut d1 = d;
        while remaining > 0 {
            d1 += step;
            while self.is_holiday(d1) {
                d1 += step;
            }
            remaining -= 1;
        }
        d1
    }

    /// Advance by `n` units.  Day steps count business days; longer steps
    /// move calendar time and then adjust.  With `end_of_month`, a start on
    /// the last business day of a month lands on the last business day of
    /// the target month.
    pub fn advance(
        &self,
        d: Date,
        n: i32,
        unit: TimeUnit,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> Date {
        match unit {
            TimeUnit::Days => self.advance_business_days(d, n),
            TimeUnit::Weeks => self.adjust(d.advance(n, unit), convention),
            TimeUnit::Months | TimeUnit::Years => {
                let d1 = d.advance(n, unit);
                if end_of_month && self.is_end_of_month(d) {
                    self.end_of_month(d1)
                } else {
                    self.adjust(d1, convention)
                }
            }
        }
    }

    /// Advance by a [`Period`].
    pub fn advance_period(
        &self,
        d: Date,
        period: Period,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> Date {
        self.advance(d, period.length, period.unit, convention, end_of_month)
    }

    /// Number of business days in `(from, to]`.
    pub fn business_days_between(&self, from: Date, to: Date) -> i64 {
        let (lo, hi, sign) = if from <= to { (from, to, 1) } else { (to, from, -1) };
        let mut count = 0;
        let mut d = lo + 1;
        while d <= hi {
            if self.is_business_day(d) {
                count += 1;
            }
            d += 1;
        }
        sign * count
    }
}
