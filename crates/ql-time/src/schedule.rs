//! `Schedule` — ordered coupon dates (translates `ql/time/schedule.hpp`).

use crate::business_day_convention::BusinessDayConvention;
use crate::calendar::Calendar;
use crate::date::Date;
use crate::period::Period;
use ql_core::errors::Result;

/// Direction in which a schedule is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateGeneration {
    /// From the termination date backwards; a stub, if any, is at the start.
    #[default]
    Backward,
    /// From the effective date forwards; a stub, if any, is at the end.
    Forward,
}

/// An ordered sequence of adjusted dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    dates: Vec<Date>,
    tenor: Period,
}

impl Schedule {
    /// All dates, first = effective date, last = termination date.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of dates.
    pub fn size(&self) -> usize {
        self.dates.len()
    }

    /// `true` if the schedule has no dates.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The tenor used for generation.
    pub fn tenor(&self) -> Period {
        self.tenor
    }

    /// First date.
    pub fn start_date(&self) -> Option<Date> {
        self.dates.first().copied()
    }

    /// Last date.
    pub fn end_date(&self) -> Option<Date> {
        self.dates.last().copied()
    }

    /// Consecutive `(start, end)` pairs.
    pub fn periods(&self) -> impl Iterator<Item = (Date, Date)> + '_ {
        self.dates.windows(2).map(|w| (w[0], w[1]))
    }

    /// A schedule from explicit dates.
    pub fn from_dates(dates: Vec<Date>, tenor: Period) -> Result<Self> {
        ql_core::ensure!(dates.len() >= 2, "a schedule needs at least two dates");
        ql_core::ensure!(
            dates.windows(2).all(|w| w[0] < w[1]),
            "schedule dates must be strictly increasing"
        );
        Ok(Self { dates, tenor })
    }
}

/// Builder for [`Schedule`] (translates `QuantLib::MakeSchedule`).
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    effective: Date,
    termination: Date,
    tenor: Period,
    calendar: Calendar,
    convention: BusinessDayConvention,
    termination_convention: BusinessDayConvention,
    rule: DateGeneration,
    end_of_month: bool,
}

impl ScheduleBuilder {
    /// Start building a schedule between two dates with the given tenor.
    pub fn new(effective: Date, termination: Date, tenor: Period, calendar: Calendar) -> Self {
        Self {
            effective,
            termination,
            tenor,
            calendar,
            convention: BusinessDayConvention::Following,
            termination_convention: BusinessDayConvention::Following,
            rule: DateGeneration::Backward,
            end_of_month: false,
        }
    }

    /// Convention for all dates but the termination date.
    pub fn with_convention(mut self, c: BusinessDayConvention) -> Self {
        self.convention = c;
        self
    }

    /// Convention for the termination date.
    pub fn with_termination_convention(mut self, c: BusinessDayConvention) -> Self {
        self.termination_convention = c;
        self
    }

    /// Generation direction.
    pub fn with_rule(mut self, rule: DateGeneration) -> Self {
        self.rule = rule;
        self
    }

    /// Apply the end-of-month rule.
    pub fn end_of_month(mut self, flag: bool) -> Self {
        self.end_of_month = flag;
        self
    }

    /// Generate the schedule.
    ///
    /// # Errors
    /// The effective date must precede the termination date and the tenor
    /// must not be negative.
    pub fn build(self) -> Result<Schedule> {
        ql_core::ensure!(
            self.effective < self.termination,
            "effective date {} must precede termination date {}",
            self.effective,
            self.termination
        );
        ql_core::ensure!(self.tenor.length >= 0, "negative tenor {}", self.tenor);

        let mut unadjusted = Vec::new();
        if self.tenor.length == 0 {
            unadjusted.push(self.effective);
            unadjusted.push(self.termination);
        } else {
            let (seed, stop, sign) = match self.rule {
                DateGeneration::Backward => (self.termination, self.effective, -1),
                DateGeneration::Forward => (self.effective, self.termination, 1),
            };
            let eom = self.end_of_month && self.calendar.is_end_of_month(seed);
            unadjusted.push(seed);
            let mut k = 1;
            loop {
                let mut next = seed.advance(sign * k * self.tenor.length, self.tenor.unit);
                if eom {
                    next = next.end_of_month();
                }
                let past = match self.rule {
                    DateGeneration::Backward => next <= stop,
                    DateGeneration::Forward => next >= stop,
                };
                if past {
                    break;
                }
                unadjusted.push(next);
                k += 1;
            }
            unadjusted.push(stop);
            if self.rule == DateGeneration::Backward {
                unadjusted.reverse();
            }
        }

        let last = unadjusted.len() - 1;
        let mut dates: Vec<Date> = unadjusted
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                if i == last {
                    self.calendar.adjust(d, self.termination_convention)
                } else if self.end_of_month && i > 0 && self.calendar.is_end_of_month(d) {
                    self.calendar.end_of_month(d)
                } else {
                    self.calendar.adjust(d, self.convention)
                }
            })
            .collect();
        dates.dedup();
        Schedule::from_dates(dates, self.tenor)
    }
}
