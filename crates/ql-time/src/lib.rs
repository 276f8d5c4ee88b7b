//! # ql-time
//!
//! Dates, periods, calendars, day counters, schedules and interest-rate
//! conventions.  Dates are backed by `chrono`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Business-day adjustment conventions.
pub mod business_day_convention;

/// Calendars (null, weekends-only, bespoke) and date adjustment.
pub mod calendar;

/// `Date` type.
pub mod date;

/// Day-count conventions.
pub mod day_counter;

/// Payment / event frequency.
pub mod frequency;

/// `InterestRate` — rate plus compounding and day-count conventions.
pub mod interest_rate;

/// `Period` — a time span in a `TimeUnit`.
pub mod period;

/// `Schedule` — an ordered sequence of dates.
pub mod schedule;

/// `TimeUnit` — days, weeks, months, years.
pub mod time_unit;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use business_day_convention::BusinessDayConvention;
pub use calendar::{BespokeCalendar, Calendar};
pub use chrono::Weekday;
pub use date::Date;
pub use day_counter::DayCounter;
pub use frequency::Frequency;
pub use interest_rate::InterestRate;
pub use period::Period;
pub use schedule::{DateGeneration, Schedule, ScheduleBuilder};
pub use time_unit::TimeUnit;
