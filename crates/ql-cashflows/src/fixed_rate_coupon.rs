//! Fixed-rate coupons and leg builders.
//!
//! Translates `ql/cashflows/fixedratecoupon.hpp`.

use crate::cashflow::{CashFlow, Leg};
use crate::coupon::Coupon;
use ql_core::{errors::Result, Compounding, Rate, Real};
use ql_time::{BusinessDayConvention, Calendar, Date, DayCounter, Frequency, InterestRate, Schedule};
use std::sync::Arc;

/// A coupon paying a simply-compounded fixed rate.
///
/// Corresponds to `QuantLib::FixedRateCoupon`.
#[derive(Debug, Clone)]
pub struct FixedRateCoupon {
    payment_date: Date,
    nominal: Real,
    rate: InterestRate,
    accrual_start: Date,
    accrual_end: Date,
}

impl FixedRateCoupon {
    /// A coupon accruing `rate` under `day_counter`.
    pub fn new(
        payment_date: Date,
        nominal: Real,
        rate: Rate,
        day_counter: DayCounter,
        accrual_start: Date,
        accrual_end: Date,
    ) -> Self {
        Self {
            payment_date,
            nominal,
            rate: InterestRate::new(rate, day_counter, Compounding::Simple, Frequency::Annual),
            accrual_start,
            accrual_end,
        }
    }

    /// The coupon's `InterestRate`.
    pub fn interest_rate(&self) -> &InterestRate {
        &self.rate
    }
}

impl CashFlow for FixedRateCoupon {
    fn date(&self) -> Date {
        self.payment_date
    }

    fn amount(&self) -> Result<Real> {
        Ok(self.nominal
            * (self
                .rate
                .compound_factor_dates(self.accrual_start, self.accrual_end)?
                - 1.0))
    }

    fn as_coupon(&self) -> Option<&dyn Coupon> {
        Some(self)
    }
}

impl Coupon for FixedRateCoupon {
    fn nominal(&self) -> Real {
        self.nominal
    }

    fn accrual_start_date(&self) -> Date {
        self.accrual_start
    }

    fn accrual_end_date(&self) -> Date {
        self.accrual_end
    }

    fn day_counter(&self) -> DayCounter {
        self.rate.day_counter()
    }

    fn rate(&self) -> Result<Rate> {
        Ok(self.rate.rate())
    }
}

/// The `i`-th entry of a per-period vector, the last one past its end.
pub(crate) fn per_period(values: &[Real], i: usize, default: Real) -> Real {
    values.get(i).or_else(|| values.last()).copied().unwrap_or(default)
}

/// Builds a fixed-rate leg from a schedule.
///
/// Corresponds to `QuantLib::FixedRateLeg`.
#[derive(Debug, Clone)]
pub struct FixedRateLegBuilder<'a> {
    schedule: &'a Schedule,
    notionals: Vec<Real>,
    rates: Vec<Rate>,
    day_counter: DayCounter,
    payment_convention: BusinessDayConvention,
    payment_calendar: Option<Calendar>,
}

impl<'a> FixedRateLegBuilder<'a> {
    /// A unit-notional, zero-rate Actual/365 (Fixed) leg on `schedule`.
    pub fn new(schedule: &'a Schedule) -> Self {
        Self {
            schedule,
            notionals: vec![1.0],
            rates: vec![0.0],
            day_counter: DayCounter::Actual365Fixed,
            payment_convention: BusinessDayConvention::Following,
            payment_calendar: None,
        }
    }

    /// One notional for every period.
    pub fn with_notional(self, notional: Real) -> Self {
        self.with_notionals(vec![notional])
    }

    /// Notionals per period; the last one repeats.
    pub fn with_notionals(mut self, notionals: Vec<Real>) -> Self {
        self.notionals = notionals;
        self
    }

    /// One rate for every period.
    pub fn with_coupon_rate(self, rate: Rate) -> Self {
        self.with_coupon_rates(vec![rate])
    }

    /// Rates per period; the last one repeats.
    pub fn with_coupon_rates(mut self, rates: Vec<Rate>) -> Self {
        self.rates = rates;
        self
    }

    /// Accrual day counter.
    pub fn with_day_counter(mut self, day_counter: DayCounter) -> Self {
        self.day_counter = day_counter;
        self
    }

    /// Convention adjusting accrual end dates into payment dates.
    pub fn with_payment_convention(mut self, convention: BusinessDayConvention) -> Self {
        self.payment_convention = convention;
        self
    }

    /// Calendar for payment dates; defaults to the schedule's dates as they
    /// are.
    pub fn with_payment_calendar(mut self, calendar: Calendar) -> Self {
        self.payment_calendar = Some(calendar);
        self
    }

    /// Build the leg.
    ///
    /// # Errors
    /// A configuration error when the schedule has fewer than two dates or
    /// no notional or rate is given.
    pub fn build(self) -> Result<Leg> {
        ql_core::ensure!(self.schedule.size() >= 2, "fixed leg needs at least two schedule dates");
        ql_core::ensure!(
            !self.notionals.is_empty() && !self.rates.is_empty(),
            "fixed leg needs notionals and coupon rates"
        );
        Ok(self
            .schedule
            .periods()
            .enumerate()
            .map(|(i, (start, end))| {
                let payment = match &self.payment_calendar {
                    Some(calendar) => calendar.adjust(end, self.payment_convention),
                    None => end,
                };
                Arc::new(FixedRateCoupon::new(
                    payment,
                    per_period(&self.notionals, i, 1.0),
                    per_period(&self.rates, i, 0.0),
                    self.day_counter,
                    start,
                    end,
                )) as Arc<dyn CashFlow>
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_time::{Period, ScheduleBuilder, TimeUnit};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn simple_interest() {
        let c = FixedRateCoupon::new(
            date(2025, 7, 15),
            1_000_000.0,
            0.05,
            DayCounter::Actual360,
            date(2025, 1, 15),
            date(2025, 7, 15),
        );
        let tau = 181.0 / 360.0;
        assert_abs_diff_eq!(c.accrual_period(), tau, epsilon = 1e-15);
        assert_abs_diff_eq!(c.amount().unwrap(), 1_000_000.0 * 0.05 * tau, epsilon = 1e-8);
        assert_abs_diff_eq!(
            c.accrued_amount(date(2025, 4, 15)).unwrap(),
            1_000_000.0 * 0.05 * 90.0 / 360.0,
            epsilon = 1e-8
        );
        assert_eq!(c.accrued_amount(date(2025, 1, 1)).unwrap(), 0.0);
    }

    #[test]
    fn leg_repeats_the_last_notional() {
        let schedule = ScheduleBuilder::new(
            date(2025, 1, 15),
            date(2027, 1, 15),
            Period::new(6, TimeUnit::Months),
            Calendar::Null,
        )
        .build()
        .unwrap();
        let leg = FixedRateLegBuilder::new(&schedule)
            .with_notionals(vec![100.0, 50.0])
            .with_coupon_rate(0.04)
            .with_day_counter(DayCounter::Thirty360)
            .build()
            .unwrap();
        assert_eq!(leg.len(), 4);
        let nominals: Vec<Real> = leg.iter().map(|cf| cf.as_coupon().unwrap().nominal()).collect();
        assert_eq!(nominals, vec![100.0, 50.0, 50.0, 50.0]);
        assert_abs_diff_eq!(leg[3].amount().unwrap(), 50.0 * 0.04 * 0.5, epsilon = 1e-12);
    }
}
