//! Ibor coupons and leg builders.
//!
//! Translates `ql/cashflows/iborcoupon.hpp` and the par-coupon branch of
//! `ql/cashflows/couponpricer.cpp`.
//!
//! A coupon's fixing is taken from the index's fixing store when one is
//! recorded; otherwise it is forecast as the simple forward rate over the
//! coupon's own accrual dates.

use crate::cashflow::{CashFlow, Leg};
use crate::coupon::Coupon;
use crate::fixed_rate_coupon::per_period;
use ql_core::{
    errors::{Error, Result},
    Natural, Rate, Real, Spread,
};
use ql_indexes::{IborIndex, Index};
use ql_termstructures::YieldTermStructure;
use ql_time::{BusinessDayConvention, Calendar, Date, DayCounter, Schedule};
use std::sync::Arc;

/// A coupon paying `gearing · fixing + spread` on an Ibor index.
///
/// Corresponds to `QuantLib::IborCoupon`.
#[derive(Debug, Clone)]
pub struct IborCoupon {
    payment_date: Date,
    nominal: Real,
    accrual_start: Date,
    accrual_end: Date,
    fixing_date: Date,
    index: Arc<IborIndex>,
    gearing: Real,
    spread: Spread,
    day_counter: DayCounter,
}

impl IborCoupon {
    /// A coupon fixing `fixing_days` business days before its accrual start.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        payment_date: Date,
        nominal: Real,
        accrual_start: Date,
        accrual_end: Date,
        fixing_days: Natural,
        index: Arc<IborIndex>,
        gearing: Real,
        spread: Spread,
        day_counter: DayCounter,
    ) -> Self {
        let fixing_date = index
            .fixing_calendar()
            .advance_business_days(accrual_start, -(fixing_days as i32));
        Self {
            payment_date,
            nominal,
            accrual_start,
            accrual_end,
            fixing_date,
            index,
            gearing,
            spread,
            day_counter,
        }
    }

    /// The same coupon with another spread.
    pub fn with_spread(&self, spread: Spread) -> Self {
        Self { spread, ..self.clone() }
    }

    /// The underlying index.
    pub fn index(&self) -> &Arc<IborIndex> {
        &self.index
    }

    /// Fixing date.
    pub fn fixing_date(&self) -> Date {
        self.fixing_date
    }

    /// Multiplier on the fixing.
    pub fn gearing(&self) -> Real {
        self.gearing
    }

    /// Additive spread.
    pub fn spread(&self) -> Spread {
        self.spread
    }

    /// The index fixing, forecast from `forwarding` or, without one, from
    /// the index's own forwarding curve.
    ///
    /// # Errors
    /// A configuration error for a past fixing missing from the store;
    /// [`Error::MissingCurve`] when there is no curve to forecast from.
    pub fn index_fixing(&self, forwarding: Option<&dyn YieldTermStructure>) -> Result<Rate> {
        if let Some(fixing) = self.index.fixing_store().get(self.fixing_date) {
            return Ok(fixing);
        }
        let curve = match forwarding {
            Some(curve) => curve,
            None => self
                .index
                .forwarding_curve()
                .map(|c| c.as_ref() as &dyn YieldTermStructure)
                .ok_or_else(|| Error::MissingCurve {
                    curve: format!("{} forwarding", self.index.name()),
                    date: self.fixing_date.to_string(),
                })?,
        };
        ql_core::ensure!(
            self.fixing_date >= curve.reference_date(),
            "missing {} fixing for {}",
            self.index.name(),
            self.fixing_date
        );
        self.index
            .forecast_fixing_on(curve, self.accrual_start, self.accrual_end)
    }

    fn rate_with(&self, forwarding: Option<&dyn YieldTermStructure>) -> Result<Rate> {
        Ok(self.gearing * self.index_fixing(forwarding)? + self.spread)
    }
}

impl CashFlow for IborCoupon {
    fn date(&self) -> Date {
        self.payment_date
    }

    fn amount(&self) -> Result<Real> {
        Ok(self.nominal * self.rate_with(None)? * self.accrual_period())
    }

    fn amount_on(&self, forwarding: &dyn YieldTermStructure) -> Result<Real> {
        Ok(self.nominal * self.rate_with(Some(forwarding))? * self.accrual_period())
    }

    fn as_coupon(&self) -> Option<&dyn Coupon> {
        Some(self)
    }
}

impl Coupon for IborCoupon {
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
        self.day_counter
    }

    fn rate(&self) -> Result<Rate> {
        self.rate_with(None)
    }

    fn rate_on(&self, forwarding: &dyn YieldTermStructure) -> Result<Rate> {
        self.rate_with(Some(forwarding))
    }
}

/// Builds an Ibor leg from a schedule.
///
/// Corresponds to `QuantLib::IborLeg`.
#[derive(Debug, Clone)]
pub struct IborLegBuilder<'a> {
    schedule: &'a Schedule,
    index: Arc<IborIndex>,
    notionals: Vec<Real>,
    gearings: Vec<Real>,
    spreads: Vec<Spread>,
    fixing_days: Option<Natural>,
    day_counter: Option<DayCounter>,
    payment_convention: BusinessDayConvention,
    payment_calendar: Option<Calendar>,
}

impl<'a> IborLegBuilder<'a> {
    /// A unit-notional leg on `index` with no spread.
    pub fn new(schedule: &'a Schedule, index: Arc<IborIndex>) -> Self {
        Self {
            schedule,
            index,
            notionals: vec![1.0],
            gearings: vec![1.0],
            spreads: vec![0.0],
            fixing_days: None,
            day_counter: None,
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

    /// One gearing for every period.
    pub fn with_gearing(mut self, gearing: Real) -> Self {
        self.gearings = vec![gearing];
        self
    }

    /// One spread for every period.
    pub fn with_spread(self, spread: Spread) -> Self {
        self.with_spreads(vec![spread])
    }

    /// Spreads per period; the last one repeats.
    pub fn with_spreads(mut self, spreads: Vec<Spread>) -> Self {
        self.spreads = spreads;
        self
    }

    /// Fixing days; defaults to the index's.
    pub fn with_fixing_days(mut self, days: Natural) -> Self {
        self.fixing_days = Some(days);
        self
    }

    /// Accrual day counter; defaults to the index's.
    pub fn with_day_counter(mut self, day_counter: DayCounter) -> Self {
        self.day_counter = Some(day_counter);
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
    /// no notional is given.
    pub fn build(self) -> Result<Leg> {
        ql_core::ensure!(self.schedule.size() >= 2, "Ibor leg needs at least two schedule dates");
        ql_core::ensure!(!self.notionals.is_empty(), "Ibor leg needs notionals");
        let fixing_days = self.fixing_days.unwrap_or_else(|| self.index.fixing_days());
        let day_counter = self.day_counter.unwrap_or_else(|| self.index.day_counter());
        Ok(self
            .schedule
            .periods()
            .enumerate()
            .map(|(i, (start, end))| {
                let payment = match &self.payment_calendar {
                    Some(calendar) => calendar.adjust(end, self.payment_convention),
                    None => end,
                };
                Arc::new(IborCoupon::new(
                    payment,
                    per_period(&self.notionals, i, 1.0),
                    start,
                    end,
                    fixing_days,
                    Arc::clone(&self.index),
                    per_period(&self.gearings, i, 1.0),
                    per_period(&self.spreads, i, 0.0),
                    day_counter,
                )) as Arc<dyn CashFlow>
            })
            .collect())
    }
}
