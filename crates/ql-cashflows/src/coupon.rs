//! `Coupon` trait — base for interest-rate coupons.
//!
//! Translates `ql/cashflows/coupon.hpp`.

use crate::cashflow::CashFlow;
use ql_core::{errors::Result, Rate, Real};
use ql_termstructures::YieldTermStructure;
use ql_time::{Date, DayCounter};

/// A cash flow accruing interest over `[accrual_start, accrual_end)`.
///
/// Corresponds to `QuantLib::Coupon`.
pub trait Coupon: CashFlow {
    /// The notional.
    fn nominal(&self) -> Real;

    /// Start of the accrual period.
    fn accrual_start_date(&self) -> Date;

    /// End of the accrual period.
    fn accrual_end_date(&self) -> Date;

    /// Accrual day counter.
    fn day_counter(&self) -> DayCounter;

    /// Accrual period as a year fraction.
    fn accrual_period(&self) -> Real {
        self.day_counter()
            .year_fraction(self.accrual_start_date(), self.accrual_end_date())
    }

    /// Annualised coupon rate.
    fn rate(&self) -> Result<Rate>;

    /// Annualised coupon rate with floating fixings forecast from
    /// `forwarding`.
    fn rate_on(&self, _forwarding: &dyn YieldTermStructure) -> Result<Rate> {
        self.rate()
    }

    /// Interest accrued from the accrual start to `date`.
    fn accrued_amount(&self, date: Date) -> Result<Real> {
        if date <= self.accrual_start_date() || date > self.date() {
            return Ok(0.0);
        }
        let end = date.min(self.accrual_end_date());
        Ok(self.nominal()
            * self.rate()?
            * self.day_counter().year_fraction(self.accrual_start_date(), end))
    }
}
