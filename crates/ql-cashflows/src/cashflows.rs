//! Leg analytics (translates `ql/cashflows/cashflows.hpp`).
//!
//! Flows paid on or before the settlement date are excluded, unless
//! `include_settlement_date_flows` keeps those paid exactly on it.  Values
//! are expressed at `npv_date`, i.e. divided by the discount factor to it.

use crate::cashflow::{CashFlow, Leg};
use ql_core::{errors::Result, Real};
use ql_termstructures::YieldTermStructure;
use ql_time::Date;

/// One basis point.
pub const BASIS_POINT: Real = 1.0e-4;

/// First accrual start (or payment) date of a leg.
pub fn start_date(leg: &Leg) -> Option<Date> {
    leg.iter()
        .map(|cf| cf.as_coupon().map_or(cf.date(), |c| c.accrual_start_date()))
        .min()
}

/// Last payment date of a leg.
pub fn maturity_date(leg: &Leg) -> Option<Date> {
    leg.iter().map(|cf| cf.date()).max()
}

fn discounted<F>(
    leg: &Leg,
    discount: &dyn YieldTermStructure,
    include_settlement_date_flows: bool,
    settlement_date: Date,
    npv_date: Date,
    mut value: F,
) -> Result<Real>
where
    F: FnMut(&dyn CashFlow) -> Result<Real>,
{
    let mut total = 0.0;
    for cf in leg {
        if cf.has_occurred(settlement_date, include_settlement_date_flows) {
            continue;
        }
        total += value(cf.as_ref())? * discount.discount_date(cf.date())?;
    }
    Ok(total / discount.discount_date(npv_date)?)
}

/// Present value of a leg, floating coupons forecast from their indexes.
///
/// # Errors
/// Missing fixings or forwarding curves; range errors from `discount`.
pub fn npv(
    leg: &Leg,
    discount: &dyn YieldTermStructure,
    include_settlement_date_flows: bool,
    settlement_date: Date,
    npv_date: Date,
) -> Result<Real> {
    discounted(leg, discount, include_settlement_date_flows, settlement_date, npv_date, |cf| {
        cf.amount()
    })
}

/// Present value of a leg with floating coupons forecast from `forwarding`.
///
/// # Errors
/// As [`npv`].
pub fn npv_on(
    leg: &Leg,
    forwarding: &dyn YieldTermStructure,
    discount: &dyn YieldTermStructure,
    include_settlement_date_flows: bool,
    settlement_date: Date,
    npv_date: Date,
) -> Result<Real> {
    discounted(leg, discount, include_settlement_date_flows, settlement_date, npv_date, |cf| {
        cf.amount_on(forwarding)
    })
}

/// Change in NPV for a one-basis-point rise of every coupon rate:
/// Σ N·τ·D · 1bp over the coupons.
///
/// # Errors
/// Range errors from `discount`.
pub fn bps(
    leg: &Leg,
    discount: &dyn YieldTermStructure,
    include_settlement_date_flows: bool,
    settlement_date: Date,
    npv_date: Date,
) -> Result<Real> {
    discounted(leg, discount, include_settlement_date_flows, settlement_date, npv_date, |cf| {
        Ok(cf
            .as_coupon()
            .map_or(0.0, |c| c.nominal() * c.accrual_period() * BASIS_POINT))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedRateLegBuilder, IborLegBuilder, SimpleCashFlow};
    use approx::assert_abs_diff_eq;
    use ql_indexes::euribor;
    use ql_termstructures::FlatForward;
    use ql_time::{Calendar, DayCounter, Period, Schedule, ScheduleBuilder, TimeUnit};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn schedule() -> Schedule {
        ScheduleBuilder::new(
            date(2025, 1, 2),
            date(2030, 1, 2),
            Period::new(1, TimeUnit::Years),
            Calendar::Null,
        )
        .build()
        .unwrap()
    }

    #[test]
    fn floating_leg_with_final_notional_prices_at_par() {
        let today = date(2025, 1, 2);
        let curve = FlatForward::continuous(today, 0.03, DayCounter::Actual365Fixed);
        let schedule = schedule();
        let index = Arc::new(euribor(Period::new(12, TimeUnit::Months)));
        let mut leg = IborLegBuilder::new(&schedule, index)
            .with_fixing_days(0)
            .build()
            .unwrap();
        leg.push(Arc::new(SimpleCashFlow::new(1.0, date(2030, 1, 2))));
        assert_abs_diff_eq!(npv_on(&leg, &curve, &curve, false, today, today).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bps_is_the_annuity() {
        let today = date(2025, 1, 2);
        let curve = FlatForward::continuous(today, 0.03, DayCounter::Actual365Fixed);
        let schedule = schedule();
        let leg = FixedRateLegBuilder::new(&schedule)
            .with_notional(100.0)
            .with_coupon_rate(0.05)
            .build()
            .unwrap();
        let annuity: Real = schedule
            .periods()
            .map(|(s, e)| DayCounter::Actual365Fixed.year_fraction(s, e) * curve.discount_date(e).unwrap())
            .sum();
        let value = npv(&leg, &curve, false, today, today).unwrap();
        assert_abs_diff_eq!(value, 5.0 * annuity, epsilon = 1e-12);
        assert_abs_diff_eq!(bps(&leg, &curve, false, today, today).unwrap(), 100.0 * annuity * BASIS_POINT, epsilon = 1e-14);
        assert_eq!(start_date(&leg), Some(today));
        assert_eq!(maturity_date(&leg), Some(date(2030, 1, 2)));

        // expressed at a later date
        let later = date(2026, 1, 2);
        let forward_value = npv(&leg, &curve, false, today, later).unwrap();
        assert_abs_diff_eq!(forward_value, value / curve.discount_date(later).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn settlement_date_flows_are_optional() {
        let today = date(2025, 1, 2);
        let curve = FlatForward::continuous(today, 0.03, DayCounter::Actual365Fixed);
        let leg: Leg = vec![Arc::new(SimpleCashFlow::new(1.0, today))];
        assert_eq!(npv(&leg, &curve, false, today, today).unwrap(), 0.0);
        assert_eq!(npv(&leg, &curve, true, today, today).unwrap(), 1.0);
    }
}
