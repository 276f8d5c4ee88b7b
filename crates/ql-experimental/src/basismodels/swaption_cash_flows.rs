//! Swaption cash flows decomposed for tenor-basis models (translates
//! `ql/experimental/basismodels/swaptioncfs.hpp`).
//!
//! The floating leg of the underlying is rewritten on the discount curve as
//! a notional paid at the first accrual start, deterministic tenor-spread
//! flows and the notional returned at the last accrual end.  Discounted,
//! this reproduces the floating leg exactly.

use ql_cashflows::{CashFlow, Leg, SimpleCashFlow};
use ql_core::{errors::Result, Real, Time};
use ql_instruments::Swaption;
use ql_termstructures::YieldTermStructure;
use ql_time::{Date, DayCounter};
use std::sync::Arc;

/// Fixed and floating flows of a swaption's underlying, with their times.
///
/// Corresponds to `QuantLib::SwaptionCashFlows`.
#[derive(Debug, Clone)]
pub struct SwaptionCashFlows {
    swaption: Arc<Swaption>,
    discount_curve: Arc<dyn YieldTermStructure>,
    cont_tenor_spread: bool,
    float_leg: Leg,
    fixed_leg: Leg,
    float_times: Vec<Time>,
    float_weights: Vec<Real>,
    fixed_times: Vec<Time>,
    fixed_weights: Vec<Real>,
    annuity_weights: Vec<Real>,
    exercise_times: Vec<Time>,
}

impl SwaptionCashFlows {
    /// Decompose `swaption` against `discount_curve`.
    ///
    /// With `cont_tenor_spread` each spread flow is the ratio of index and
    /// discount growth over its period, paid at the accrual start;
    /// otherwise it is the simple rate difference paid with the coupon.
    /// Coupons accruing from before the curve's reference date are left
    /// out.
    ///
    /// # Errors
    /// Forecasting failures, e.g. an index without a forwarding curve.
    pub fn new(
        swaption: Arc<Swaption>,
        discount_curve: Arc<dyn YieldTermStructure>,
        cont_tenor_spread: bool,
    ) -> Result<Self> {
        let reference = discount_curve.reference_date();
        let time = |d: Date| DayCounter::Actual365Fixed.year_fraction(reference, d);
        let swap = swaption.underlying();

        let mut spreads = Leg::new();
        let mut first: Option<(Date, Real)> = None;
        let mut last: Option<(Date, Real)> = None;
        for flow in swap.floating_leg() {
            let Some(coupon) = flow.as_coupon() else { continue };
            let (start, end) = (coupon.accrual_start_date(), coupon.accrual_end_date());
            if start < reference {
                continue;
            }
            let nominal = coupon.nominal();
            let tau = coupon.accrual_period();
            let index_rate = coupon.rate()?;
            let growth = discount_curve.discount_date(start)? / discount_curve.discount_date(end)?;
            let spread: Arc<dyn CashFlow> = if cont_tenor_spread {
                Arc::new(SimpleCashFlow::new(nominal * ((1.0 + tau * index_rate) / growth - 1.0), start))
            } else {
                let discount_rate = (growth - 1.0) / tau;
                Arc::new(SimpleCashFlow::new(nominal * tau * (index_rate - discount_rate), flow.date()))
            };
            spreads.push(spread);
            first.get_or_insert((start, nominal));
            last = Some((end, nominal));
        }
        let mut float_leg = Leg::with_capacity(spreads.len() + 2);
        if let (Some((start, n0)), Some((end, n1))) = (first, last) {
            float_leg.push(Arc::new(SimpleCashFlow::new(n0, start)));
            float_leg.extend(spreads);
            float_leg.push(Arc::new(SimpleCashFlow::new(-n1, end)));
        }

        let mut fixed_leg = Leg::new();
        let mut annuity_weights = Vec::new();
        for flow in swap.fixed_leg() {
            let Some(coupon) = flow.as_coupon() else { continue };
            if coupon.accrual_start_date() < reference {
                continue;
            }
            annuity_weights.push(coupon.nominal() * coupon.accrual_period());
            fixed_leg.push(Arc::clone(flow));
        }

        let float_times: Vec<Time> = float_leg.iter().map(|cf| time(cf.date())).collect();
        let float_weights: Vec<Real> = float_leg.iter().map(|cf| cf.amount()).collect::<Result<_>>()?;
        let fixed_times: Vec<Time> = fixed_leg.iter().map(|cf| time(cf.date())).collect();
        let fixed_weights: Vec<Real> = fixed_leg.iter().map(|cf| cf.amount()).collect::<Result<_>>()?;
        let exercise_times: Vec<Time> = swaption
            .exercise()
            .dates()
            .iter()
            .filter(|&&d| d > reference)
            .map(|&d| time(d))
            .collect();
        tracing::debug!(
            float_flows = float_leg.len(),
            fixed_flows = fixed_leg.len(),
            cont_tenor_spread,
            "decomposed swaption cash flows"
        );
        Ok(Self {
            swaption,
            discount_curve,
            cont_tenor_spread,
            float_leg,
            fixed_leg,
            float_times,
            float_weights,
            fixed_times,
            fixed_weights,
            annuity_weights,
            exercise_times,
        })
    }

    /// The swaption.
    pub fn swaption(&self) -> &Arc<Swaption> {
        &self.swaption
    }

    /// The discount curve.
    pub fn discount_curve(&self) -> &Arc<dyn YieldTermStructure> {
        &self.discount_curve
    }

    /// Whether spreads are paid as growth ratios at accrual start.
    pub fn cont_tenor_spread(&self) -> bool {
        self.cont_tenor_spread
    }

    /// Notional exchanges and spread flows replacing the floating leg.
    pub fn float_leg(&self) -> &Leg {
        &self.float_leg
    }

    /// Fixed coupons still to accrue.
    pub fn fixed_leg(&self) -> &Leg {
        &self.fixed_leg
    }

    /// Times of [`Self::float_leg`] flows.
    pub fn float_times(&self) -> &[Time] {
        &self.float_times
    }

    /// Amounts of [`Self::float_leg`] flows.
    pub fn float_weights(&self) -> &[Real] {
        &self.float_weights
    }

    /// Times of fixed coupon payments.
    pub fn fixed_times(&self) -> &[Time] {
        &self.fixed_times
    }

    /// Fixed coupon amounts.
    pub fn fixed_weights(&self) -> &[Real] {
        &self.fixed_weights
    }

    /// `nominal·τ` per fixed coupon.
    pub fn annuity_weights(&self) -> &[Real] {
        &self.annuity_weights
    }

    /// Times of exercise dates after the reference date.
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }
}
