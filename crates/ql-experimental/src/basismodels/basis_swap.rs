//! Multi-leg, multi-currency floating swaps (translates
//! `ql/experimental/basismodels/basisswap.hpp` and `basisswapengine.hpp`).
//!
//! A [`BasisSwap`] is a [`Swap`] that knows which of its legs carries the
//! quoted spread.  The [`BasisSwapEngine`] discounts every leg on its own
//! curve and converts leg values into a common currency with today's
//! FX rates.

use ql_cashflows::{cashflows, Leg, BASIS_POINT};
use ql_core::{errors::Result, Real, Spread};
use ql_instruments::{Instrument, PricingEngine, Swap};
use ql_termstructures::YieldTermStructure;
use ql_time::Date;
use std::sync::Arc;

// ── BasisSwap ─────────────────────────────────────────────────────────────────

/// A swap of floating legs, one of which is quoted with a spread.
///
/// Corresponds to `QuantLib::BasisSwap`.
#[derive(Debug, Clone)]
pub struct BasisSwap {
    swap: Swap,
    par_leg_index: usize,
    calc_par_spread: bool,
}

impl BasisSwap {
    /// Legs with their payer flags; the spread of leg `par_leg_index` is
    /// solved for when `calc_par_spread` is set.
    ///
    /// # Errors
    /// Mismatched legs and flags, or a par leg index out of range.
    pub fn new(legs: Vec<Leg>, payer: Vec<bool>, par_leg_index: usize, calc_par_spread: bool) -> Result<Self> {
        ql_core::ensure!(
            par_leg_index < legs.len(),
            "par leg index {par_leg_index} out of range for {} legs",
            legs.len()
        );
        Ok(Self {
            swap: Swap::new(legs, payer)?,
            par_leg_index,
            calc_par_spread,
        })
    }

    /// The underlying swap.
    pub fn swap(&self) -> &Swap {
        &self.swap
    }

    /// The legs.
    pub fn legs(&self) -> &[Leg] {
        self.swap.legs()
    }

    /// Payer flags per leg.
    pub fn payer(&self) -> &[bool] {
        self.swap.payer()
    }

    /// The leg whose spread is quoted.
    pub fn par_leg_index(&self) -> usize {
        self.par_leg_index
    }

    /// Whether engines report a par spread.
    pub fn calc_par_spread(&self) -> bool {
        self.calc_par_spread
    }
}

impl Instrument for BasisSwap {
    fn maturity_date(&self) -> Option<Date> {
        self.swap.maturity_date()
    }
}

// ── BasisSwapEngine ───────────────────────────────────────────────────────────

/// Values of a basis swap, in the engine's common currency.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisSwapResults {
    /// Net present value.
    pub npv: Real,
    /// Signed NPV of each leg.
    pub leg_npv: Vec<Real>,
    /// Signed BPS of each leg.
    pub leg_bps: Vec<Real>,
    /// Spread to add on the par leg for a zero NPV, when requested.
    pub par_spread: Option<Spread>,
}

/// Discounts each leg on its own curve and converts with FX FOR/DOM rates
/// (units of the common currency per unit of the leg currency).
///
/// Corresponds to `QuantLib::BasisSwapEngine`.
#[derive(Debug, Clone)]
pub struct BasisSwapEngine {
    discount_curves: Vec<Arc<dyn YieldTermStructure>>,
    fx_for_dom: Vec<Real>,
    include_settlement_date_flows: bool,
    settlement_date: Option<Date>,
    npv_date: Option<Date>,
}

impl BasisSwapEngine {
    /// One discount curve and one FX rate per leg.
    ///
    /// # Errors
    /// No curves, a length mismatch, or a non-positive FX rate.
    pub fn new(discount_curves: Vec<Arc<dyn YieldTermStructure>>, fx_for_dom: Vec<Real>) -> Result<Self> {
        ql_core::ensure!(!discount_curves.is_empty(), "basis swap engine needs discount curves");
        ql_core::ensure!(
            discount_curves.len() == fx_for_dom.len(),
            "{} discount curves but {} FX rates",
            discount_curves.len(),
            fx_for_dom.len()
        );
        ql_core::ensure!(
            fx_for_dom.iter().all(|&fx| fx > 0.0),
            "FX rates must be positive, got {fx_for_dom:?}"
        );
        Ok(Self {
            discount_curves,
            fx_for_dom,
            include_settlement_date_flows: false,
            settlement_date: None,
            npv_date: None,
        })
    }

    /// Keep flows paid on the settlement date.
    pub fn include_settlement_date_flows(mut self, include: bool) -> Self {
        self.include_settlement_date_flows = include;
        self
    }

    /// Flows on or before this date are ignored.
    pub fn with_settlement_date(mut self, date: Date) -> Self {
        self.settlement_date = Some(date);
        self
    }

    /// Date values are expressed at.
    pub fn with_npv_date(mut self, date: Date) -> Self {
        self.npv_date = Some(date);
        self
    }

    /// Discount curve of each leg.
    pub fn discount_curves(&self) -> &[Arc<dyn YieldTermStructure>] {
        &self.discount_curves
    }

    /// FX rate of each leg.
    pub fn fx_for_dom(&self) -> &[Real] {
        &self.fx_for_dom
    }
}

impl PricingEngine<BasisSwap> for BasisSwapEngine {
    type Results = BasisSwapResults;

    fn calculate(&self, swap: &BasisSwap) -> Result<BasisSwapResults> {
        let legs = swap.legs();
        ql_core::ensure!(
            legs.len() == self.discount_curves.len(),
            "{} legs but {} discount curves",
            legs.len(),
            self.discount_curves.len()
        );
        let reference = self.discount_curves[0].reference_date();
        let settlement = self.settlement_date.unwrap_or(reference);
        let npv_date = self.npv_date.unwrap_or(reference);
        let include = self.include_settlement_date_flows;

        let mut results = BasisSwapResults {
            npv: 0.0,
            leg_npv: Vec::with_capacity(legs.len()),
            leg_bps: Vec::with_capacity(legs.len()),
            par_spread: None,
        };
        for (i, leg) in legs.iter().enumerate() {
            let curve = self.discount_curves[i].as_ref();
            let scale = swap.swap().leg_sign(i) * self.fx_for_dom[i];
            let npv = scale * cashflows::npv(leg, curve, include, settlement, npv_date)?;
            results.leg_npv.push(npv);
            results
                .leg_bps
                .push(scale * cashflows::bps(leg, curve, include, settlement, npv_date)?);
            results.npv += npv;
        }
        if swap.calc_par_spread() {
            let bps = results.leg_bps[swap.par_leg_index()];
            ql_core::ensure_domain!(bps.abs() > 0.0, "par leg has zero BPS");
            results.par_spread = Some(-results.npv / (bps / BASIS_POINT));
        }
        tracing::debug!(npv = results.npv, par_spread = ?results.par_spread, "basis swap valued");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_cashflows::{IborLegBuilder, SimpleCashFlow};
    use ql_indexes::euribor;
    use ql_termstructures::{FlatForward, ForwardSpreadedTermStructure};
    use ql_time::{Calendar, DayCounter, Period, ScheduleBuilder, TimeUnit};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn par_spread_closes_a_tenor_basis() {
        let today = date(2025, 1, 2);
        let ois: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(today, 0.02, DayCounter::Actual365Fixed));
        let fwd3m: Arc<dyn YieldTermStructure> = Arc::new(ForwardSpreadedTermStructure::new(ois.clone(), 0.001));
        let fwd6m: Arc<dyn YieldTermStructure> = Arc::new(ForwardSpreadedTermStructure::new(ois.clone(), 0.003));
        let euribor3m = Arc::new(euribor(Period::new(3, TimeUnit::Months)).with_forwarding(fwd3m));
        let euribor6m = Arc::new(euribor(Period::new(6, TimeUnit::Months)).with_forwarding(fwd6m));
        // the first coupons fix today, not before the curves start
        let start = euribor3m.value_date(today);
        assert_eq!(euribor3m.fixing_date(start), today);
        let schedule = |months| {
            ScheduleBuilder::new(
                start,
                start.advance(5, TimeUnit::Years),
                Period::new(months, TimeUnit::Months),
                Calendar::Null,
            )
            .build()
            .unwrap()
        };
        let (s3, s6) = (schedule(3), schedule(6));
        let leg3 = IborLegBuilder::new(&s3, euribor3m).build().unwrap();
        let leg6 = IborLegBuilder::new(&s6, euribor6m).build().unwrap();
        let swap = BasisSwap::new(vec![leg3.clone(), leg6], vec![false, true], 0, true).unwrap();
        let engine = BasisSwapEngine::new(vec![ois.clone(), ois.clone()], vec![1.0, 1.0]).unwrap();
        let results = engine.calculate(&swap).unwrap();
        let spread = results.par_spread.unwrap();
        assert!(spread > 0.0015 && spread < 0.0025, "spread {spread}");

        let respread = IborLegBuilder::new(
            &s3,
            Arc::new(euribor(Period::new(3, TimeUnit::Months)).with_forwarding(Arc::new(
                ForwardSpreadedTermStructure::new(ois.clone(), 0.001),
            ))),
        )
        .with_spread(spread)
        .build()
        .unwrap();
        let closed = BasisSwap::new(vec![respread, swap.legs()[1].clone()], vec![false, true], 0, true).unwrap();
        let results = engine.calculate(&closed).unwrap();
        assert_abs_diff_eq!(results.npv, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(results.par_spread.unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn legs_convert_with_fx() {
        let today = date(2025, 1, 2);
        let usd: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(today, 0.04, DayCounter::Actual365Fixed));
        let eur: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(today, 0.02, DayCounter::Actual365Fixed));
        let pay_date = date(2026, 1, 2);
        let usd_leg: Leg = vec![Arc::new(SimpleCashFlow::new(110.0, pay_date))];
        let eur_leg: Leg = vec![Arc::new(SimpleCashFlow::new(100.0, pay_date))];
        let swap = BasisSwap::new(vec![usd_leg, eur_leg], vec![true, false], 0, false).unwrap();
        let engine = BasisSwapEngine::new(vec![usd.clone(), eur.clone()], vec![1.0, 1.1]).unwrap();
        let results = engine.calculate(&swap).unwrap();
        let expected = -110.0 * usd.discount_date(pay_date).unwrap() + 110.0 * eur.discount_date(pay_date).unwrap();
        assert_abs_diff_eq!(results.npv, expected, epsilon = 1e-10);
        assert!(results.par_spread.is_none());
        assert_eq!(results.leg_bps, vec![0.0, 0.0]);
    }

    #[test]
    fn engine_checks_its_inputs() {
        let today = date(2025, 1, 2);
        let curve: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(today, 0.02, DayCounter::Actual365Fixed));
        assert!(BasisSwapEngine::new(vec![curve.clone()], vec![1.0, 1.0]).is_err());
        assert!(BasisSwapEngine::new(vec![curve], vec![-1.0]).is_err());
        assert!(BasisSwap::new(vec![Vec::new()], vec![true], 1, true).is_err());
    }
}
