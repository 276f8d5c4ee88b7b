//! Interest-rate swaps (translates `ql/instruments/swap.hpp`,
//! `ql/instruments/vanillaswap.hpp` and
//! `ql/pricingengines/swap/discountingswapengine.hpp`).

use crate::instrument::{Instrument, PricingEngine};
use ql_cashflows::{cashflows, FixedRateLegBuilder, IborLegBuilder, Leg, BASIS_POINT};
use ql_core::{errors::Result, Rate, Real, Spread};
use ql_indexes::{IborIndex, Index};
use ql_termstructures::YieldTermStructure;
use ql_time::{DateGeneration, Date, DayCounter, Period, Schedule, ScheduleBuilder};
use std::sync::Arc;

// ── Swap ──────────────────────────────────────────────────────────────────────

/// Payer or receiver of the fixed leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapType {
    /// Pay fixed, receive floating.
    Payer,
    /// Receive fixed, pay floating.
    Receiver,
}

impl SwapType {
    /// +1 for Payer, −1 for Receiver.
    pub fn sign(self) -> Real {
        match self {
            SwapType::Payer => 1.0,
            SwapType::Receiver => -1.0,
        }
    }
}

/// Any number of legs, each paid or received.
///
/// Corresponds to `QuantLib::Swap`.
#[derive(Debug, Clone)]
pub struct Swap {
    legs: Vec<Leg>,
    payer: Vec<bool>,
}

impl Swap {
    /// A swap from its legs; `payer[i]` is set when leg `i` is paid.
    ///
    /// # Errors
    /// A configuration error when the two vectors differ in length.
    pub fn new(legs: Vec<Leg>, payer: Vec<bool>) -> Result<Self> {
        ql_core::ensure!(
            legs.len() == payer.len(),
            "size mismatch between legs ({}) and payer flags ({})",
            legs.len(),
            payer.len()
        );
        Ok(Self { legs, payer })
    }

    /// All legs.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// The `i`-th leg.
    pub fn leg(&self, i: usize) -> &Leg {
        &self.legs[i]
    }

    /// Payer flags.
    pub fn payer(&self) -> &[bool] {
        &self.payer
    }

    /// −1 for a paid leg, +1 for a received one.
    pub fn leg_sign(&self, i: usize) -> Real {
        if self.payer[i] {
            -1.0
        } else {
            1.0
        }
    }

    /// Earliest accrual start over all legs.
    pub fn start_date(&self) -> Option<Date> {
        self.legs.iter().filter_map(cashflows::start_date).min()
    }
}

impl Instrument for Swap {
    fn maturity_date(&self) -> Option<Date> {
        self.legs.iter().filter_map(cashflows::maturity_date).max()
    }
}

// ── Discounting engine ────────────────────────────────────────────────────────

/// Per-leg and total values of a swap.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapResults {
    /// Total NPV.
    pub npv: Real,
    /// Signed NPV of each leg.
    pub leg_npv: Vec<Real>,
    /// Signed BPS of each leg.
    pub leg_bps: Vec<Real>,
}

/// Values every leg on one discount curve, forecasting floating coupons from
/// their indexes.
///
/// Corresponds to `QuantLib::DiscountingSwapEngine`.
#[derive(Debug, Clone)]
pub struct DiscountingSwapEngine {
    discount: Arc<dyn YieldTermStructure>,
    include_settlement_date_flows: bool,
    settlement_date: Option<Date>,
    npv_date: Option<Date>,
}

impl DiscountingSwapEngine {
    /// An engine discounting on `discount`, settling and reporting at its
    /// reference date.
    pub fn new(discount: Arc<dyn YieldTermStructure>) -> Self {
        Self {
            discount,
            include_settlement_date_flows: false,
            settlement_date: None,
            npv_date: None,
        }
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
}

impl PricingEngine<Swap> for DiscountingSwapEngine {
    type Results = SwapResults;

    fn calculate(&self, swap: &Swap) -> Result<SwapResults> {
        let reference = self.discount.reference_date();
        let settlement = self.settlement_date.unwrap_or(reference);
        let npv_date = self.npv_date.unwrap_or(reference);
        let curve = self.discount.as_ref();
        let include = self.include_settlement_date_flows;

        let mut results = SwapResults {
            npv: 0.0,
            leg_npv: Vec::with_capacity(swap.legs().len()),
            leg_bps: Vec::with_capacity(swap.legs().len()),
        };
        for (i, leg) in swap.legs().iter().enumerate() {
            let sign = swap.leg_sign(i);
            let npv = sign * cashflows::npv(leg, curve, include, settlement, npv_date)?;
            results.leg_npv.push(npv);
            results
                .leg_bps
                .push(sign * cashflows::bps(leg, curve, include, settlement, npv_date)?);
            results.npv += npv;
        }
        Ok(results)
    }
}

// ── VanillaSwap ───────────────────────────────────────────────────────────────

/// Fixed against Ibor.
///
/// Corresponds to `QuantLib::VanillaSwap`.  Leg 0 is the fixed leg, leg 1
/// the floating leg.
#[derive(Debug, Clone)]
pub struct VanillaSwap {
    swap_type: SwapType,
    nominal: Real,
    fixed_schedule: Schedule,
    fixed_rate: Rate,
    fixed_day_counter: DayCounter,
    float_schedule: Schedule,
    index: Arc<IborIndex>,
    spread: Spread,
    float_day_counter: DayCounter,
    swap: Swap,
}

impl VanillaSwap {
    /// A swap from explicit schedules.
    ///
    /// # Errors
    /// Leg construction failures.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        swap_type: SwapType,
        nominal: Real,
        fixed_schedule: Schedule,
        fixed_rate: Rate,
        fixed_day_counter: DayCounter,
        float_schedule: Schedule,
        index: Arc<IborIndex>,
        spread: Spread,
        float_day_counter: DayCounter,
    ) -> Result<Self> {
        let fixed_leg = FixedRateLegBuilder::new(&fixed_schedule)
            .with_notional(nominal)
            .with_coupon_rate(fixed_rate)
            .with_day_counter(fixed_day_counter)
            .build()?;
        let floating_leg = IborLegBuilder::new(&float_schedule, Arc::clone(&index))
            .with_notional(nominal)
            .with_spread(spread)
            .with_day_counter(float_day_counter)
            .build()?;
        let swap = Swap::new(
            vec![fixed_leg, floating_leg],
            vec![swap_type == SwapType::Payer, swap_type == SwapType::Receiver],
        )?;
        Ok(Self {
            swap_type,
            nominal,
            fixed_schedule,
            fixed_rate,
            fixed_day_counter,
            float_schedule,
            index,
            spread,
            float_day_counter,
            swap,
        })
    }

    /// A unit-notional swap of `length` from `start`, with the floating leg
    /// and all date rolling following `index`, and a fixed leg paying every
    /// `fixed_tenor`.
    ///
    /// Corresponds to `QuantLib::MakeVanillaSwap`.
    ///
    /// # Errors
    /// Schedule generation failures.
    #[allow(clippy::too_many_arguments)]
    pub fn from_index(
        swap_type: SwapType,
        start: Date,
        length: Period,
        index: Arc<IborIndex>,
        fixed_rate: Rate,
        fixed_tenor: Period,
        fixed_day_counter: DayCounter,
    ) -> Result<Self> {
        let calendar = index.fixing_calendar().clone();
        let convention = index.business_day_convention();
        let end = start.advance(length.length, length.unit);
        let leg = |tenor: Period| {
            ScheduleBuilder::new(start, end, tenor, calendar.clone())
                .with_convention(convention)
                .with_termination_convention(convention)
                .with_rule(DateGeneration::Backward)
                .end_of_month(index.end_of_month())
                .build()
        };
        let fixed_schedule = leg(fixed_tenor)?;
        let float_schedule = leg(index.tenor())?;
        let float_day_counter = index.day_counter();
        Self::new(
            swap_type,
            1.0,
            fixed_schedule,
            fixed_rate,
            fixed_day_counter,
            float_schedule,
            index,
            0.0,
            float_day_counter,
        )
    }

    /// The same swap paying another fixed rate.
    ///
    /// # Errors
    /// Leg construction failures.
    pub fn with_fixed_rate(&self, fixed_rate: Rate) -> Result<Self> {
        Self::new(
            self.swap_type,
            self.nominal,
            self.fixed_schedule.clone(),
            fixed_rate,
            self.fixed_day_counter,
            self.float_schedule.clone(),
            Arc::clone(&self.index),
            self.spread,
            self.float_day_counter,
        )
    }

    /// Payer or receiver.
    pub fn swap_type(&self) -> SwapType {
        self.swap_type
    }

    /// Notional of both legs.
    pub fn nominal(&self) -> Real {
        self.nominal
    }

    /// Fixed rate.
    pub fn fixed_rate(&self) -> Rate {
        self.fixed_rate
    }

    /// Fixed-leg day counter.
    pub fn fixed_day_counter(&self) -> DayCounter {
        self.fixed_day_counter
    }

    /// Spread over the index.
    pub fn spread(&self) -> Spread {
        self.spread
    }

    /// The floating index.
    pub fn index(&self) -> &Arc<IborIndex> {
        &self.index
    }

    /// Fixed-leg schedule.
    pub fn fixed_schedule(&self) -> &Schedule {
        &self.fixed_schedule
    }

    /// Floating-leg schedule.
    pub fn float_schedule(&self) -> &Schedule {
        &self.float_schedule
    }

    /// Fixed-leg cash flows.
    pub fn fixed_leg(&self) -> &Leg {
        self.swap.leg(0)
    }

    /// Floating-leg cash flows.
    pub fn floating_leg(&self) -> &Leg {
        self.swap.leg(1)
    }

    /// The swap as a generic two-leg swap.
    pub fn swap(&self) -> &Swap {
        &self.swap
    }

    /// Fixed rate making `results` value to zero.
    pub fn fair_rate(&self, results: &SwapResults) -> Rate {
        self.fixed_rate - results.npv / (results.leg_bps[0] / BASIS_POINT)
    }

    /// Floating spread making `results` value to zero.
    pub fn fair_spread(&self, results: &SwapResults) -> Spread {
        self.spread - results.npv / (results.leg_bps[1] / BASIS_POINT)
    }
}

impl Instrument for VanillaSwap {
    fn maturity_date(&self) -> Option<Date> {
        self.swap.maturity_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_indexes::euribor;
    use ql_termstructures::FlatForward;
    use ql_time::TimeUnit;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn setup(rate: Rate) -> (Arc<dyn YieldTermStructure>, Arc<IborIndex>) {
        let curve: Arc<dyn YieldTermStructure> =
            Arc::new(FlatForward::continuous(date(2025, 1, 2), rate, DayCounter::Actual365Fixed));
        let index = Arc::new(euribor(Period::new(6, TimeUnit::Months)).with_forwarding(Arc::clone(&curve)));
        (curve, index)
    }

    #[test]
    fn fair_rate_zeroes_the_npv() {
        let (curve, index) = setup(0.03);
        let swap = VanillaSwap::from_index(
            SwapType::Payer,
            date(2025, 1, 6),
            Period::new(5, TimeUnit::Years),
            index,
            0.05,
            Period::new(1, TimeUnit::Years),
            DayCounter::Thirty360,
        )
        .unwrap();
        assert_eq!(swap.fixed_leg().len(), 5);
        assert_eq!(swap.floating_leg().len(), 10);

        let engine = DiscountingSwapEngine::new(curve);
        let results = engine.calculate(swap.swap()).unwrap();
        // paying 5% against a 3% curve loses money
        assert!(results.npv < 0.0);
        assert!(results.leg_npv[0] < 0.0 && results.leg_npv[1] > 0.0);

        let fair = swap.fair_rate(&results);
        let at_par = swap.with_fixed_rate(fair).unwrap();
        assert_abs_diff_eq!(engine.calculate(at_par.swap()).unwrap().npv, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn receiver_mirrors_payer() {
        let (curve, index) = setup(0.02);
        let build = |swap_type| {
            VanillaSwap::from_index(
                swap_type,
                date(2025, 1, 6),
                Period::new(3, TimeUnit::Years),
                Arc::clone(&index),
                0.025,
                Period::new(1, TimeUnit::Years),
                DayCounter::Thirty360,
            )
            .unwrap()
        };
        let engine = DiscountingSwapEngine::new(curve);
        let payer = engine.calculate(build(SwapType::Payer).swap()).unwrap();
        let receiver = engine.calculate(build(SwapType::Receiver).swap()).unwrap();
        assert_abs_diff_eq!(payer.npv, -receiver.npv, epsilon = 1e-15);
        let swap = build(SwapType::Receiver);
        assert_abs_diff_eq!(swap.fair_rate(&receiver), build(SwapType::Payer).fair_rate(&payer), epsilon = 1e-14);
        assert_eq!(swap.maturity_date(), Some(date(2028, 1, 6)));
        assert!(!swap.is_expired(date(2025, 1, 2)));
    }

    #[test]
    fn fair_spread_zeroes_the_npv() {
        let (curve, index) = setup(0.03);
        let swap = VanillaSwap::from_index(
            SwapType::Receiver,
            date(2025, 1, 6),
            Period::new(2, TimeUnit::Years),
            index,
            0.04,
            Period::new(1, TimeUnit::Years),
            DayCounter::Thirty360,
        )
        .unwrap();
        let engine = DiscountingSwapEngine::new(curve);
        let results = engine.calculate(swap.swap()).unwrap();
        let spread = swap.fair_spread(&results);
        let rebuilt = VanillaSwap::new(
            SwapType::Receiver,
            1.0,
            swap.fixed_schedule().clone(),
            0.04,
            DayCounter::Thirty360,
            swap.float_schedule().clone(),
            Arc::clone(swap.index()),
            spread,
            DayCounter::Actual360,
        )
        .unwrap();
        assert_abs_diff_eq!(engine.calculate(rebuilt.swap()).unwrap().npv, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn mismatched_payer_flags() {
        assert!(Swap::new(vec![Vec::new()], vec![true, false]).is_err());
    }
}
