//! Rate helpers for yield-curve bootstrapping
//! (translates `ql/termstructures/yield/ratehelpers.hpp` and
//! `bondhelpers.hpp`).
//!
//! A *rate helper* wraps a market quote together with the conventions
//! needed to reprice it off a curve.  The bootstrapper adjusts the node at
//! the helper's pillar date until
//! [`implied_quote`](RateHelper::implied_quote) matches
//! [`quote`](RateHelper::quote).
//!
//! Helpers may depend on curves other than the one being bootstrapped.
//! Such dependencies are expressed as a [`CurveRef`]: either the curve
//! under construction or an external, fully built curve that is held
//! constant during the bootstrap.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use ql_core::{
    errors::{Error, Result},
    Natural, Rate, Real, Spread, Time,
};
use ql_math::Brent;
use ql_quotes::QuoteHandle;
use ql_time::{
    BusinessDayConvention, Calendar, Date, DateGeneration, DayCounter, Frequency, Period, Schedule,
    ScheduleBuilder, TimeUnit,
};
use std::fmt;
use std::sync::Arc;

// ── Curve references ──────────────────────────────────────────────────────────

/// The curve a helper uses for one of its roles (discounting, forecasting).
#[derive(Clone, Default)]
pub enum CurveRef {
    /// The curve being bootstrapped.
    #[default]
    Bootstrapped,
    /// A fully built curve, held constant during the bootstrap.
    External(Arc<dyn YieldTermStructure>),
}

impl CurveRef {
    /// `External` for `Some`, `Bootstrapped` for `None`.
    pub fn from_option(curve: Option<Arc<dyn YieldTermStructure>>) -> Self {
        curve.map_or(CurveRef::Bootstrapped, CurveRef::External)
    }

    /// `true` for the curve under construction.
    pub fn is_bootstrapped(&self) -> bool {
        matches!(self, CurveRef::Bootstrapped)
    }

    /// The curve to use, given the one under construction.
    pub fn resolve<'a>(&'a self, bootstrapped: &'a dyn YieldTermStructure) -> &'a dyn YieldTermStructure {
        match self {
            CurveRef::Bootstrapped => bootstrapped,
            CurveRef::External(curve) => &**curve,
        }
    }

    /// Check that an external curve can be queried at `date`.
    ///
    /// # Errors
    /// [`Error::MissingCurve`] naming `role` when the curve ends before
    /// `date` and does not extrapolate.
    pub fn check_covers(&self, role: &str, date: Date) -> Result<()> {
        if let CurveRef::External(curve) = self {
            if date > curve.max_date() && !curve.allows_extrapolation() {
                return Err(Error::MissingCurve {
                    curve: role.to_string(),
                    date: date.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CurveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveRef::Bootstrapped => f.write_str("Bootstrapped"),
            CurveRef::External(curve) => write!(f, "External(ref {})", curve.reference_date()),
        }
    }
}

impl From<Arc<dyn YieldTermStructure>> for CurveRef {
    fn from(curve: Arc<dyn YieldTermStructure>) -> Self {
        CurveRef::External(curve)
    }
}

// ── RateHelper trait ──────────────────────────────────────────────────────────

/// A single market quote that constrains a yield curve at a pillar date.
///
/// Corresponds to `QuantLib::RateHelper`.
pub trait RateHelper: fmt::Debug + Send + Sync {
    /// The latest date at which the helper queries the curve being
    /// bootstrapped; the node it determines sits there.
    fn pillar_date(&self) -> Date;

    /// The market quote.
    fn quote(&self) -> Result<Real>;

    /// The quote implied by `curve` (the curve under construction) and any
    /// external curves the helper holds.
    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real>;

    /// `implied_quote − quote`.
    fn quote_error(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        Ok(self.implied_quote(curve)? - self.quote()?)
    }

    /// Check that the external curves the helper depends on are available
    /// for its dates.  Called once before bootstrapping.
    fn check_curves(&self) -> Result<()> {
        Ok(())
    }

    /// Short human-readable description, used in errors and logs.
    fn description(&self) -> String;
}

// ── DepositRateHelper ─────────────────────────────────────────────────────────

/// A deposit (money-market) rate helper.
///
/// The implied quote is the simple rate over `[start, maturity]`.
///
/// Corresponds to `QuantLib::DepositRateHelper`.
#[derive(Debug, Clone)]
pub struct DepositRateHelper {
    rate: QuoteHandle,
    start_date: Date,
    maturity_date: Date,
    day_counter: DayCounter,
}

impl DepositRateHelper {
    /// A deposit between explicit dates.
    pub fn new(rate: impl Into<QuoteHandle>, start_date: Date, maturity_date: Date, day_counter: DayCounter) -> Self {
        Self {
            rate: rate.into(),
            start_date,
            maturity_date,
            day_counter,
        }
    }

    /// A deposit starting `fixing_days` business days after
    /// `evaluation_date` and running for `tenor`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_tenor(
        rate: impl Into<QuoteHandle>,
        tenor: Period,
        fixing_days: Natural,
        calendar: &Calendar,
        convention: BusinessDayConvention,
        end_of_month: bool,
        day_counter: DayCounter,
        evaluation_date: Date,
    ) -> Self {
        let start = calendar.advance_business_days(evaluation_date, fixing_days as i32);
        let maturity = calendar.advance_period(start, tenor, convention, end_of_month);
        Self::new(rate, start, maturity, day_counter)
    }

    /// The start date.
    pub fn start_date(&self) -> Date {
        self.start_date
    }
}

impl RateHelper for DepositRateHelper {
    fn pillar_date(&self) -> Date {
        self.maturity_date
    }

    fn quote(&self) -> Result<Real> {
        self.rate.value()
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        simple_forward(curve, self.start_date, self.maturity_date, self.day_counter)
    }

    fn description(&self) -> String {
        format!("deposit {}..{}", self.start_date, self.maturity_date)
    }
}

// ── FraRateHelper ─────────────────────────────────────────────────────────────

/// A forward-rate-agreement rate helper.
///
/// Corresponds to `QuantLib::FraRateHelper`.
#[derive(Debug, Clone)]
pub struct FraRateHelper {
    rate: QuoteHandle,
    value_date: Date,
    maturity_date: Date,
    day_counter: DayCounter,
}

impl FraRateHelper {
    /// A FRA between explicit dates.
    pub fn new(rate: impl Into<QuoteHandle>, value_date: Date, maturity_date: Date, day_counter: DayCounter) -> Self {
        Self {
            rate: rate.into(),
            value_date,
            maturity_date,
            day_counter,
        }
    }

    /// A `months_to_start × months_to_end` FRA, both counted from the spot
    /// date `fixing_days` business days after `evaluation_date`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_months(
        rate: impl Into<QuoteHandle>,
        months_to_start: u32,
        months_to_end: u32,
        fixing_days: Natural,
        calendar: &Calendar,
        convention: BusinessDayConvention,
        day_counter: DayCounter,
        evaluation_date: Date,
    ) -> Self {
        let spot = calendar.advance_business_days(evaluation_date, fixing_days as i32);
        let value_date = calendar.advance(spot, months_to_start as i32, TimeUnit::Months, convention, false);
        let maturity_date = calendar.advance(spot, months_to_end as i32, TimeUnit::Months, convention, false);
        Self::new(rate, value_date, maturity_date, day_counter)
    }

    /// The FRA value (start) date.
    pub fn value_date(&self) -> Date {
        self.value_date
    }
}

impl RateHelper for FraRateHelper {
    fn pillar_date(&self) -> Date {
        self.maturity_date
    }

    fn quote(&self) -> Result<Real> {
        self.rate.value()
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        simple_forward(curve, self.value_date, self.maturity_date, self.day_counter)
    }

    fn description(&self) -> String {
        format!("FRA {}..{}", self.value_date, self.maturity_date)
    }
}

// ── SwapRateHelper ────────────────────────────────────────────────────────────

/// A par-swap rate helper: fixed leg against a floating leg projected from
/// a forwarding curve, both discounted on a discount curve.
///
/// Either curve may be external; by default both are the curve being
/// bootstrapped.
///
/// Corresponds to `QuantLib::SwapRateHelper`.
#[derive(Debug, Clone)]
pub struct SwapRateHelper {
    rate: QuoteHandle,
    fixed_schedule: Schedule,
    fixed_day_counter: DayCounter,
    float_schedule: Schedule,
    float_day_counter: DayCounter,
    spread: Spread,
    forwarding: CurveRef,
    discount: CurveRef,
}

impl SwapRateHelper {
    /// A swap from explicit leg schedules.
    pub fn new(
        rate: impl Into<QuoteHandle>,
        fixed_schedule: Schedule,
        fixed_day_counter: DayCounter,
        float_schedule: Schedule,
        float_day_counter: DayCounter,
    ) -> Self {
        Self {
            rate: rate.into(),
            fixed_schedule,
            fixed_day_counter,
            float_schedule,
            float_day_counter,
            spread: 0.0,
            forwarding: CurveRef::Bootstrapped,
            discount: CurveRef::Bootstrapped,
        }
    }

    /// A spot-starting swap of length `tenor`.
    ///
    /// # Errors
    /// Schedule generation failures.
    #[allow(clippy::too_many_arguments)]
    pub fn from_conventions(
        rate: impl Into<QuoteHandle>,
        tenor: Period,
        settlement_days: Natural,
        calendar: &Calendar,
        convention: BusinessDayConvention,
        fixed_frequency: Frequency,
        fixed_day_counter: DayCounter,
        float_tenor: Period,
        float_day_counter: DayCounter,
        evaluation_date: Date,
    ) -> Result<Self> {
        let start = calendar.advance_business_days(evaluation_date, settlement_days as i32);
        let end = start.advance(tenor.length, tenor.unit);
        let leg = |period: Period| {
            ScheduleBuilder::new(start, end, period, calendar.clone())
                .with_convention(convention)
                .with_termination_convention(convention)
                .with_rule(DateGeneration::Backward)
                .build()
        };
        let fixed_schedule = leg(Period::from_frequency(fixed_frequency)?)?;
        let float_schedule = leg(float_tenor)?;
        Ok(Self::new(rate, fixed_schedule, fixed_day_counter, float_schedule, float_day_counter))
    }

    /// Project floating coupons off `curve` instead of the bootstrapped one.
    pub fn with_forwarding_curve(mut self, curve: Arc<dyn YieldTermStructure>) -> Self {
        self.forwarding = CurveRef::External(curve);
        self
    }

    /// Discount on `curve` instead of the bootstrapped one.
    pub fn with_discount_curve(mut self, curve: Arc<dyn YieldTermStructure>) -> Self {
        self.discount = CurveRef::External(curve);
        self
    }

    /// Spread paid on the floating leg.
    pub fn with_spread(mut self, spread: Spread) -> Self {
        self.spread = spread;
        self
    }

    /// The fixed-leg schedule.
    pub fn fixed_schedule(&self) -> &Schedule {
        &self.fixed_schedule
    }

    /// The floating-leg schedule.
    pub fn float_schedule(&self) -> &Schedule {
        &self.float_schedule
    }

    /// Fixed-leg annuity `Σ τᵢ·D(pᵢ)`.
    pub fn annuity(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        let discount = self.discount.resolve(curve);
        self.fixed_schedule.periods().try_fold(0.0, |acc, (start, end)| {
            Ok(acc + self.fixed_day_counter.year_fraction(start, end) * discount.discount_date(end)?)
        })
    }

    /// Present value of the floating leg including the spread.
    pub fn floating_leg_npv(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        let discount = self.discount.resolve(curve);
        let forwarding = self.forwarding.resolve(curve);
        self.float_schedule.periods().try_fold(0.0, |acc, (start, end)| {
            let forward = simple_forward(forwarding, start, end, self.float_day_counter)?;
            let tau = self.float_day_counter.year_fraction(start, end);
            Ok(acc + (forward + self.spread) * tau * discount.discount_date(end)?)
        })
    }
}

impl RateHelper for SwapRateHelper {
    fn pillar_date(&self) -> Date {
        let fixed = self.fixed_schedule.end_date();
        let float = self.float_schedule.end_date();
        fixed.max(float).unwrap_or(Date::MIN)
    }

    fn quote(&self) -> Result<Real> {
        self.rate.value()
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        let annuity = self.annuity(curve)?;
        ql_core::ensure_domain!(annuity.abs() > 0.0, "zero fixed-leg annuity");
        Ok(self.floating_leg_npv(curve)? / annuity)
    }

    fn check_curves(&self) -> Result<()> {
        let pillar = self.pillar_date();
        self.forwarding.check_covers("swap forwarding curve", pillar)?;
        self.discount.check_covers("swap discount curve", pillar)
    }

    fn description(&self) -> String {
        format!(
            "swap {}..{}",
            self.fixed_schedule.start_date().unwrap_or(Date::MIN),
            self.pillar_date()
        )
    }
}

// ── FixedRateBondHelper ───────────────────────────────────────────────────────

/// A fixed-rate bond quoted by clean price per 100 face.
///
/// Used both for bootstrapping and for fitting parametric discount curves.
///
/// Corresponds to `QuantLib::FixedRateBondHelper`.
#[derive(Debug, Clone)]
pub struct FixedRateBondHelper {
    clean_price: QuoteHandle,
    settlement_date: Date,
    day_counter: DayCounter,
    cashflows: Vec<(Date, Real)>,
    accrued: Real,
}

/// Face amount bond prices are quoted against.
pub const BOND_FACE: Real = 100.0;

impl FixedRateBondHelper {
    /// A bullet bond paying `coupon` on each period of `schedule` and
    /// `redemption` (per 100) at maturity, settling on `settlement_date`.
    ///
    /// # Errors
    /// A configuration error when the schedule has no period ending after
    /// the settlement date.
    pub fn new(
        clean_price: impl Into<QuoteHandle>,
        settlement_date: Date,
        schedule: &Schedule,
        coupon: Rate,
        day_counter: DayCounter,
        redemption: Real,
    ) -> Result<Self> {
        let mut cashflows = Vec::with_capacity(schedule.size());
        let mut accrued = 0.0;
        for (start, end) in schedule.periods() {
            if end <= settlement_date {
                continue;
            }
            if start < settlement_date {
                accrued = BOND_FACE * coupon * day_counter.year_fraction(start, settlement_date);
            }
            cashflows.push((end, BOND_FACE * coupon * day_counter.year_fraction(start, end)));
        }
        ql_core::ensure!(
            !cashflows.is_empty(),
            "bond matured before settlement date {settlement_date}"
        );
        if let Some(last) = cashflows.last_mut() {
            last.1 += redemption;
        }
        Ok(Self {
            clean_price: clean_price.into(),
            settlement_date,
            day_counter,
            cashflows,
            accrued,
        })
    }

    /// Settlement date.
    pub fn settlement_date(&self) -> Date {
        self.settlement_date
    }

    /// Maturity (last cash flow) date.
    pub fn maturity_date(&self) -> Date {
        self.pillar_date()
    }

    /// Remaining cash flows per 100 face, redemption included.
    pub fn cashflows(&self) -> &[(Date, Real)] {
        &self.cashflows
    }

    /// Accrued interest at settlement per 100 face.
    pub fn accrued_amount(&self) -> Real {
        self.accrued
    }

    /// Dirty price at settlement given discount factors from `discount`
    /// (a function of the date).
    pub fn dirty_price_with<F>(&self, mut discount: F) -> Result<Real>
    where
        F: FnMut(Date) -> Result<Real>,
    {
        let settlement = discount(self.settlement_date)?;
        ql_core::ensure_domain!(settlement > 0.0, "non-positive discount at settlement");
        let mut pv = 0.0;
        for &(date, amount) in &self.cashflows {
            pv += amount * discount(date)?;
        }
        Ok(pv / settlement)
    }

    /// Clean price implied by `curve`.
    pub fn clean_price(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        Ok(self.dirty_price_with(|d| curve.discount_date(d))? - self.accrued)
    }

    /// Continuously-compounded yield matching the dirty price `dirty`.
    ///
    /// # Errors
    /// A convergence error if no yield reproduces the price.
    pub fn yield_from_dirty(&self, dirty: Real) -> Result<Rate> {
        let times = self.cashflow_times();
        Brent::default().solve(
            |y| {
                Ok(times
                    .iter()
                    .zip(&self.cashflows)
                    .map(|(&t, &(_, amount))| amount * (-y * t).exp())
                    .sum::<Real>()
                    - dirty)
            },
            1.0e-12,
            0.05,
            0.01,
        )
    }

    /// Macaulay duration at the continuously-compounded yield `y`.
    pub fn duration(&self, y: Rate) -> Real {
        let times = self.cashflow_times();
        let (mut pv, mut weighted) = (0.0, 0.0);
        for (&t, &(_, amount)) in times.iter().zip(&self.cashflows) {
            let v = amount * (-y * t).exp();
            pv += v;
            weighted += t * v;
        }
        if pv > 0.0 {
            weighted / pv
        } else {
            0.0
        }
    }

    fn cashflow_times(&self) -> Vec<Time> {
        self.cashflows
            .iter()
            .map(|&(d, _)| self.day_counter.year_fraction(self.settlement_date, d))
            .collect()
    }
}

impl RateHelper for FixedRateBondHelper {
    fn pillar_date(&self) -> Date {
        self.cashflows
            .last()
            .map_or(self.settlement_date, |&(d, _)| d)
    }

    fn quote(&self) -> Result<Real> {
        self.clean_price.value()
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        self.clean_price(curve)
    }

    fn description(&self) -> String {
        format!("bond maturing {}", self.pillar_date())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Simple forward rate between two dates on `curve`.
pub fn simple_forward(curve: &dyn YieldTermStructure, start: Date, end: Date, day_counter: DayCounter) -> Result<Rate> {
    let tau = day_counter.year_fraction(start, end);
    ql_core::ensure_domain!(tau > 0.0, "empty accrual period {start}..{end}");
    Ok((curve.discount_date(start)? / curve.discount_date(end)? - 1.0) / tau)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
