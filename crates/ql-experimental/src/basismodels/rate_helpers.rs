//! Rate helpers for tenor-basis, cross-currency and FX-forward quotes
//! (translates `ql/experimental/basismodels/basisswapratehelpers.hpp` and
//! `fxfwdratehelper.hpp`).
//!
//! Basis helpers quote the spread on one floating leg that makes the swap
//! worth zero.  Because both legs are linear in that spread, the implied
//! quote is solved in closed form once the curves are known:
//!
//! ```text
//! s = (PV(other leg) − PV(spread leg without spread)) / PV01(spread leg)
//! ```
//!
//! Each curve role (forwarding of either index, discounting of either
//! leg) is a [`CurveRef`]: an index without a forwarding curve, or a
//! discount curve left out, is the curve being bootstrapped.

use super::basis_swap::{BasisSwap, BasisSwapEngine};
use ql_cashflows::{CashFlow, IborLegBuilder, Leg, SimpleCashFlow};
use ql_core::{errors::Result, Natural, Real, Spread};
use ql_currencies::Currency;
use ql_indexes::{IborIndex, Index};
use ql_quotes::QuoteHandle;
use ql_termstructures::{CurveRef, RateHelper, YieldTermStructure};
use ql_time::{BusinessDayConvention, Calendar, Date, DateGeneration, Period, Schedule, ScheduleBuilder};
use std::fmt;
use std::sync::Arc;

// ── Floating legs ─────────────────────────────────────────────────────────────

/// A unit-notional, unspread Ibor leg together with the curves it is
/// projected and discounted on.
#[derive(Debug, Clone)]
struct FloatLeg {
    index: Arc<IborIndex>,
    schedule: Schedule,
    payment_calendar: Calendar,
    payment_convention: BusinessDayConvention,
    coupons: Leg,
    forwarding: CurveRef,
    discount: CurveRef,
}

/// Value of a leg per unit of spread and without it, in its own currency.
#[derive(Debug, Clone, Copy)]
struct LegValue {
    /// Coupons at zero spread plus notional exchanges.
    npv: Real,
    /// `Σ N·τ·D`.
    annuity: Real,
}

impl FloatLeg {
    fn new(
        index: Arc<IborIndex>,
        start: Date,
        end: Date,
        payment_calendar: Calendar,
        payment_convention: BusinessDayConvention,
        discount: CurveRef,
    ) -> Result<Self> {
        let schedule = ScheduleBuilder::new(start, end, index.tenor(), payment_calendar.clone())
            .with_convention(payment_convention)
            .with_termination_convention(payment_convention)
            .with_rule(DateGeneration::Backward)
            .build()?;
        let coupons = IborLegBuilder::new(&schedule, Arc::clone(&index))
            .with_payment_calendar(payment_calendar.clone())
            .with_payment_convention(payment_convention)
            .build()?;
        let forwarding = CurveRef::from_option(index.forwarding_curve().cloned());
        Ok(Self {
            index,
            schedule,
            payment_calendar,
            payment_convention,
            coupons,
            forwarding,
            discount,
        })
    }

    fn last_payment(&self) -> Date {
        self.coupons.iter().map(|cf| cf.date()).max().unwrap_or(Date::MIN)
    }

    fn accrual_starts(&self) -> Vec<Date> {
        self.coupons
            .iter()
            .filter_map(|cf| cf.as_coupon().map(|c| c.accrual_start_date()))
            .collect()
    }

    /// Notional exchanges: in and out once, or once per period when the
    /// notional resets.
    fn exchanges(&self, notionals: &[Real], resets: bool) -> Vec<(Date, Real)> {
        let periods: Vec<(Date, Date)> = self
            .coupons
            .iter()
            .filter_map(|cf| cf.as_coupon().map(|c| (c.accrual_start_date(), cf.date())))
            .collect();
        let notional = |k: usize| notionals.get(k).or(notionals.last()).copied().unwrap_or(1.0);
        if resets {
            periods
                .iter()
                .enumerate()
                .flat_map(|(k, &(start, pay))| [(start, -notional(k)), (pay, notional(k))])
                .collect()
        } else {
            match (periods.first(), periods.last()) {
                (Some(&(start, _)), Some(&(_, pay))) => {
                    vec![(start, -notional(0)), (pay, notional(periods.len() - 1))]
                }
                _ => Vec::new(),
            }
        }
    }

    fn value(
        &self,
        curve: &dyn YieldTermStructure,
        notionals: &[Real],
        exchanges: &[(Date, Real)],
    ) -> Result<LegValue> {
        let forwarding = self.forwarding.resolve(curve);
        let discount = self.discount.resolve(curve);
        let mut value = LegValue { npv: 0.0, annuity: 0.0 };
        for (k, cf) in self.coupons.iter().enumerate() {
            let notional = notionals.get(k).or(notionals.last()).copied().unwrap_or(1.0);
            let df = discount.discount_date(cf.date())?;
            value.npv += notional * cf.amount_on(forwarding)? * df;
            if let Some(coupon) = cf.as_coupon() {
                value.annuity += notional * coupon.accrual_period() * df;
            }
        }
        for &(date, amount) in exchanges {
            value.npv += amount * discount.discount_date(date)?;
        }
        Ok(value)
    }

    /// The leg with the index bound to its forwarding curve, the given
    /// notionals and spread, plus notional exchanges.
    fn rebuild(
        &self,
        curve: &Arc<dyn YieldTermStructure>,
        notionals: Vec<Real>,
        spread: Spread,
        exchanges: &[(Date, Real)],
    ) -> Result<Leg> {
        let forwarding = match &self.forwarding {
            CurveRef::Bootstrapped => Arc::clone(curve),
            CurveRef::External(external) => Arc::clone(external),
        };
        let index = Arc::new(self.index.with_forwarding(forwarding));
        let mut leg = IborLegBuilder::new(&self.schedule, index)
            .with_notionals(notionals)
            .with_spread(spread)
            .with_payment_calendar(self.payment_calendar.clone())
            .with_payment_convention(self.payment_convention)
            .build()?;
        leg.extend(
            exchanges
                .iter()
                .map(|&(date, amount)| Arc::new(SimpleCashFlow::new(amount, date)) as Arc<dyn CashFlow>),
        );
        Ok(leg)
    }

    fn discount_curve(&self, curve: &Arc<dyn YieldTermStructure>) -> Arc<dyn YieldTermStructure> {
        match &self.discount {
            CurveRef::Bootstrapped => Arc::clone(curve),
            CurveRef::External(external) => Arc::clone(external),
        }
    }

    fn check_curves(&self, pillar: Date) -> Result<()> {
        let name = self.index.name();
        self.forwarding.check_covers(&format!("{name} forwarding"), pillar)?;
        self.discount.check_covers(&format!("{name} discount"), pillar)
    }
}

/// Spread on the spread leg that zeroes `sign_s·fx_s·(V_s + s·A_s) + sign_o·fx_o·V_o`.
fn breakeven_spread(spread_leg: (Real, Real, LegValue), other_leg: (Real, Real, LegValue)) -> Result<Spread> {
    let (sign_s, fx_s, spread_value) = spread_leg;
    let (sign_o, fx_o, other_value) = other_leg;
    let pv01 = sign_s * fx_s * spread_value.annuity;
    ql_core::ensure_domain!(pv01.abs() > 0.0, "spread leg has zero annuity");
    Ok(-(sign_o * fx_o * other_value.npv + sign_s * fx_s * spread_value.npv) / pv01)
}

// ── TenorSwapRateHelper ───────────────────────────────────────────────────────

/// A single-currency swap of two Ibor legs of different tenors, quoted by
/// the spread on one of them.  Both legs discount on the same curve.
///
/// Corresponds to `QuantLib::TenorSwapRateHelper`.
#[derive(Debug, Clone)]
pub struct TenorSwapRateHelper {
    rate: QuoteHandle,
    pay: FloatLeg,
    rec: FloatLeg,
    spread_on_rec_leg: bool,
}

impl TenorSwapRateHelper {
    /// A swap of length `tenor` starting `fwd_start` after the pay index's
    /// spot date.  Leg schedules follow each index's tenor; a missing
    /// forwarding or discount curve is the bootstrapped one.
    ///
    /// # Errors
    /// Schedule generation failures.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rate: impl Into<QuoteHandle>,
        tenor: Period,
        fwd_start: Period,
        payment_calendar: Calendar,
        payment_convention: BusinessDayConvention,
        spread_on_rec_leg: bool,
        pay_index: Arc<IborIndex>,
        rec_index: Arc<IborIndex>,
        discount_curve: Option<Arc<dyn YieldTermStructure>>,
        evaluation_date: Date,
    ) -> Result<Self> {
        let spot = pay_index.value_date(evaluation_date);
        let start = payment_calendar.advance_period(spot, fwd_start, payment_convention, false);
        let end = start.advance(tenor.length, tenor.unit);
        let discount = CurveRef::from_option(discount_curve);
        let pay = FloatLeg::new(
            pay_index,
            start,
            end,
            payment_calendar.clone(),
            payment_convention,
            discount.clone(),
        )?;
        let rec = FloatLeg::new(rec_index, start, end, payment_calendar, payment_convention, discount)?;
        Ok(Self {
            rate: rate.into(),
            pay,
            rec,
            spread_on_rec_leg,
        })
    }

    fn implied_spread(&self, curve: &dyn YieldTermStructure) -> Result<Spread> {
        let pay = self.pay.value(curve, &[1.0], &[])?;
        let rec = self.rec.value(curve, &[1.0], &[])?;
        if self.spread_on_rec_leg {
            breakeven_spread((1.0, 1.0, rec), (-1.0, 1.0, pay))
        } else {
            breakeven_spread((-1.0, 1.0, pay), (1.0, 1.0, rec))
        }
    }

    /// The quoted swap, valued on `curve` where it is bootstrapped.
    ///
    /// # Errors
    /// An invalid quote or leg construction failures.
    pub fn basis_swap(&self, curve: &Arc<dyn YieldTermStructure>) -> Result<BasisSwap> {
        let spread = self.rate.value()?;
        let (pay_spread, rec_spread) = if self.spread_on_rec_leg { (0.0, spread) } else { (spread, 0.0) };
        let legs = vec![
            self.pay.rebuild(curve, vec![1.0], pay_spread, &[])?,
            self.rec.rebuild(curve, vec![1.0], rec_spread, &[])?,
        ];
        BasisSwap::new(legs, vec![true, false], usize::from(self.spread_on_rec_leg), true)
    }

    /// An engine valuing [`basis_swap`](Self::basis_swap) on the same
    /// curves the helper uses.
    ///
    /// # Errors
    /// Engine construction failures.
    pub fn engine(&self, curve: &Arc<dyn YieldTermStructure>) -> Result<BasisSwapEngine> {
        let discount = self.pay.discount_curve(curve);
        Ok(BasisSwapEngine::new(vec![Arc::clone(&discount), discount], vec![1.0, 1.0])?
            .include_settlement_date_flows(true))
    }
}

impl RateHelper for TenorSwapRateHelper {
    fn pillar_date(&self) -> Date {
        self.pay.last_payment().max(self.rec.last_payment())
    }

    fn quote(&self) -> Result<Real> {
        self.rate.value()
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        self.implied_spread(curve)
    }

    fn check_curves(&self) -> Result<()> {
        let pillar = self.pillar_date();
        self.pay.check_curves(pillar)?;
        self.rec.check_curves(pillar)
    }

    fn description(&self) -> String {
        format!(
            "tenor basis {}/{} {}..{}",
            self.pay.index.tenor(),
            self.rec.index.tenor(),
            self.pay.schedule.start_date().unwrap_or(Date::MIN),
            self.pillar_date()
        )
    }
}

// ── XCCYSwapRateHelper ────────────────────────────────────────────────────────

/// A cross-currency basis swap: two Ibor legs in different currencies with
/// notional exchanges, quoted by the spread on one leg.
///
/// Leg notionals are one unit of the common currency converted with
/// today's FX FOR/DOM rates.  With `fx_resetable`, the notional of the leg
/// without spread resets every period at the forward FX rate implied by
/// the two discount curves.
///
/// Corresponds to `QuantLib::XCCYSwapRateHelper`.
#[derive(Debug, Clone)]
pub struct XCCYSwapRateHelper {
    rate: QuoteHandle,
    pay: FloatLeg,
    rec: FloatLeg,
    spread_on_rec_leg: bool,
    pay_fx_for_dom: Real,
    rec_fx_for_dom: Real,
    fx_resetable: bool,
}

/// Notionals and exchanges of both legs for one set of curves.
struct XccyFlows {
    pay_notionals: Vec<Real>,
    rec_notionals: Vec<Real>,
    pay_exchanges: Vec<(Date, Real)>,
    rec_exchanges: Vec<(Date, Real)>,
}

impl XCCYSwapRateHelper {
    /// A swap of length `tenor` starting `fwd_start` after spot, the later
    /// of the two indexes' spot dates on `spot_start_calendar`.  Each leg
    /// rolls on its index's calendar with its own convention.
    ///
    /// # Errors
    /// Non-positive FX rates or schedule generation failures.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rate: impl Into<QuoteHandle>,
        tenor: Period,
        fwd_start: Period,
        spot_start_calendar: Calendar,
        pay_convention: BusinessDayConvention,
        rec_convention: BusinessDayConvention,
        spread_on_rec_leg: bool,
        pay_index: Arc<IborIndex>,
        rec_index: Arc<IborIndex>,
        pay_discount: Option<Arc<dyn YieldTermStructure>>,
        rec_discount: Option<Arc<dyn YieldTermStructure>>,
        pay_fx_for_dom: Real,
        rec_fx_for_dom: Real,
        fx_resetable: bool,
        evaluation_date: Date,
    ) -> Result<Self> {
        ql_core::ensure!(
            pay_fx_for_dom > 0.0 && rec_fx_for_dom > 0.0,
            "FX rates must be positive (pay {pay_fx_for_dom}, rec {rec_fx_for_dom})"
        );
        let spot_lag = pay_index.fixing_days().max(rec_index.fixing_days());
        let spot = spot_start_calendar.advance_business_days(evaluation_date, spot_lag as i32);
        let start = spot_start_calendar.advance_period(spot, fwd_start, BusinessDayConvention::Following, false);
        let end = start.advance(tenor.length, tenor.unit);
        let pay_calendar = pay_index.fixing_calendar().clone();
        let rec_calendar = rec_index.fixing_calendar().clone();
        let pay = FloatLeg::new(
            pay_index,
            start,
            end,
            pay_calendar,
            pay_convention,
            CurveRef::from_option(pay_discount),
        )?;
        let rec = FloatLeg::new(
            rec_index,
            start,
            end,
            rec_calendar,
            rec_convention,
            CurveRef::from_option(rec_discount),
        )?;
        Ok(Self {
            rate: rate.into(),
            pay,
            rec,
            spread_on_rec_leg,
            pay_fx_for_dom,
            rec_fx_for_dom,
            fx_resetable,
        })
    }

    /// Whether the leg without spread resets its notional.
    pub fn fx_resetable(&self) -> bool {
        self.fx_resetable
    }

    fn flows(&self, curve: &dyn YieldTermStructure) -> Result<XccyFlows> {
        let pay_notional = 1.0 / self.pay_fx_for_dom;
        let rec_notional = 1.0 / self.rec_fx_for_dom;
        let (mut pay_notionals, mut rec_notionals) = (vec![pay_notional], vec![rec_notional]);
        if self.fx_resetable {
            let (spread_leg, other_leg, other_notional) = if self.spread_on_rec_leg {
                (&self.rec, &self.pay, pay_notional)
            } else {
                (&self.pay, &self.rec, rec_notional)
            };
            let spread_discount = spread_leg.discount.resolve(curve);
            let other_discount = other_leg.discount.resolve(curve);
            let resets = other_leg
                .accrual_starts()
                .into_iter()
                .map(|start| {
                    let fx_ratio = spread_discount.discount_date(start)? / other_discount.discount_date(start)?;
                    Ok(other_notional * fx_ratio)
                })
                .collect::<Result<Vec<_>>>()?;
            if self.spread_on_rec_leg {
                pay_notionals = resets;
            } else {
                rec_notionals = resets;
            }
        }
        let pay_resets = self.fx_resetable && self.spread_on_rec_leg;
        let rec_resets = self.fx_resetable && !self.spread_on_rec_leg;
        Ok(XccyFlows {
            pay_exchanges: self.pay.exchanges(&pay_notionals, pay_resets),
            rec_exchanges: self.rec.exchanges(&rec_notionals, rec_resets),
            pay_notionals,
            rec_notionals,
        })
    }

    /// The quoted swap, valued on `curve` where it is bootstrapped.
    ///
    /// # Errors
    /// An invalid quote, curve range errors or leg construction failures.
    pub fn basis_swap(&self, curve: &Arc<dyn YieldTermStructure>) -> Result<BasisSwap> {
        let spread = self.rate.value()?;
        let flows = self.flows(curve.as_ref())?;
        let (pay_spread, rec_spread) = if self.spread_on_rec_leg { (0.0, spread) } else { (spread, 0.0) };
        let legs = vec![
            self.pay
                .rebuild(curve, flows.pay_notionals, pay_spread, &flows.pay_exchanges)?,
            self.rec
                .rebuild(curve, flows.rec_notionals, rec_spread, &flows.rec_exchanges)?,
        ];
        BasisSwap::new(legs, vec![true, false], usize::from(self.spread_on_rec_leg), true)
    }

    /// An engine valuing [`basis_swap`](Self::basis_swap) on each leg's
    /// discount curve and today's FX rates.
    ///
    /// # Errors
    /// Engine construction failures.
    pub fn engine(&self, curve: &Arc<dyn YieldTermStructure>) -> Result<BasisSwapEngine> {
        Ok(BasisSwapEngine::new(
            vec![self.pay.discount_curve(curve), self.rec.discount_curve(curve)],
            vec![self.pay_fx_for_dom, self.rec_fx_for_dom],
        )?
        .include_settlement_date_flows(true))
    }
}

impl RateHelper for XCCYSwapRateHelper {
    fn pillar_date(&self) -> Date {
        self.pay.last_payment().max(self.rec.last_payment())
    }

    fn quote(&self) -> Result<Real> {
        self.rate.value()
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        let flows = self.flows(curve)?;
        let pay = self.pay.value(curve, &flows.pay_notionals, &flows.pay_exchanges)?;
        let rec = self.rec.value(curve, &flows.rec_notionals, &flows.rec_exchanges)?;
        let pay = (-1.0, self.pay_fx_for_dom, pay);
        let rec = (1.0, self.rec_fx_for_dom, rec);
        if self.spread_on_rec_leg {
            breakeven_spread(rec, pay)
        } else {
            breakeven_spread(pay, rec)
        }
    }

    fn check_curves(&self) -> Result<()> {
        let pillar = self.pillar_date();
        self.pay.check_curves(pillar)?;
        self.rec.check_curves(pillar)
    }

    fn description(&self) -> String {
        format!(
            "xccy basis {}/{} {}..{}",
            self.pay.index.currency(),
            self.rec.index.currency(),
            self.pay.schedule.start_date().unwrap_or(Date::MIN),
            self.pillar_date()
        )
    }
}

// ── FxFwdRateHelper ───────────────────────────────────────────────────────────

/// Which discount curve an [`FxFwdRateHelper`] bootstraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FxBootstrap {
    /// The base-currency curve; the counter curve is given.
    Base,
    /// The counter-currency curve; the base curve is given.
    Counter,
}

impl fmt::Display for FxBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FxBootstrap::Base => "base",
            FxBootstrap::Counter => "counter",
        })
    }
}

/// An FX forward quoted in points over spot.
///
/// The spot rate is units of counter currency per unit of base currency.
/// By covered interest parity the forward to maturity `T` from the spot
/// date `S` is `spot·(D_base(T)/D_base(S))/(D_counter(T)/D_counter(S))`,
/// and the implied quote is `(forward − spot)·unit`.
///
/// Corresponds to `QuantLib::FxFwdRateHelper`.
#[derive(Debug, Clone)]
pub struct FxFwdRateHelper {
    base_currency: Currency,
    counter_currency: Currency,
    fx_spot: Real,
    spot_date: Date,
    maturity_date: Date,
    points: QuoteHandle,
    unit: Real,
    base_discount: CurveRef,
    counter_discount: CurveRef,
    bootstrap: FxBootstrap,
}

impl FxFwdRateHelper {
    /// An FX swap of length `swap_term` from the spot date, `spot_lag`
    /// business days after `evaluation_date`.
    ///
    /// # Errors
    /// Identical currencies, a non-positive spot or unit, a curve given for
    /// the side being bootstrapped, or [`ql_core::Error::MissingCurve`] when
    /// the other side's curve is absent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_currency: Currency,
        counter_currency: Currency,
        fx_spot: Real,
        spot_lag: Natural,
        spot_lag_calendar: &Calendar,
        spot_lag_convention: BusinessDayConvention,
        swap_term: Period,
        points: impl Into<QuoteHandle>,
        unit: Real,
        base_discount: Option<Arc<dyn YieldTermStructure>>,
        counter_discount: Option<Arc<dyn YieldTermStructure>>,
        bootstrap: FxBootstrap,
        evaluation_date: Date,
    ) -> Result<Self> {
        ql_core::ensure!(
            base_currency != counter_currency,
            "base and counter currency are both {base_currency}"
        );
        ql_core::ensure!(fx_spot > 0.0, "FX spot must be positive, got {fx_spot}");
        ql_core::ensure!(unit > 0.0, "points unit must be positive, got {unit}");
        let (bootstrapped, given, given_currency) = match bootstrap {
            FxBootstrap::Base => (&base_discount, &counter_discount, counter_currency),
            FxBootstrap::Counter => (&counter_discount, &base_discount, base_currency),
        };
        ql_core::ensure!(
            bootstrapped.is_none(),
            "the {bootstrap} discount curve is bootstrapped and cannot be given"
        );
        let spot_date = spot_lag_calendar.adjust(
            spot_lag_calendar.advance_business_days(evaluation_date, spot_lag as i32),
            spot_lag_convention,
        );
        let maturity_date = spot_lag_calendar.advance_period(spot_date, swap_term, spot_lag_convention, false);
        if given.is_none() {
            return Err(ql_core::Error::MissingCurve {
                curve: format!("{given_currency} discount"),
                date: maturity_date.to_string(),
            });
        }
        Ok(Self {
            base_currency,
            counter_currency,
            fx_spot,
            spot_date,
            maturity_date,
            points: points.into(),
            unit,
            base_discount: CurveRef::from_option(base_discount),
            counter_discount: CurveRef::from_option(counter_discount),
            bootstrap,
        })
    }

    /// Spot settlement date.
    pub fn spot_date(&self) -> Date {
        self.spot_date
    }

    /// Which curve is bootstrapped.
    pub fn bootstrap(&self) -> FxBootstrap {
        self.bootstrap
    }

    /// Outright forward implied by the curves.
    ///
    /// # Errors
    /// Range errors from the curves.
    pub fn forward(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        let base = self.base_discount.resolve(curve);
        let counter = self.counter_discount.resolve(curve);
        let base_growth = base.discount_date(self.maturity_date)? / base.discount_date(self.spot_date)?;
        let counter_growth = counter.discount_date(self.maturity_date)? / counter.discount_date(self.spot_date)?;
        Ok(self.fx_spot * base_growth / counter_growth)
    }
}

impl RateHelper for FxFwdRateHelper {
    fn pillar_date(&self) -> Date {
        self.maturity_date
    }

    fn quote(&self) -> Result<Real> {
        self.points.value()
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        Ok((self.forward(curve)? - self.fx_spot) * self.unit)
    }

    fn check_curves(&self) -> Result<()> {
        self.base_discount
            .check_covers(&format!("{} discount", self.base_currency), self.maturity_date)?;
        self.counter_discount
            .check_covers(&format!("{} discount", self.counter_currency), self.maturity_date)
    }

    fn description(&self) -> String {
        format!(
            "FX forward {}{} {}..{}",
            self.base_currency, self.counter_currency, self.spot_date, self.maturity_date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::ErrorKind;
    use ql_indexes::{euribor, usd_libor};
    use ql_instruments::PricingEngine;
    use ql_termstructures::{FlatForward, ForwardSpreadedTermStructure};
    use ql_time::{DayCounter, TimeUnit};

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn flat(rate: Real) -> Arc<dyn YieldTermStructure> {
        Arc::new(FlatForward::continuous(today(), rate, DayCounter::Actual365Fixed))
    }

    #[test]
    fn tenor_spread_is_the_forward_gap() {
        let ois = flat(0.02);
        let fwd3m: Arc<dyn YieldTermStructure> = Arc::new(ForwardSpreadedTermStructure::new(ois.clone(), 0.001));
        let fwd6m: Arc<dyn YieldTermStructure> = Arc::new(ForwardSpreadedTermStructure::new(ois.clone(), 0.003));
        let helper = TenorSwapRateHelper::new(
            0.0,
            Period::new(5, TimeUnit::Years),
            Period::new(0, TimeUnit::Days),
            Calendar::WeekendsOnly,
            BusinessDayConvention::ModifiedFollowing,
            false,
            Arc::new(euribor(Period::new(3, TimeUnit::Months)).with_forwarding(fwd3m)),
            Arc::new(euribor(Period::new(6, TimeUnit::Months)).with_forwarding(fwd6m)),
            Some(ois.clone()),
            today(),
        )
        .unwrap();
        let spread = helper.implied_quote(ois.as_ref()).unwrap();
        assert!(spread > 0.0015 && spread < 0.0025, "spread {spread}");
        assert!(helper.description().starts_with("tenor basis 3M/6M"));
    }

    #[test]
    fn xccy_spread_vanishes_without_basis() {
        let usd = flat(0.04);
        let eur = flat(0.02);
        for resets in [false, true] {
            let helper = XCCYSwapRateHelper::new(
                0.0,
                Period::new(3, TimeUnit::Years),
                Period::new(0, TimeUnit::Days),
                Calendar::WeekendsOnly,
                BusinessDayConvention::ModifiedFollowing,
                BusinessDayConvention::ModifiedFollowing,
                true,
                Arc::new(usd_libor(Period::new(3, TimeUnit::Months)).with_forwarding(usd.clone())),
                Arc::new(euribor(Period::new(3, TimeUnit::Months)).with_forwarding(eur.clone())),
                Some(usd.clone()),
                Some(eur.clone()),
                1.0,
                1.1,
                resets,
                today(),
            )
            .unwrap();
            assert_abs_diff_eq!(helper.implied_quote(usd.as_ref()).unwrap(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn tenor_breakeven_swap_is_worth_nothing() {
        let ois = flat(0.02);
        let fwd6m: Arc<dyn YieldTermStructure> = Arc::new(ForwardSpreadedTermStructure::new(ois.clone(), 0.002));
        let pay_index = Arc::new(euribor(Period::new(6, TimeUnit::Months)).with_forwarding(fwd6m));
        let rec_index = Arc::new(euribor(Period::new(3, TimeUnit::Months)).with_forwarding(ois.clone()));
        let build = |quote: Real| {
            TenorSwapRateHelper::new(
                quote,
                Period::new(4, TimeUnit::Years),
                Period::new(1, TimeUnit::Years),
                Calendar::WeekendsOnly,
                BusinessDayConvention::ModifiedFollowing,
                true,
                Arc::clone(&pay_index),
                Arc::clone(&rec_index),
                Some(ois.clone()),
                today(),
            )
            .unwrap()
        };
        let implied = build(0.0).implied_quote(ois.as_ref()).unwrap();
        let helper = build(implied);
        let swap = helper.basis_swap(&ois).unwrap();
        let results = helper.engine(&ois).unwrap().calculate(&swap).unwrap();
        assert_abs_diff_eq!(results.npv, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(results.par_spread.unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn fx_forward_follows_parity() {
        let usd = flat(0.04);
        let eur = flat(0.02);
        let helper = FxFwdRateHelper::new(
            Currency::EUR,
            Currency::USD,
            1.10,
            2,
            &Calendar::WeekendsOnly,
            BusinessDayConvention::Following,
            Period::new(1, TimeUnit::Years),
            0.0,
            10_000.0,
            None,
            Some(usd.clone()),
            FxBootstrap::Base,
            today(),
        )
        .unwrap();
        let t = DayCounter::Actual365Fixed.year_fraction(helper.spot_date(), helper.pillar_date());
        let expected = 1.10 * ((0.04 - 0.02) * t).exp();
        assert_abs_diff_eq!(helper.forward(eur.as_ref()).unwrap(), expected, epsilon = 1e-12);
        assert!(helper.implied_quote(eur.as_ref()).unwrap() > 200.0);
    }

    #[test]
    fn fx_forward_needs_the_other_curve() {
        let err = FxFwdRateHelper::new(
            Currency::EUR,
            Currency::USD,
            1.10,
            2,
            &Calendar::WeekendsOnly,
            BusinessDayConvention::Following,
            Period::new(1, TimeUnit::Years),
            0.0,
            10_000.0,
            None,
            None,
            FxBootstrap::Base,
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, ql_core::Error::MissingCurve { .. }));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
