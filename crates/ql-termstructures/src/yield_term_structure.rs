//! `YieldTermStructure` — interest-rate term structures
//! (translates `ql/termstructures/yieldtermstructure.hpp`).
//!
//! Implementors provide the discount factor `discount_impl(t)`; zero rates,
//! forward rates and instantaneous forwards follow from it.  All public
//! accessors range-check their inputs and apply the structure's jumps.

use crate::term_structure::TermStructure;
use ql_core::{errors::Result, Compounding, DiscountFactor, Rate, Real, Time};
use ql_quotes::QuoteHandle;
use ql_time::{Date, DayCounter, Frequency, InterestRate};

/// Time step used to turn instantaneous quantities into finite ones.
const DT: Time = 1.0e-4;

/// An interest-rate term structure.
///
/// Corresponds to `QuantLib::YieldTermStructure`.
pub trait YieldTermStructure: TermStructure {
    /// Discount factor at `t`, without range checks or jumps.
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor>;

    /// Product of the jumps falling in `(0, t]`.
    fn jump_factor(&self, _t: Time) -> Result<Real> {
        Ok(1.0)
    }

    /// Instantaneous forward rate at `t`, without range checks.
    ///
    /// Default: central difference of `−ln D`.
    fn forward_impl(&self, t: Time) -> Result<Rate> {
        let t1 = (t - DT / 2.0).max(0.0);
        let t2 = t1 + DT;
        let d1 = self.discount_impl(t1)? * self.jump_factor(t1)?;
        let d2 = self.discount_impl(t2)? * self.jump_factor(t2)?;
        Ok((d1 / d2).ln() / DT)
    }

    // ── Discount factors ─────────────────────────────────────────────────

    /// Discount factor at `t`, optionally extrapolating for this query.
    fn discount_with(&self, t: Time, extrapolate: bool) -> Result<DiscountFactor> {
        self.check_range(t, extrapolate)?;
        Ok(self.discount_impl(t)? * self.jump_factor(t)?)
    }

    /// Discount factor at `t`.
    fn discount(&self, t: Time) -> Result<DiscountFactor> {
        self.discount_with(t, false)
    }

    /// Discount factor at `date`.
    fn discount_date(&self, date: Date) -> Result<DiscountFactor> {
        self.check_range_date(date, false)?;
        self.discount_with(self.time_from_reference(date), true)
    }

    /// Discount factor at `date`, optionally extrapolating.
    fn discount_date_with(&self, date: Date, extrapolate: bool) -> Result<DiscountFactor> {
        self.check_range_date(date, extrapolate)?;
        self.discount_with(self.time_from_reference(date), true)
    }

    // ── Zero rates ───────────────────────────────────────────────────────

    /// Zero rate to `t` under the given conventions, with the curve's day
    /// counter.  At `t = 0` the rate over a short interval is returned.
    fn zero_rate(&self, t: Time, comp: Compounding, freq: Frequency) -> Result<InterestRate> {
        self.check_range(t, false)?;
        let t = if t == 0.0 { DT } else { t };
        let compound = 1.0 / self.discount_with(t, true)?;
        InterestRate::implied_rate(compound, self.day_counter(), comp, freq, t)
    }

    /// Zero rate to `date` measured with `day_counter`.
    fn zero_rate_date(
        &self,
        date: Date,
        day_counter: DayCounter,
        comp: Compounding,
        freq: Frequency,
    ) -> Result<InterestRate> {
        if date == self.reference_date() {
            let compound = 1.0 / self.discount_with(DT, true)?;
            return InterestRate::implied_rate(compound, day_counter, comp, freq, DT);
        }
        let compound = 1.0 / self.discount_date(date)?;
        let t = day_counter.year_fraction(self.reference_date(), date);
        InterestRate::implied_rate(compound, day_counter, comp, freq, t)
    }

    // ── Forward rates ────────────────────────────────────────────────────

    /// Forward rate between `t1` and `t2` under the given conventions.  If
    /// the times coincide a short interval around them is used.
    fn forward_rate(&self, t1: Time, t2: Time, comp: Compounding, freq: Frequency) -> Result<InterestRate> {
        ql_core::ensure_domain!(t2 >= t1, "t2 ({t2}) < t1 ({t1})");
        self.check_range(t2, false)?;
        let (t1, t2) = if t2 == t1 {
            let lo = (t1 - DT / 2.0).max(0.0);
            (lo, lo + DT)
        } else {
            (t1, t2)
        };
        let compound = self.discount_with(t1, true)? / self.discount_with(t2, true)?;
        InterestRate::implied_rate(compound, self.day_counter(), comp, freq, t2 - t1)
    }

    /// Forward rate between two dates, accrued with `day_counter`.
    fn forward_rate_dates(
        &self,
        d1: Date,
        d2: Date,
        day_counter: DayCounter,
        comp: Compounding,
        freq: Frequency,
    ) -> Result<InterestRate> {
        ql_core::ensure_domain!(d2 >= d1, "d2 ({d2}) < d1 ({d1})");
        if d1 == d2 {
            let t = self.time_from_reference(d1);
            return self
                .forward_rate(t, t, comp, freq)
                .map(|r| InterestRate::new(r.rate(), day_counter, comp, freq));
        }
        let compound = self.discount_date(d1)? / self.discount_date(d2)?;
        InterestRate::implied_rate(compound, day_counter, comp, freq, day_counter.year_fraction(d1, d2))
    }

    /// Instantaneous continuously-compounded forward rate at `t`.
    fn instantaneous_forward(&self, t: Time) -> Result<Rate> {
        self.check_range(t, false)?;
        self.forward_impl(t)
    }
}

// ── Jumps ─────────────────────────────────────────────────────────────────────

/// Discrete multiplicative jumps in the discount function, e.g. turn-of-year
/// effects.  A jump with value `J` at time `τ` multiplies every discount
/// factor with `t ≥ τ` by `J`.
#[derive(Debug, Clone, Default)]
pub struct Jumps {
    quotes: Vec<QuoteHandle>,
    dates: Vec<Date>,
    times: Vec<Time>,
}

impl Jumps {
    /// No jumps.
    pub fn none() -> Self {
        Self::default()
    }

    /// Jumps at the given dates.  With no dates, jumps fall on consecutive
    /// year ends starting with the reference year.
    ///
    /// # Errors
    /// The number of dates, when given, must match the number of quotes.
    pub fn new(
        quotes: Vec<QuoteHandle>,
        dates: Vec<Date>,
        reference_date: Date,
        day_counter: DayCounter,
    ) -> Result<Self> {
        let dates = if dates.is_empty() {
            (0..quotes.len())
                .map(|i| Date::from_ymd(reference_date.year() + i as i32, 12, 31))
                .collect::<Result<Vec<_>>>()?
        } else {
            ql_core::ensure!(
                dates.len() == quotes.len(),
                "mismatch between number of jumps ({}) and jump dates ({})",
                quotes.len(),
                dates.len()
            );
            dates
        };
        let times = dates
            .iter()
            .map(|&d| day_counter.year_fraction(reference_date, d))
            .collect();
        Ok(Self {
            quotes,
            dates,
            times,
        })
    }

    /// `true` if there are no jumps.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Jump dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Jump times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Jump quotes.
    pub fn quotes(&self) -> &[QuoteHandle] {
        &self.quotes
    }

    /// Product of the jumps in `(0, t]`.
    ///
    /// # Errors
    /// An invalid quote, or a non-positive jump value (domain error).
    pub fn factor(&self, t: Time) -> Result<Real> {
        let mut factor = 1.0;
        for (quote, &tau) in self.quotes.iter().zip(&self.times) {
            if tau > 0.0 && tau <= t {
                let j = quote.value()?;
                ql_core::ensure_domain!(j > 0.0, "invalid jump value {j} at time {tau}");
                factor *= j;
            }
        }
        Ok(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat_forward::FlatForward;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::ErrorKind;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn rates_follow_from_discounts() {
        let curve = FlatForward::continuous(date(2025, 1, 2), 0.03, DayCounter::Actual365Fixed);
        let z = curve.zero_rate(2.0, Compounding::Continuous, Frequency::NoFrequency).unwrap();
        assert_abs_diff_eq!(z.rate(), 0.03, epsilon = 1e-12);
        let z0 = curve.zero_rate(0.0, Compounding::Continuous, Frequency::NoFrequency).unwrap();
        assert_abs_diff_eq!(z0.rate(), 0.03, epsilon = 1e-10);
        let f = curve.forward_rate(1.0, 3.0, Compounding::Simple, Frequency::Annual).unwrap();
        assert_abs_diff_eq!(f.rate(), ((0.06_f64).exp() - 1.0) / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.instantaneous_forward(5.0).unwrap(), 0.03, epsilon = 1e-8);
    }

    #[test]
    fn jumps_default_to_year_ends() {
        let jumps = Jumps::new(
            vec![QuoteHandle::from(0.999), QuoteHandle::from(0.998)],
            vec![],
            date(2025, 6, 30),
            DayCounter::Actual365Fixed,
        )
        .unwrap();
        assert_eq!(jumps.dates(), &[date(2025, 12, 31), date(2026, 12, 31)]);
        assert_eq!(jumps.factor(0.1).unwrap(), 1.0);
        assert_abs_diff_eq!(jumps.factor(1.0).unwrap(), 0.999, epsilon = 1e-15);
        assert_abs_diff_eq!(jumps.factor(2.0).unwrap(), 0.999 * 0.998, epsilon = 1e-15);
    }

    #[test]
    fn invalid_jump_is_a_domain_error() {
        let jumps = Jumps::new(
            vec![QuoteHandle::from(-0.5)],
            vec![date(2025, 12, 31)],
            date(2025, 1, 2),
            DayCounter::Actual365Fixed,
        )
        .unwrap();
        assert_eq!(jumps.factor(2.0).unwrap_err().kind(), ErrorKind::Domain);
        assert!(Jumps::new(vec![QuoteHandle::from(0.99)], vec![date(2025, 3, 1), date(2025, 4, 1)], date(2025, 1, 2), DayCounter::Actual360).is_err());
    }
}
