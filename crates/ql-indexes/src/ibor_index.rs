//! `IborIndex` — interbank offered-rate index (translates `ql/indexes/iborindex.hpp`).

use crate::index::{FixingStore, Index};
use ql_core::{
    errors::{Error, Result},
    Natural, Rate, Real,
};
use ql_currencies::Currency;
use ql_termstructures::YieldTermStructure;
use ql_time::{BusinessDayConvention, Calendar, Date, DayCounter, Period};
use std::fmt;
use std::sync::Arc;

/// An interbank offered-rate index (Euribor, LIBOR and the like).
///
/// Corresponds to `QuantLib::IborIndex`.  The forwarding curve is optional:
/// without one the index can only return stored fixings, and callers that
/// forecast against some other curve use [`forecast_fixing_on`](Self::forecast_fixing_on).
#[derive(Clone)]
pub struct IborIndex {
    family: String,
    tenor: Period,
    fixing_days: Natural,
    currency: Currency,
    calendar: Calendar,
    convention: BusinessDayConvention,
    end_of_month: bool,
    day_counter: DayCounter,
    forwarding: Option<Arc<dyn YieldTermStructure>>,
    fixings: FixingStore,
}

impl IborIndex {
    /// An index without a forwarding curve.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        family: impl Into<String>,
        tenor: Period,
        fixing_days: Natural,
        currency: Currency,
        calendar: Calendar,
        convention: BusinessDayConvention,
        end_of_month: bool,
        day_counter: DayCounter,
    ) -> Self {
        Self {
            family: family.into(),
            tenor,
            fixing_days,
            currency,
            calendar,
            convention,
            end_of_month,
            day_counter,
            forwarding: None,
            fixings: FixingStore::new(),
        }
    }

    /// The same index forecasting from `curve`.  The fixing store is shared
    /// with `self`.
    pub fn with_forwarding(&self, curve: Arc<dyn YieldTermStructure>) -> Self {
        Self {
            forwarding: Some(curve),
            ..self.clone()
        }
    }

    /// Family name, e.g. `"Euribor"`.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Tenor of the underlying deposit.
    pub fn tenor(&self) -> Period {
        self.tenor
    }

    /// Business days between fixing and value date.
    pub fn fixing_days(&self) -> Natural {
        self.fixing_days
    }

    /// Currency of the index.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Business-day convention for the maturity date.
    pub fn business_day_convention(&self) -> BusinessDayConvention {
        self.convention
    }

    /// Whether maturities roll to month ends.
    pub fn end_of_month(&self) -> bool {
        self.end_of_month
    }

    /// Accrual day counter.
    pub fn day_counter(&self) -> DayCounter {
        self.day_counter
    }

    /// The forwarding curve, if any.
    pub fn forwarding_curve(&self) -> Option<&Arc<dyn YieldTermStructure>> {
        self.forwarding.as_ref()
    }

    /// Fixing date for a value date.
    pub fn fixing_date(&self, value_date: Date) -> Date {
        self.calendar
            .advance_business_days(value_date, -(self.fixing_days as i32))
    }

    /// Value date for a fixing date.
    pub fn value_date(&self, fixing_date: Date) -> Date {
        self.calendar
            .advance_business_days(fixing_date, self.fixing_days as i32)
    }

    /// Maturity of the deposit starting on `value_date`.
    pub fn maturity_date(&self, value_date: Date) -> Date {
        self.calendar
            .advance_period(value_date, self.tenor, self.convention, self.end_of_month)
    }

    /// Simply-compounded forward rate between `start` and `end` implied by
    /// `curve`.
    ///
    /// # Errors
    /// A configuration error for an empty accrual period; range errors from
    /// the curve.
    pub fn forecast_fixing_on(&self, curve: &dyn YieldTermStructure, start: Date, end: Date) -> Result<Rate> {
        let tau = self.day_counter.year_fraction(start, end);
        ql_core::ensure!(tau > 0.0, "{}: empty accrual period {start}..{end}", self.name());
        Ok((curve.discount_date(start)? / curve.discount_date(end)? - 1.0) / tau)
    }

    /// Forecast of the fixing on `fixing_date` from the forwarding curve.
    ///
    /// # Errors
    /// [`Error::MissingCurve`] without a forwarding curve.
    pub fn forecast_fixing(&self, fixing_date: Date) -> Result<Rate> {
        let curve = self.forwarding.as_deref().ok_or_else(|| Error::MissingCurve {
            curve: format!("{} forwarding", self.name()),
            date: fixing_date.to_string(),
        })?;
        let start = self.value_date(fixing_date);
        self.forecast_fixing_on(curve, start, self.maturity_date(start))
    }
}

impl Index for IborIndex {
    fn name(&self) -> String {
        format!("{}{} {}", self.family, self.tenor, self.day_counter)
    }

    fn fixing_calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Stored fixings win; fixings before the forwarding curve's reference
    /// date cannot be forecast.
    fn fixing(&self, date: Date) -> Result<Real> {
        if let Some(value) = self.fixings.get(date) {
            return Ok(value);
        }
        if let Some(curve) = &self.forwarding {
            ql_core::ensure!(
                date >= curve.reference_date(),
                "missing {} fixing for {date}",
                self.name()
            );
        }
        self.forecast_fixing(date)
    }

    fn fixing_store(&self) -> &FixingStore {
        &self.fixings
    }
}

impl fmt::Debug for IborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IborIndex")
            .field("name", &self.name())
            .field("fixing_days", &self.fixing_days)
            .field("currency", &self.currency.code)
            .field("forwarding", &self.forwarding.is_some())
            .finish()
    }
}

impl PartialEq for IborIndex {
    /// Indexes are equal when they fix the same rate; the forwarding curve
    /// and the fixings are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family
            && self.tenor == other.tenor
            && self.fixing_days == other.fixing_days
            && self.currency == other.currency
            && self.calendar == other.calendar
            && self.convention == other.convention
            && self.end_of_month == other.end_of_month
            && self.day_counter == other.day_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ql_core::errors::ErrorKind;
    use ql_termstructures::FlatForward;
    use ql_time::TimeUnit;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn index() -> IborIndex {
        IborIndex::new(
            "Test",
            Period::new(3, TimeUnit::Months),
            2,
            Currency::USD,
            Calendar::WeekendsOnly,
            BusinessDayConvention::ModifiedFollowing,
            false,
            DayCounter::Actual360,
        )
    }

    #[test]
    fn fixing_and_value_dates_skip_weekends() {
        let idx = index();
        // Thursday fixing settles on Monday
        assert_eq!(idx.value_date(date(2025, 3, 13)), date(2025, 3, 17));
        assert_eq!(idx.fixing_date(date(2025, 3, 17)), date(2025, 3, 13));
        assert_eq!(idx.maturity_date(date(2025, 3, 17)), date(2025, 6, 17));
        assert_eq!(idx.name(), "Test3M Actual/360");
    }

    #[test]
    fn stored_fixings_win_over_forecasts() {
        let base = index();
        let idx = base.with_forwarding(Arc::new(FlatForward::continuous(
            date(2025, 3, 13),
            0.03,
            DayCounter::Actual365Fixed,
        )));
        let d = date(2025, 3, 13);
        let forecast = idx.fixing(d).unwrap();
        idx.add_fixing(d, 0.045);
        assert_eq!(idx.fixing(d).unwrap(), 0.045);
        assert!((forecast - 0.045).abs() > 1e-3);
        assert_eq!(base.fixing(d).unwrap(), 0.045);
    }

    #[test]
    fn forecast_is_the_simple_forward() {
        let today = date(2025, 3, 13);
        let curve = FlatForward::continuous(today, 0.03, DayCounter::Actual365Fixed);
        let idx = index().with_forwarding(Arc::new(curve.clone()));
        let start = idx.value_date(today);
        let end = idx.maturity_date(start);
        let tau = DayCounter::Actual360.year_fraction(start, end);
        let t = DayCounter::Actual365Fixed.year_fraction(start, end);
        assert_abs_diff_eq!(idx.fixing(today).unwrap(), ((0.03 * t).exp() - 1.0) / tau, epsilon = 1e-14);
        assert_abs_diff_eq!(
            idx.forecast_fixing_on(&curve, start, end).unwrap(),
            idx.forecast_fixing(today).unwrap(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn missing_fixings_and_curves() {
        let idx = index();
        let err = idx.fixing(date(2025, 3, 13)).unwrap_err();
        assert!(matches!(err, Error::MissingCurve { .. }));

        let idx = idx.with_forwarding(Arc::new(FlatForward::continuous(
            date(2025, 3, 13),
            0.03,
            DayCounter::Actual365Fixed,
        )));
        let err = idx.fixing(date(2025, 3, 10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("missing"));
    }
}
