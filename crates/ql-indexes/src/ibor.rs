//! Preconfigured IBOR families.
//!
//! Holiday tables are out of scope, so every family fixes on the
//! weekends-only calendar; the remaining conventions are the market ones.

use crate::ibor_index::IborIndex;
use ql_currencies::Currency;
use ql_time::{BusinessDayConvention, Calendar, DayCounter, Period};

/// Euribor: EUR, T+2, Actual/360, Modified Following, end of month.
pub fn euribor(tenor: Period) -> IborIndex {
    IborIndex::new(
        "Euribor",
        tenor,
        2,
        Currency::EUR,
        Calendar::WeekendsOnly,
        BusinessDayConvention::ModifiedFollowing,
        true,
        DayCounter::Actual360,
    )
}

/// USD LIBOR: T+2, Actual/360, Modified Following, end of month.
pub fn usd_libor(tenor: Period) -> IborIndex {
    IborIndex::new(
        "USDLibor",
        tenor,
        2,
        Currency::USD,
        Calendar::WeekendsOnly,
        BusinessDayConvention::ModifiedFollowing,
        true,
        DayCounter::Actual360,
    )
}

/// GBP LIBOR: same-day value, Actual/365 (Fixed).
pub fn gbp_libor(tenor: Period) -> IborIndex {
    IborIndex::new(
        "GBPLibor",
        tenor,
        0,
        Currency::GBP,
        Calendar::WeekendsOnly,
        BusinessDayConvention::ModifiedFollowing,
        true,
        DayCounter::Actual365Fixed,
    )
}

/// JPY LIBOR: T+2, Actual/360.
pub fn jpy_libor(tenor: Period) -> IborIndex {
    IborIndex::new(
        "JPYLibor",
        tenor,
        2,
        Currency::JPY,
        Calendar::WeekendsOnly,
        BusinessDayConvention::ModifiedFollowing,
        true,
        DayCounter::Actual360,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Index;
    use ql_time::TimeUnit;

    #[test]
    fn families() {
        let e6 = euribor(Period::new(6, TimeUnit::Months));
        assert_eq!(e6.name(), "Euribor6M Actual/360");
        assert_eq!(e6.currency(), Currency::EUR);
        assert!(e6.end_of_month());

        let g3 = gbp_libor(Period::new(3, TimeUnit::Months));
        assert_eq!(g3.fixing_days(), 0);
        assert_eq!(g3.day_counter(), DayCounter::Actual365Fixed);

        assert_eq!(usd_libor(Period::new(3, TimeUnit::Months)).currency(), Currency::USD);
        assert_eq!(jpy_libor(Period::new(3, TimeUnit::Months)).currency(), Currency::JPY);
    }
}
