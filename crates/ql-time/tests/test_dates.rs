//! Integration tests for `Date`, `Period` and `Calendar` arithmetic.

use proptest::prelude::*;
use ql_time::{BusinessDayConvention, Calendar, Date, Period, TimeUnit};

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

#[test]
fn serial_iteration_is_consistent() {
    let mut d = date(1999, 12, 25);
    let end = date(2041, 1, 10);
    let mut previous = d - 1;
    while d <= end {
        assert_eq!(d - previous, 1, "{previous} -> {d}");
        assert!(d.day_of_month() >= 1 && d.day_of_month() <= 31);
        if d.day_of_month() == 1 {
            assert_eq!(previous.end_of_month(), previous);
        }
        previous = d;
        d += 1;
    }
}

#[test]
fn leap_years() {
    assert!(Date::is_leap(2000));
    assert!(Date::is_leap(2024));
    assert!(!Date::is_leap(1900));
    assert!(!Date::is_leap(2025));
}

#[test]
fn period_advance_matches_calendar_advance_on_null_calendar() {
    let cal = Calendar::Null;
    let d = date(2025, 1, 31);
    for n in 1..=24 {
        let p = Period::new(n, TimeUnit::Months);
        assert_eq!(
            cal.advance_period(d, p, BusinessDayConvention::Unadjusted, false),
            d.advance(n, TimeUnit::Months)
        );
    }
}

proptest! {
    #[test]
    fn adding_then_subtracting_days_is_identity(offset in 0_i64..40_000, n in -5_000_i64..5_000) {
        let d = date(1950, 1, 1) + offset;
        prop_assert_eq!((d + n) - n, d);
        prop_assert_eq!((d + n) - d, n);
    }

    #[test]
    fn adjusted_dates_are_business_days(offset in 0_i64..20_000) {
        let cal = Calendar::WeekendsOnly;
        let d = date(1990, 1, 1) + offset;
        for c in [
            BusinessDayConvention::Following,
            BusinessDayConvention::ModifiedFollowing,
            BusinessDayConvention::Preceding,
            BusinessDayConvention::ModifiedPreceding,
        ] {
            let adj = cal.adjust(d, c);
            prop_assert!(cal.is_business_day(adj));
            prop_assert!((adj - d).abs() <= 3);
        }
        let mf = cal.adjust(d, BusinessDayConvention::ModifiedFollowing);
        prop_assert_eq!(mf.month(), d.month());
    }
}
