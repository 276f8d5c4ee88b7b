//! Integration tests for day-count conventions.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use ql_time::{Date, DayCounter};

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

#[test]
fn actual_actual_isda_reference_values() {
    // ISDA 1998 paper examples
    let dc = DayCounter::ActualActualIsda;
    assert_abs_diff_eq!(
        dc.year_fraction(date(2003, 11, 1), date(2004, 5, 1)),
        0.497724380567,
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(
        dc.year_fraction(date(1999, 2, 1), date(1999, 7, 1)),
        0.410958904110,
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(
        dc.year_fraction(date(1999, 7, 1), date(2000, 7, 1)),
        1.001377348600,
        epsilon = 1e-10
    );
}

#[test]
fn thirty_360_bond_basis() {
    let dc = DayCounter::Thirty360;
    assert_eq!(dc.day_count(date(2006, 8, 20), date(2007, 2, 20)), 180);
    assert_eq!(dc.day_count(date(2007, 2, 28), date(2007, 8, 31)), 183);
    assert_eq!(dc.day_count(date(2007, 8, 31), date(2008, 2, 29)), 179);
}

proptest! {
    #[test]
    fn year_fractions_are_additive_for_actual_conventions(a in 0_i64..10_000, b in 0_i64..3_000, c in 0_i64..3_000) {
        let d1 = date(1990, 1, 1) + a;
        let d2 = d1 + b;
        let d3 = d2 + c;
        for dc in [DayCounter::Actual360, DayCounter::Actual365Fixed, DayCounter::ActualActualIsda] {
            let whole = dc.year_fraction(d1, d3);
            let parts = dc.year_fraction(d1, d2) + dc.year_fraction(d2, d3);
            prop_assert!((whole - parts).abs() < 1e-12);
        }
    }

    #[test]
    fn year_fractions_are_antisymmetric(a in 0_i64..10_000, b in 0_i64..10_000) {
        let d1 = date(1990, 1, 1) + a;
        let d2 = date(1990, 1, 1) + b;
        for dc in [DayCounter::Actual360, DayCounter::Actual365Fixed, DayCounter::ActualActualIsda] {
            prop_assert!((dc.year_fraction(d1, d2) + dc.year_fraction(d2, d1)).abs() < 1e-12);
        }
    }
}
