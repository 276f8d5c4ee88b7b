//! Every (traits, interpolator) pair: node round trips, monotone variants,
//! and range checks far past the last node.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use ql_core::errors::ErrorKind;
use ql_core::Real;
use ql_math::interpolations::Interpolation1D;
use ql_termstructures::{
    BootstrapConfig, CurveStrategy, CurveTraits, InterpolatedYieldCurve, Interpolator, PiecewiseYieldCurve,
    RateHelper, TermStructure, YieldTermStructure,
};
use ql_time::{Calendar, Date, DayCounter, TimeUnit};
use std::sync::Arc;

const TRAITS: [CurveTraits; 3] = [CurveTraits::Discount, CurveTraits::ZeroYield, CurveTraits::ForwardRate];

fn today() -> Date {
    Date::from_ymd(2025, 1, 2).unwrap()
}

fn pillars() -> Vec<Date> {
    [6, 12, 24, 36, 60, 84, 120]
        .iter()
        .map(|&m| today().advance(m, TimeUnit::Months))
        .collect()
}

/// Discount factors of an upward-sloping forward curve f(t) = 2% + 0.2%·t.
fn market_discount(t: Real) -> Real {
    (-(0.02 * t + 0.001 * t * t)).exp()
}

/// Quotes the discount factor at its pillar.
#[derive(Debug)]
struct DiscountHelper {
    pillar: Date,
    discount: Real,
}

impl RateHelper for DiscountHelper {
    fn pillar_date(&self) -> Date {
        self.pillar
    }

    fn quote(&self) -> ql_core::Result<Real> {
        Ok(self.discount)
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> ql_core::Result<Real> {
        curve.discount_date(self.pillar)
    }

    fn description(&self) -> String {
        format!("discount to {}", self.pillar)
    }
}

fn discount_helpers() -> Vec<Arc<dyn RateHelper>> {
    let dc = DayCounter::Actual365Fixed;
    pillars()
        .into_iter()
        .map(|pillar| {
            Arc::new(DiscountHelper {
                pillar,
                discount: market_discount(dc.year_fraction(today(), pillar)),
            }) as Arc<dyn RateHelper>
        })
        .collect()
}

#[test]
fn bootstrapped_curves_reprice_every_pillar() {
    for traits in TRAITS {
        for interpolator in Interpolator::all() {
            let strategy = CurveStrategy::new(traits, interpolator);
            let curve = PiecewiseYieldCurve::new(
                today(),
                discount_helpers(),
                DayCounter::Actual365Fixed,
                strategy,
                BootstrapConfig::default(),
            )
            .unwrap_or_else(|e| panic!("{strategy}: {e}"));
            for helper in curve.helpers() {
                let error = helper.quote_error(&curve).unwrap();
                assert!(error.abs() < 1e-8, "{strategy} misses {}: {error:e}", helper.description());
            }
        }
    }
}

#[test]
fn discount_and_zero_nodes_round_trip() {
    let dc = DayCounter::Actual365Fixed;
    let mut dates = vec![today()];
    dates.extend(pillars());
    let times: Vec<Real> = dates.iter().map(|&d| dc.year_fraction(today(), d)).collect();
    for interpolator in Interpolator::all() {
        let discounts: Vec<Real> = times.iter().map(|&t| market_discount(t)).collect();
        let curve = InterpolatedYieldCurve::new(
            dates.clone(),
            discounts.clone(),
            Calendar::Null,
            dc,
            vec![],
            vec![],
            CurveTraits::Discount,
            interpolator,
        )
        .unwrap();
        for (&t, &d) in times.iter().zip(&discounts) {
            assert_abs_diff_eq!(curve.discount(t).unwrap(), d, epsilon = 1e-14);
        }

        let zeros: Vec<Real> = times.iter().map(|&t| 0.02 + 0.001 * t).collect();
        let curve = InterpolatedYieldCurve::new(
            dates.clone(),
            zeros.clone(),
            Calendar::Null,
            dc,
            vec![],
            vec![],
            CurveTraits::ZeroYield,
            interpolator,
        )
        .unwrap();
        for (&t, &z) in times.iter().zip(&zeros).skip(1) {
            assert_abs_diff_eq!(curve.discount(t).unwrap(), (-z * t).exp(), epsilon = 1e-14);
        }
    }
}

#[test]
fn queries_far_past_the_last_node_are_domain_errors() {
    let dc = DayCounter::Actual365Fixed;
    for traits in TRAITS {
        for interpolator in Interpolator::all() {
            let curve = PiecewiseYieldCurve::new(
                today(),
                discount_helpers(),
                dc,
                CurveStrategy::new(traits, interpolator),
                BootstrapConfig::default(),
            )
            .unwrap();
            let far = curve.max_time() + 50.0;
            assert_eq!(curve.discount(far).unwrap_err().kind(), ErrorKind::Domain);
            let far_date = curve.max_date().advance(50, TimeUnit::Years);
            assert_eq!(curve.discount_date(far_date).unwrap_err().kind(), ErrorKind::Domain);
            assert!(curve.discount_with(far, true).is_ok());
        }
    }
}

fn monotonic_interpolators() -> Vec<Interpolator> {
    Interpolator::all().filter(|i| i.is_monotonic()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Monotone interpolators never leave the range of the two nodes they
    /// lie between.
    #[test]
    fn monotonic_variants_do_not_overshoot(
        increments in prop::collection::vec(0.0005..0.02f64, 4..9),
        steps in prop::collection::vec(0.2..3.0f64, 9),
    ) {
        let mut times = vec![0.0];
        for s in steps.iter().take(increments.len()) {
            let last = *times.last().unwrap();
            times.push(last + s);
        }
        let mut zeros = vec![0.01];
        for inc in &increments {
            let last = *zeros.last().unwrap();
            zeros.push(last + inc);
        }
        for interpolator in monotonic_interpolators() {
            let f = interpolator.interpolate(&times, &zeros).unwrap();
            for w in 0..times.len() - 1 {
                let (lo, hi) = (zeros[w], zeros[w + 1]);
                for k in 1..10 {
                    let x = times[w] + (times[w + 1] - times[w]) * k as f64 / 10.0;
                    let y = f.operator(x);
                    prop_assert!(y >= lo - 1e-12 && y <= hi + 1e-12, "{interpolator} overshoots at {x}: {y}");
                }
            }
        }
    }

    /// The same holds for discount factors read off a discount curve.
    #[test]
    fn monotonic_discount_curves_stay_between_nodes(
        forwards in prop::collection::vec(0.0005..0.08f64, 4..9),
        gaps in prop::collection::vec(60..1100i32, 9),
    ) {
        let dc = DayCounter::Actual365Fixed;
        let mut dates = vec![today()];
        for gap in gaps.iter().take(forwards.len()) {
            let last = *dates.last().unwrap();
            dates.push(last.advance(*gap, TimeUnit::Days));
        }
        let times: Vec<Real> = dates.iter().map(|&d| dc.year_fraction(today(), d)).collect();
        let mut discounts = vec![1.0];
        for (f, w) in forwards.iter().zip(times.windows(2)) {
            let last = *discounts.last().unwrap();
            discounts.push(last * (-f * (w[1] - w[0])).exp());
        }
        for interpolator in monotonic_interpolators() {
            let curve = InterpolatedYieldCurve::new(
                dates.clone(),
                discounts.clone(),
                Calendar::Null,
                dc,
                vec![],
                vec![],
                CurveTraits::Discount,
                interpolator,
            )
            .unwrap();
            for (w, d) in times.windows(2).zip(discounts.windows(2)) {
                let (lo, hi) = (d[0].min(d[1]), d[0].max(d[1]));
                for k in 1..10 {
                    let t = w[0] + (w[1] - w[0]) * k as f64 / 10.0;
                    let y = curve.discount(t).unwrap();
                    prop_assert!(y >= lo - 1e-14 && y <= hi + 1e-14, "{interpolator} leaves [{lo}, {hi}] at {t}: {y}");
                }
            }
        }
    }
}
