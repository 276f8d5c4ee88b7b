//! Basis models against curves built from them: blended curves at their
//! limits, tenor transforms onto the same tenor, and cross-currency swaps
//! on a bootstrapped discount curve.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use ql_core::Real;
use ql_experimental::{
    ConstantCorrelation, CorrelationStructure, SpreadYTS, TenorOptionletVTS, TenorSwaptionVTS,
    TwoParameterCorrelation, XCCYSwapRateHelper,
};
use ql_indexes::{euribor, usd_libor, IborIndex};
use ql_instruments::PricingEngine;
use ql_termstructures::{
    BootstrapConfig, ConstantOptionletVolatility, ConstantSwaptionVolatility, CurveStrategy, CurveTraits, FlatForward,
    ForwardSpreadedTermStructure, Interpolator, OptionletVolatilityGrid, OptionletVolatilityStructure,
    PiecewiseYieldCurve, RateHelper, SwaptionVolatilityStructure, VolatilityType, YieldTermStructure,
};
use ql_time::{BusinessDayConvention, Calendar, Date, DayCounter, Period, TimeUnit};
use std::sync::Arc;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn today() -> Date {
    Date::from_ymd(2025, 1, 2).unwrap()
}

fn flat(rate: Real) -> Arc<dyn YieldTermStructure> {
    Arc::new(FlatForward::continuous(today(), rate, DayCounter::Actual365Fixed))
}

fn euribor_on(months: i32, curve: Arc<dyn YieldTermStructure>) -> Arc<IborIndex> {
    Arc::new(euribor(Period::new(months, TimeUnit::Months)).with_forwarding(curve))
}

// ── SpreadYTS ─────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// No blend is the base curve; a full blend applies the whole spread,
    /// and in between the zero rate moves linearly with alpha.
    #[test]
    fn blend_limits(
        rate in 0.0..0.06f64,
        spread in -0.01..0.02f64,
        alpha in 0.0..1.0f64,
        t in 0.1..30.0f64,
    ) {
        let base = flat(rate);
        let sprd: Arc<dyn YieldTermStructure> = Arc::new(ForwardSpreadedTermStructure::new(base.clone(), spread));
        let none = SpreadYTS::new(base.clone(), sprd.clone(), 0.0).unwrap();
        let full = SpreadYTS::new(base.clone(), sprd.clone(), 1.0).unwrap();
        let part = SpreadYTS::new(base.clone(), sprd, alpha).unwrap();

        prop_assert_eq!(none.discount(t).unwrap(), base.discount(t).unwrap());
        let expected = base.discount(t).unwrap() * (-spread * t).exp();
        prop_assert!((full.discount(t).unwrap() - expected).abs() <= 1e-14);
        let zero = -part.discount(t).unwrap().ln() / t;
        prop_assert!((zero - (rate + alpha * spread)).abs() <= 1e-12, "zero {} at alpha {}", zero, alpha);
    }
}

// ── Tenor transforms ──────────────────────────────────────────────────────────

fn optionlet_grid(volatility_type: VolatilityType, level: Real) -> Arc<dyn OptionletVolatilityStructure> {
    let expiries = [1, 2, 5, 10].map(|y| today().advance(y, TimeUnit::Years)).to_vec();
    let strikes = vec![0.01, 0.02, 0.03, 0.05];
    let vols: Vec<Vec<Real>> = (0..expiries.len())
        .map(|i| strikes.iter().map(|k| level * (1.0 + 0.05 * i as Real) * (1.0 + 2.0 * (k - 0.03))).collect())
        .collect();
    Arc::new(
        OptionletVolatilityGrid::new(
            today(),
            expiries,
            strikes,
            &vols,
            DayCounter::Actual365Fixed,
            volatility_type,
            0.0,
        )
        .unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Transforming a tenor onto itself returns the base volatilities.
    #[test]
    fn optionlet_identity(t in 1.0..9.0f64, strike in 0.015..0.045f64, rho in -0.5..1.0f64) {
        let curve = flat(0.025);
        let index = euribor_on(6, curve);
        let correlation: Arc<dyn CorrelationStructure> = Arc::new(ConstantCorrelation::new(rho).unwrap());
        let bases: [Arc<dyn OptionletVolatilityStructure>; 3] = [
            optionlet_grid(VolatilityType::Normal, 0.008),
            optionlet_grid(VolatilityType::ShiftedLognormal, 0.25),
            Arc::new(ConstantOptionletVolatility::new(
                today(),
                0.2,
                DayCounter::Actual365Fixed,
                VolatilityType::ShiftedLognormal,
                0.01,
            )),
        ];
        for base in bases {
            let vts = TenorOptionletVTS::new(base.clone(), index.clone(), index.clone(), correlation.clone()).unwrap();
            let expected = base.volatility(t, strike, true).unwrap();
            let actual = vts.volatility(t, strike, false).unwrap();
            prop_assert!((actual - expected).abs() <= 1e-12 * expected.max(1.0), "{} vs {}", actual, expected);
        }
    }

    /// The same holds for swaptions.
    #[test]
    fn swaption_identity(t in 0.5..10.0f64, years in 1..20i32, strike in 0.01..0.05f64) {
        let curve = flat(0.025);
        let index = euribor_on(6, curve.clone());
        for (volatility_type, level) in [(VolatilityType::Normal, 0.009), (VolatilityType::ShiftedLognormal, 0.3)] {
            let base: Arc<dyn SwaptionVolatilityStructure> = Arc::new(ConstantSwaptionVolatility::new(
                today(),
                level,
                DayCounter::Actual365Fixed,
                volatility_type,
                0.0,
            ));
            let vts = TenorSwaptionVTS::new(
                base,
                curve.clone(),
                index.clone(),
                index.clone(),
                Period::new(1, TimeUnit::Years),
                Period::new(1, TimeUnit::Years),
                DayCounter::Thirty360,
                DayCounter::Thirty360,
            )
            .unwrap();
            let actual = vts.volatility(t, years as Real, strike, false).unwrap();
            prop_assert!((actual - level).abs() <= 1e-12, "{} vs {}", actual, level);
        }
    }
}

#[test]
fn longer_tenor_blends_sub_period_volatilities() {
    init_logging();
    let ois = flat(0.02);
    let fwd3m: Arc<dyn YieldTermStructure> = Arc::new(ForwardSpreadedTermStructure::new(ois.clone(), 0.001));
    let fwd6m: Arc<dyn YieldTermStructure> = Arc::new(ForwardSpreadedTermStructure::new(ois, 0.003));
    let base = optionlet_grid(VolatilityType::Normal, 0.008);
    let perfect: Arc<dyn CorrelationStructure> = Arc::new(ConstantCorrelation::new(1.0).unwrap());
    let decaying: Arc<dyn CorrelationStructure> =
        Arc::new(TwoParameterCorrelation::linear(&[0.0, 10.0], &[0.2, 0.2], &[2.0, 2.0]).unwrap());
    let transform = |correlation: Arc<dyn CorrelationStructure>| {
        TenorOptionletVTS::new(base.clone(), euribor_on(3, fwd3m.clone()), euribor_on(6, fwd6m.clone()), correlation)
            .unwrap()
    };
    let correlated = transform(perfect).volatility(3.0, 0.03, false).unwrap();
    let decorrelated = transform(decaying).volatility(3.0, 0.03, false).unwrap();
    assert!(correlated > 0.0075 && correlated < 0.0095, "correlated {correlated}");
    assert!(decorrelated < correlated);
}

// ── Cross-currency bootstrap ──────────────────────────────────────────────────

fn xccy_helpers(
    eur_forwarding: &Arc<dyn YieldTermStructure>,
    usd: &Arc<dyn YieldTermStructure>,
    spread_on_rec_leg: bool,
    resets: bool,
) -> Vec<Arc<XCCYSwapRateHelper>> {
    let quotes = [(1, -0.0010), (2, -0.0014), (3, -0.0017), (5, -0.0020), (7, -0.0022), (10, -0.0023)];
    quotes
        .iter()
        .map(|&(years, spread)| {
            Arc::new(
                XCCYSwapRateHelper::new(
                    spread,
                    Period::new(years, TimeUnit::Years),
                    Period::new(0, TimeUnit::Days),
                    Calendar::WeekendsOnly,
                    BusinessDayConvention::ModifiedFollowing,
                    BusinessDayConvention::ModifiedFollowing,
                    spread_on_rec_leg,
                    euribor_on(3, eur_forwarding.clone()),
                    Arc::new(usd_libor(Period::new(3, TimeUnit::Months)).with_forwarding(usd.clone())),
                    None,
                    Some(usd.clone()),
                    1.1,
                    1.0,
                    resets,
                    today(),
                )
                .unwrap(),
            )
        })
        .collect()
}

#[test]
fn xccy_swaps_reprice_to_zero_on_the_bootstrapped_curve() {
    init_logging();
    let eur_forwarding = flat(0.025);
    let usd = flat(0.04);
    let strategies = [
        CurveStrategy::new(CurveTraits::Discount, Interpolator::LogLinear),
        CurveStrategy::new(CurveTraits::ZeroYield, Interpolator::Linear),
    ];
    // the quoted spread sits on the EUR leg, or on the resetting USD leg
    for (spread_on_rec_leg, resets) in [(false, false), (false, true), (true, true)] {
        for strategy in strategies {
            let helpers = xccy_helpers(&eur_forwarding, &usd, spread_on_rec_leg, resets);
            let dyn_helpers: Vec<Arc<dyn RateHelper>> =
                helpers.iter().map(|h| Arc::clone(h) as Arc<dyn RateHelper>).collect();
            let curve: Arc<dyn YieldTermStructure> = Arc::new(
                PiecewiseYieldCurve::new(
                    today(),
                    dyn_helpers,
                    DayCounter::Actual365Fixed,
                    strategy,
                    BootstrapConfig::default(),
                )
                .unwrap(),
            );
            for helper in &helpers {
                assert_abs_diff_eq!(helper.quote_error(curve.as_ref()).unwrap(), 0.0, epsilon = 1e-10);
                let swap = helper.basis_swap(&curve).unwrap();
                let results = helper.engine(&curve).unwrap().calculate(&swap).unwrap();
                assert_abs_diff_eq!(results.npv, 0.0, epsilon = 1e-8);
                assert_abs_diff_eq!(results.par_spread.unwrap(), 0.0, epsilon = 1e-8);
            }
        }
    }
}
