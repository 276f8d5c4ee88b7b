//! Bootstrap behaviour against live quotes.

use approx::assert_abs_diff_eq;
use ql_core::errors::{Error, ErrorKind};
use ql_quotes::SimpleQuote;
use ql_termstructures::{
    BootstrapConfig, CurveStrategy, CurveTraits, DepositRateHelper, Interpolator, PiecewiseYieldCurve, RateHelper,
    SwapRateHelper, YieldTermStructure,
};
use ql_time::{BusinessDayConvention, Calendar, Date, DayCounter, Frequency, Period, TimeUnit};
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

struct Market {
    quotes: Vec<Arc<SimpleQuote>>,
    helpers: Vec<Arc<dyn RateHelper>>,
}

fn market() -> Market {
    let calendar = Calendar::WeekendsOnly;
    let bdc = BusinessDayConvention::ModifiedFollowing;
    let mut quotes = Vec::new();
    let mut helpers: Vec<Arc<dyn RateHelper>> = Vec::new();
    for (months, rate) in [(1, 0.0300), (3, 0.0310), (6, 0.0320)] {
        let quote = Arc::new(SimpleQuote::new(rate));
        helpers.push(Arc::new(DepositRateHelper::from_tenor(
            Arc::clone(&quote),
            Period::new(months, TimeUnit::Months),
            2,
            &calendar,
            bdc,
            false,
            DayCounter::Actual360,
            today(),
        )));
        quotes.push(quote);
    }
    for (years, rate) in [(2, 0.0335), (3, 0.0345), (5, 0.0360), (7, 0.0370), (10, 0.0380), (15, 0.0390)] {
        let quote = Arc::new(SimpleQuote::new(rate));
        helpers.push(Arc::new(
            SwapRateHelper::from_conventions(
                Arc::clone(&quote),
                Period::new(years, TimeUnit::Years),
                2,
                &calendar,
                bdc,
                Frequency::Annual,
                DayCounter::Thirty360,
                Period::new(6, TimeUnit::Months),
                DayCounter::Actual360,
                today(),
            )
            .unwrap(),
        ));
        quotes.push(quote);
    }
    Market { quotes, helpers }
}

fn bootstrap(helpers: Vec<Arc<dyn RateHelper>>, strategy: CurveStrategy) -> ql_core::Result<PiecewiseYieldCurve> {
    PiecewiseYieldCurve::new(today(), helpers, DayCounter::Actual365Fixed, strategy, BootstrapConfig::default())
}

fn strategies() -> [CurveStrategy; 5] {
    [
        CurveStrategy::new(CurveTraits::Discount, Interpolator::LogLinear),
        CurveStrategy::new(CurveTraits::ZeroYield, Interpolator::Linear),
        CurveStrategy::new(CurveTraits::ForwardRate, Interpolator::BackwardFlat),
        CurveStrategy::new(CurveTraits::ZeroYield, Interpolator::MonotonicCubicNaturalSpline),
        CurveStrategy::new(CurveTraits::Discount, Interpolator::KrugerLogCubic),
    ]
}

#[test]
fn requoting_at_implied_quotes_is_a_fixed_point() {
    init_logging();
    for strategy in strategies() {
        let Market { quotes, helpers } = market();
        let first = bootstrap(helpers.clone(), strategy).unwrap();
        for (quote, helper) in quotes.iter().zip(&helpers) {
            let implied = helper.implied_quote(&first).unwrap();
            assert_abs_diff_eq!(implied, helper.quote().unwrap(), epsilon = 1e-9);
            quote.set_value(implied);
        }
        let second = bootstrap(helpers, strategy).unwrap();
        assert_eq!(first.dates(), second.dates());
        for (a, b) in first.data().iter().zip(second.data()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }
}

#[test]
fn quote_moves_show_up_after_rebootstrapping() {
    let Market { quotes, helpers } = market();
    let strategy = CurveStrategy::new(CurveTraits::Discount, Interpolator::LogLinear);
    let before = bootstrap(helpers.clone(), strategy).unwrap();
    quotes[5].set_value(0.0400);
    let after = bootstrap(helpers.clone(), strategy).unwrap();

    let five_years = today().advance(5, TimeUnit::Years);
    assert!(after.discount_date(five_years).unwrap() < before.discount_date(five_years).unwrap());
    assert_abs_diff_eq!(helpers[5].implied_quote(&after).unwrap(), 0.0400, epsilon = 1e-9);
    // the short end only depends on the deposits
    let three_months = today().advance(3, TimeUnit::Months);
    assert_abs_diff_eq!(
        after.discount_date(three_months).unwrap(),
        before.discount_date(three_months).unwrap(),
        epsilon = 1e-14
    );
}

#[test]
fn duplicate_maturities_are_configuration_errors() {
    let Market { mut helpers, .. } = market();
    let maturity = helpers[2].pillar_date();
    let start = Calendar::WeekendsOnly.advance_business_days(today(), 2);
    helpers.push(Arc::new(DepositRateHelper::new(0.05, start, maturity, DayCounter::Actual365Fixed)));

    for strategy in strategies() {
        let err = bootstrap(helpers.clone(), strategy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains(&maturity.to_string()), "{err}");
    }
}

#[test]
fn invalid_quotes_name_their_helper() {
    let Market { quotes, helpers } = market();
    quotes[4].reset();
    let err = bootstrap(helpers, CurveStrategy::new(CurveTraits::ZeroYield, Interpolator::Linear)).unwrap_err();
    assert!(matches!(err, Error::Helper { .. }), "{err}");
    assert!(err.to_string().contains("swap"), "{err}");
}
