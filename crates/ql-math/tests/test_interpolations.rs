use ql_math::{
    BackwardFlatInterpolation, CubicDerivativeApprox, CubicInterpolation, ForwardFlatInterpolation,
    Interpolation1D, LinearInterpolation, LogInterpolation,
};
use proptest::prelude::*;

const APPROXES: [CubicDerivativeApprox; 4] = [
    CubicDerivativeApprox::Spline,
    CubicDerivativeApprox::Parabolic,
    CubicDerivativeApprox::FritschButland,
    CubicDerivativeApprox::Kruger,
];

/// Strictly increasing abscissae starting at zero and positive ordinates.
fn nodes() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.05_f64..3.0, 0.2_f64..1.5), 2..12).prop_map(|steps| {
        let mut xs = vec![0.0];
        let mut ys = vec![1.0];
        for (dx, y) in steps {
            xs.push(xs[xs.len() - 1] + dx);
            ys.push(y);
        }
        (xs, ys)
    })
}

/// Decreasing positive data, as discount factors would be.
fn decreasing_nodes() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.05_f64..3.0, 0.0_f64..0.08), 2..12).prop_map(|steps| {
        let mut xs = vec![0.0];
        let mut ys = vec![1.0];
        for (dx, r) in steps {
            xs.push(xs[xs.len() - 1] + dx);
            ys.push(ys[ys.len() - 1] * (-r * dx).exp());
        }
        (xs, ys)
    })
}

fn all_schemes(xs: &[f64], ys: &[f64]) -> Vec<Box<dyn Interpolation1D>> {
    let mut out: Vec<Box<dyn Interpolation1D>> = vec![
        Box::new(LinearInterpolation::new(xs, ys).unwrap()),
        Box::new(BackwardFlatInterpolation::new(xs, ys).unwrap()),
        Box::new(ForwardFlatInterpolation::new(xs, ys).unwrap()),
        Box::new(LogInterpolation::log_linear(xs, ys).unwrap()),
    ];
    for approx in APPROXES {
        for monotonic in [false, true] {
            out.push(Box::new(CubicInterpolation::new(xs, ys, approx, monotonic).unwrap()));
            out.push(Box::new(LogInterpolation::log_cubic(xs, ys, approx, monotonic).unwrap()));
        }
    }
    out
}

proptest! {
    #[test]
    fn every_scheme_hits_its_nodes((xs, ys) in nodes()) {
        for f in all_schemes(&xs, &ys) {
            for (&x, &y) in xs.iter().zip(&ys) {
                prop_assert!((f.operator(x) - y).abs() < 1e-12, "{f:?} misses node {x}");
            }
        }
    }

    #[test]
    fn monotonic_cubics_stay_within_brackets((xs, ys) in nodes()) {
        for approx in APPROXES {
            let plain = CubicInterpolation::new(&xs, &ys, approx, true).unwrap();
            let log = LogInterpolation::log_cubic(&xs, &ys, approx, true).unwrap();
            for i in 0..xs.len() - 1 {
                let (lo, hi) = (ys[i].min(ys[i + 1]), ys[i].max(ys[i + 1]));
                for k in 1..20 {
                    let x = xs[i] + (xs[i + 1] - xs[i]) * k as f64 / 20.0;
                    for v in [plain.operator(x), log.operator(x)] {
                        prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn primitive_is_additive_across_nodes((xs, ys) in decreasing_nodes()) {
        let f = CubicInterpolation::new(&xs, &ys, CubicDerivativeApprox::Kruger, true).unwrap();
        let xm = 0.5 * (xs[0] + xs[xs.len() - 1]);
        let h = 1e-6;
        let numeric = (f.primitive(xm + h) - f.primitive(xm - h)) / (2.0 * h);
        prop_assert!((numeric - f.operator(xm)).abs() < 1e-6);
    }
}

#[test]
fn extrapolation_extends_last_segment() {
    let xs = [0.0, 1.0, 2.0];
    let ys = [1.0, 2.0, 4.0];
    let f = LinearInterpolation::new(&xs, &ys).unwrap();
    assert!((f.operator(3.0) - 6.0).abs() < 1e-12);
    let g = LogInterpolation::log_linear(&xs, &ys).unwrap();
    assert!((g.operator(3.0) - 8.0).abs() < 1e-12);
}
