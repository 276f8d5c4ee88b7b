//! # ql-termstructures
//!
//! Yield curves over the full trait × interpolator matrix, the iterative
//! bootstrapper and its rate helpers, fitted bond curves, composite curves,
//! volatility structures, and the versioned market dependency graph.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `TermStructure` — base trait for all term structures.
pub mod term_structure;

/// `YieldTermStructure` — discount, zero and forward queries, and jumps.
pub mod yield_term_structure;

/// `CurveTraits` × `Interpolator` — what a curve interpolates and how.
pub mod curve_strategy;

/// `InterpolatedYieldCurve` — a curve through explicit nodes.
pub mod interpolated_yield_curve;

/// `FlatForward` — constant forward-rate yield curve.
pub mod flat_forward;

/// `ForwardSpreadedTermStructure` — a base curve plus a forward spread.
pub mod forward_spreaded_term_structure;

/// `ImpliedTermStructure` — a base curve seen from a later date.
pub mod implied_term_structure;

/// `QuantoTermStructure` — quanto-adjusted dividend curve.
pub mod quanto_term_structure;

/// Rate helpers — deposits, FRAs, swaps and bonds as bootstrap instruments.
pub mod rate_helpers;

/// `PiecewiseYieldCurve` — the iterative bootstrapper.
pub mod piecewise_yield_curve;

/// `FittedBondDiscountCurve` — parametric curves fitted to bond prices.
pub mod fitted_bond_discount_curve;

/// `VolatilityTermStructure` and interest-rate volatility quotation.
pub mod volatility_term_structure;

/// `BlackVolTermStructure` and `BlackConstantVol`.
pub mod black_vol_term_structure;

/// Caplet volatility structures.
pub mod optionlet_volatility;

/// Swaption volatility structures.
pub mod swaption_volatility;

/// `Market` — versioned dependency graph with snapshot publication.
pub mod market;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use black_vol_term_structure::{BlackConstantVol, BlackVolTermStructure};
pub use curve_strategy::{CurveStrategy, CurveTraits, Interpolator, InterpolatorSpec, Scheme, INTERPOLATOR_TABLE};
pub use fitted_bond_discount_curve::{FittedBondDiscountCurve, FittingConfig, FittingMethodKind};
pub use flat_forward::FlatForward;
pub use forward_spreaded_term_structure::ForwardSpreadedTermStructure;
pub use implied_term_structure::ImpliedTermStructure;
pub use interpolated_yield_curve::InterpolatedYieldCurve;
pub use market::{BuildInputs, Market, MarketObject};
pub use optionlet_volatility::{ConstantOptionletVolatility, OptionletVolatilityGrid, OptionletVolatilityStructure};
pub use piecewise_yield_curve::{BootstrapConfig, PiecewiseYieldCurve, PiecewiseYieldCurveBuilder};
pub use quanto_term_structure::QuantoTermStructure;
pub use rate_helpers::{
    simple_forward, CurveRef, DepositRateHelper, FixedRateBondHelper, FraRateHelper, RateHelper, SwapRateHelper,
    BOND_FACE,
};
pub use swaption_volatility::{ConstantSwaptionVolatility, SwaptionVolatilityMatrix, SwaptionVolatilityStructure};
pub use term_structure::{TermStructure, TermStructureBase};
pub use volatility_term_structure::{
    normal_to_shifted_lognormal, shifted_lognormal_to_normal, VolatilityTermStructure, VolatilityType,
};
pub use yield_term_structure::{Jumps, YieldTermStructure};
