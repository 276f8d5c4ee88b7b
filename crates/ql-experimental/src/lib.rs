//! # ql-experimental
//!
//! Multi-curve extensions: tenor and cross-currency basis instruments and
//! rate helpers, blended curves and tenor volatility transforms.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Basis swaps, basis rate helpers, `SpreadYTS` and tenor volatility
/// transforms.
pub mod basismodels;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use basismodels::{
    BasisSwap, BasisSwapEngine, BasisSwapResults, ConstantCorrelation, CorrelationStructure, FxBootstrap,
    FxFwdRateHelper, SpreadYTS, SwaptionCashFlows, TenorOptionletSmileSection, TenorOptionletVTS,
    TenorSwapRateHelper, TenorSwaptionSmileSection, TenorSwaptionVTS, TwoParameterCorrelation,
    XCCYSwapRateHelper,
};
