//! Multi-curve basis models.
//!
//! Translates `ql/experimental/basismodels/` — basis swaps and the helpers
//! that bootstrap tenor, cross-currency and FX-forward curves from them,
//! curve blending, and volatility transforms between Ibor tenors.

pub mod basis_swap;
pub mod correlation;
pub mod rate_helpers;
pub mod spread_yts;
pub mod swaption_cash_flows;
pub mod tenor_optionlet_vts;
pub mod tenor_swaption_vts;

pub use basis_swap::{BasisSwap, BasisSwapEngine, BasisSwapResults};
pub use correlation::{ConstantCorrelation, CorrelationStructure, TwoParameterCorrelation};
pub use rate_helpers::{FxBootstrap, FxFwdRateHelper, TenorSwapRateHelper, XCCYSwapRateHelper};
pub use spread_yts::SpreadYTS;
pub use swaption_cash_flows::SwaptionCashFlows;
pub use tenor_optionlet_vts::{TenorOptionletSmileSection, TenorOptionletVTS};
pub use tenor_swaption_vts::{TenorSwaptionSmileSection, TenorSwaptionVTS};
