//! # ql-instruments
//!
//! Interest-rate swaps and European or Bermudan swaptions, with a
//! discounting swap engine (translates `ql/instruments/` and
//! `ql/pricingengines/swap/`).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Exercise schedules.
pub mod exercise;

/// `Instrument` and `PricingEngine` traits.
pub mod instrument;

/// Multi-leg swaps, `VanillaSwap` and the discounting engine.
pub mod swap;

/// Swaptions on vanilla swaps.
pub mod swaption;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use exercise::{Exercise, ExerciseType};
pub use instrument::{Instrument, PricingEngine};
pub use swap::{DiscountingSwapEngine, Swap, SwapResults, SwapType, VanillaSwap};
pub use swaption::{SettlementType, Swaption};
