//! # ql-indexes
//!
//! Interest-rate indexes (translates `ql/indexes/`).
//!
//! An [`IborIndex`] knows its fixing conventions and, optionally, the curve
//! it forecasts fixings from.  Basis and cross-currency helpers rebind the
//! forwarding curve to the curve under construction through
//! [`IborIndex::forecast_fixing_on`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `Index` trait and the historical fixing store.
pub mod index;

/// `IborIndex` — interbank offered-rate indexes.
pub mod ibor_index;

/// Preconfigured IBOR families.
pub mod ibor;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use ibor::{euribor, gbp_libor, jpy_libor, usd_libor};
pub use ibor_index::IborIndex;
pub use index::{FixingStore, Index};
