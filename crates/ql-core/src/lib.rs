//! # ql-core
//!
//! Core types and error definitions shared by every crate of the workspace:
//! primitive type aliases, the error taxonomy, compounding conventions and
//! the `Handle` / `RelinkableHandle` snapshot references.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Compounding conventions.
pub mod compounding;

/// Error taxonomy and the `ensure!` / `ensure_domain!` / `fail!` macros.
pub mod errors;

/// Shared references (`Handle<T>`) and versioned snapshot cells
/// (`RelinkableHandle<T>`).
pub mod handle;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Non-negative integer type.
pub type Natural = u32;

/// Signed integer type.
pub type Integer = i32;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A spread over a reference rate.
pub type Spread = Real;

/// A discount factor, positive and usually below one.
pub type DiscountFactor = Real;

/// A price or value.
pub type Price = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use compounding::Compounding;
pub use errors::{Error, ErrorKind, Result};
pub use handle::{Handle, RelinkableHandle};
