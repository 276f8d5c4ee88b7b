//! # multicurve
//!
//! Multi-curve interest-rate term structures: yield curves bootstrapped
//! over a trait × interpolator matrix, tenor and cross-currency basis
//! helpers, fitted bond curves, tenor volatility transforms and a
//! versioned market graph.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `ql-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! multicurve = "0.1"
//! ```
//!
//! ```rust
//! use multicurve::termstructures::{FlatForward, YieldTermStructure};
//! use multicurve::time::{Date, DayCounter};
//!
//! let today = Date::from_ymd(2025, 1, 2).unwrap();
//! let curve = FlatForward::continuous(today, 0.03, DayCounter::Actual365Fixed);
//! let df = curve.discount(2.0).unwrap();
//! assert!((df - (-0.06_f64).exp()).abs() < 1e-14);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use ql_core as core;

/// Date, calendar, day counter, and schedule types.
pub use ql_time as time;

/// Interpolation, root finding and optimisation.
pub use ql_math as math;

/// Currency definitions.
pub use ql_currencies as currencies;

/// Market quotes.
pub use ql_quotes as quotes;

/// Ibor index definitions.
pub use ql_indexes as indexes;

/// Yield curves, rate helpers, volatility structures and the market graph.
pub use ql_termstructures as termstructures;

/// Cash flows and coupons.
pub use ql_cashflows as cashflows;

/// Swaps and swaptions.
pub use ql_instruments as instruments;

/// Basis models: basis helpers, `SpreadYTS` and tenor transforms.
pub use ql_experimental as experimental;
