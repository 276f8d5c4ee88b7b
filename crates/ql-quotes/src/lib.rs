//! # ql-quotes
//!
//! Market quotes with version counters, and shared handles to them.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `Quote` trait and concrete implementations.
pub mod quote;

pub use quote::{DerivedQuote, Quote, QuoteHandle, SimpleQuote};
