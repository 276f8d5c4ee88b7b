//! # ql-currencies
//!
//! ISO currencies, amounts of money and direct exchange rates, as used by
//! cross-currency and FX-forward rate helpers.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Currency metadata and money.
pub mod currency;

/// Exchange rates between two currencies.
pub mod exchange_rate;

pub use currency::{Currency, Money};
pub use exchange_rate::ExchangeRate;
