//! `Instrument` and `PricingEngine` (translates `ql/instrument.hpp` and
//! `ql/pricingengine.hpp`).
//!
//! Instruments are plain data; an engine values one against the curves it
//! was built with and returns its own results type.

use ql_core::errors::Result;
use ql_time::Date;

/// A financial product.
///
/// Corresponds to `QuantLib::Instrument`.
pub trait Instrument: std::fmt::Debug + Send + Sync {
    /// The last relevant date, if any.
    fn maturity_date(&self) -> Option<Date>;

    /// Whether nothing is left to pay after `evaluation_date`.
    fn is_expired(&self, evaluation_date: Date) -> bool {
        self.maturity_date().map_or(true, |d| d <= evaluation_date)
    }
}

/// Values instruments of type `I`.
///
/// Corresponds to `QuantLib::PricingEngine`.
pub trait PricingEngine<I: ?Sized>: std::fmt::Debug + Send + Sync {
    /// What the engine produces.
    type Results;

    /// Value `instrument`.
    fn calculate(&self, instrument: &I) -> Result<Self::Results>;
}
