//! `Quote` trait and implementations (translates `ql/quote.hpp`,
//! `ql/quotes/simplequote.hpp` and `ql/quotes/derivedquote.hpp`).
//!
//! A quote carries a monotone version number in place of QuantLib's
//! observer notifications: anything built from a quote remembers the
//! version it saw and rebuilds when it changes.

use ql_core::{
    errors::{Error, Result},
    Real,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A market-observable value.
///
/// Corresponds to `QuantLib::Quote`.
pub trait Quote: fmt::Debug + Send + Sync {
    /// Current value.
    ///
    /// # Errors
    /// A configuration error if the quote holds no value.
    fn value(&self) -> Result<Real>;

    /// `true` if a value is set.
    fn is_valid(&self) -> bool;

    /// Version counter, bumped on every change.
    fn version(&self) -> u64;
}

// ── SimpleQuote ───────────────────────────────────────────────────────────────

/// A settable quote, safe to update from one thread while others read.
///
/// Corresponds to `QuantLib::SimpleQuote`.
pub struct SimpleQuote {
    bits: AtomicU64,
    valid: AtomicBool,
    version: AtomicU64,
}

impl SimpleQuote {
    /// A quote holding `value`.
    pub fn new(value: Real) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
            valid: AtomicBool::new(true),
            version: AtomicU64::new(0),
        }
    }

    /// A quote with no value.
    pub fn empty() -> Self {
        Self {
            bits: AtomicU64::new(0),
            valid: AtomicBool::new(false),
            version: AtomicU64::new(0),
        }
    }

    /// Set a new value and return the difference from the previous one
    /// (zero if the quote was empty).  Setting the same value again does not
    /// bump the version.
    pub fn set_value(&self, value: Real) -> Real {
        let previous = Real::from_bits(self.bits.swap(value.to_bits(), Ordering::AcqRel));
        let was_valid = self.valid.swap(true, Ordering::AcqRel);
        if !was_valid || previous.to_bits() != value.to_bits() {
            self.version.fetch_add(1, Ordering::AcqRel);
        }
        if was_valid {
            value - previous
        } else {
            0.0
        }
    }

    /// Bump the version without changing the value, so that dependants
    /// rebuild; returns the new version.
    pub fn touch(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Remove the value.
    pub fn reset(&self) {
        if self.valid.swap(false, Ordering::AcqRel) {
            self.version.fetch_add(1, Ordering::AcqRel);
        }
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> Result<Real> {
        if self.valid.load(Ordering::Acquire) {
            Ok(Real::from_bits(self.bits.load(Ordering::Acquire)))
        } else {
            Err(Error::Configuration("invalid SimpleQuote".into()))
        }
    }

    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

impl fmt::Debug for SimpleQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Ok(v) => write!(f, "SimpleQuote({v})"),
            Err(_) => f.write_str("SimpleQuote(empty)"),
        }
    }
}

// ── DerivedQuote ──────────────────────────────────────────────────────────────

/// A quote obtained by applying a function to another quote.
///
/// Corresponds to `QuantLib::DerivedQuote`.
pub struct DerivedQuote<F> {
    source: QuoteHandle,
    f: F,
}

impl<F> DerivedQuote<F>
where
    F: Fn(Real) -> Real + Send + Sync,
{
    /// `f(source)`.
    pub fn new(source: QuoteHandle, f: F) -> Self {
        Self { source, f }
    }
}

impl<F> Quote for DerivedQuote<F>
where
    F: Fn(Real) -> Real + Send + Sync,
{
    fn value(&self) -> Result<Real> {
        Ok((self.f)(self.source.value()?))
    }

    fn is_valid(&self) -> bool {
        self.source.is_valid()
    }

    fn version(&self) -> u64 {
        self.source.version()
    }
}

impl<F> fmt::Debug for DerivedQuote<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedQuote").field("source", &self.source).finish()
    }
}

// ── QuoteHandle ───────────────────────────────────────────────────────────────

/// A shared reference to any quote.
///
/// Corresponds to `QuantLib::Handle<Quote>`; constant values are wrapped in
/// a private [`SimpleQuote`].
#[derive(Debug, Clone)]
pub struct QuoteHandle(Arc<dyn Quote>);

impl QuoteHandle {
    /// Wrap a shared quote.
    pub fn new(quote: Arc<dyn Quote>) -> Self {
        Self(quote)
    }

    /// The underlying quote.
    pub fn quote(&self) -> &Arc<dyn Quote> {
        &self.0
    }

    /// Current value.
    pub fn value(&self) -> Result<Real> {
        self.0.value()
    }

    /// `true` if a value is set.
    pub fn is_valid(&self) -> bool {
        self.0.is_valid()
    }

    /// Version of the underlying quote.
    pub fn version(&self) -> u64 {
        self.0.version()
    }
}

impl From<Real> for QuoteHandle {
    fn from(value: Real) -> Self {
        Self(Arc::new(SimpleQuote::new(value)))
    }
}

impl From<Arc<SimpleQuote>> for QuoteHandle {
    fn from(quote: Arc<SimpleQuote>) -> Self {
        Self(quote)
    }
}

impl From<Arc<dyn Quote>> for QuoteHandle {
    fn from(quote: Arc<dyn Quote>) -> Self {
        Self(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ql_core::errors::ErrorKind;

    #[test]
    fn simple_quote_versions() {
        let q = SimpleQuote::new(1.05);
        assert_eq!(q.value().unwrap(), 1.05);
        assert_eq!(q.version(), 0);
        assert_eq!(q.set_value(1.10), 1.10 - 1.05);
        assert_eq!(q.version(), 1);
        q.set_value(1.10);
        assert_eq!(q.version(), 1);
        assert_eq!(q.touch(), 2);
        q.reset();
        assert!(!q.is_valid());
        assert_eq!(q.version(), 3);
        assert_eq!(q.value().unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn empty_quote_becomes_valid() {
        let q = SimpleQuote::empty();
        assert!(!q.is_valid());
        assert_eq!(q.set_value(0.5), 0.0);
        assert!(q.is_valid());
    }

    #[test]
    fn handles_share_the_quote() {
        let q = Arc::new(SimpleQuote::new(0.02));
        let h = QuoteHandle::from(q.clone());
        let derived = DerivedQuote::new(h.clone(), |x| -x);
        q.set_value(0.03);
        assert_eq!(h.value().unwrap(), 0.03);
        assert_eq!(derived.value().unwrap(), -0.03);
        assert_eq!(derived.version(), h.version());
    }

    #[test]
    fn constant_handle() {
        let h = QuoteHandle::from(0.25);
        assert_eq!(h.value().unwrap(), 0.25);
    }
}
