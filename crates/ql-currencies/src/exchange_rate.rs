//! Exchange rates (translates `ql/exchangerate.hpp`).

use crate::currency::{Currency, Money};
use ql_core::{errors::Result, Real};

/// Units of `target` bought by one unit of `source`.
///
/// Corresponds to `QuantLib::ExchangeRate` (direct rates only).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRate {
    /// Currency sold.
    pub source: Currency,
    /// Currency bought.
    pub target: Currency,
    /// Conversion factor.
    pub rate: Real,
}

impl ExchangeRate {
    /// A rate `source → target`.
    ///
    /// # Errors
    /// The rate must be finite and positive.
    pub fn new(source: Currency, target: Currency, rate: Real) -> Result<Self> {
        ql_core::ensure!(
            rate.is_finite() && rate > 0.0,
            "exchange rate {source}/{target} must be positive, got {rate}"
        );
        Ok(Self {
            source,
            target,
            rate,
        })
    }

    /// Convert an amount in either currency of the pair into the other.
    ///
    /// # Errors
    /// The amount's currency is not part of the pair.
    pub fn exchange(&self, amount: &Money) -> Result<Money> {
        if amount.currency == self.source {
            Ok(Money::new(amount.value * self.rate, self.target))
        } else if amount.currency == self.target {
            Ok(Money::new(amount.value / self.rate, self.source))
        } else {
            ql_core::fail!(
                "exchange rate {}/{} cannot convert {}",
                self.source,
                self.target,
                amount.currency
            )
        }
    }

    /// The rate `target → source`.
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            rate: 1.0 / self.rate,
        }
    }

    /// Cross rate `self.source → other.target` through a shared currency.
    ///
    /// # Errors
    /// The two rates have no currency in common.
    pub fn chain(&self, other: &ExchangeRate) -> Result<Self> {
        let (first, second) = if self.target == other.source {
            (*self, *other)
        } else if self.target == other.target {
            (*self, other.inverse())
        } else if self.source == other.source {
            (self.inverse(), *other)
        } else if self.source == other.target {
            (self.inverse(), other.inverse())
        } else {
            ql_core::fail!(
                "exchange rates {}/{} and {}/{} share no currency",
                self.source,
                self.target,
                other.source,
                other.target
            )
        };
        Self::new(first.source, second.target, first.rate * second.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn converts_both_ways() {
        let rate = ExchangeRate::new(Currency::EUR, Currency::USD, 1.10).unwrap();
        let usd = rate.exchange(&Money::new(100.0, Currency::EUR)).unwrap();
        assert_eq!(usd.currency, Currency::USD);
        assert_relative_eq!(usd.value, 110.0, max_relative = 1e-14);
        let eur = rate.exchange(&usd).unwrap();
        assert_relative_eq!(eur.value, 100.0, max_relative = 1e-14);
        assert!(rate.exchange(&Money::new(1.0, Currency::GBP)).is_err());
    }

    #[test]
    fn cross_rate_through_shared_currency() {
        let eur_usd = ExchangeRate::new(Currency::EUR, Currency::USD, 1.10).unwrap();
        let gbp_usd = ExchangeRate::new(Currency::GBP, Currency::USD, 1.25).unwrap();
        let eur_gbp = eur_usd.chain(&gbp_usd).unwrap();
        assert_eq!(eur_gbp.source, Currency::EUR);
        assert_eq!(eur_gbp.target, Currency::GBP);
        assert_relative_eq!(eur_gbp.rate, 1.10 / 1.25, max_relative = 1e-14);
    }

    #[test]
    fn rejects_non_positive_rate() {
        assert!(ExchangeRate::new(Currency::EUR, Currency::USD, 0.0).is_err());
    }
}
