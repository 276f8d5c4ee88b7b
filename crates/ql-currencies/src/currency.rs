//! `Currency` and `Money` (translates `ql/currency.hpp` and `ql/money.hpp`).

use ql_core::Real;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// ISO 4217 currency metadata.
///
/// Corresponds to `QuantLib::Currency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency {
    /// ISO 4217 alphabetic code, e.g. `"USD"`.
    pub code: &'static str,
    /// Full name.
    pub name: &'static str,
    /// ISO 4217 numeric code.
    pub numeric_code: u16,
    /// Decimal places used when rounding amounts.
    pub rounding: u8,
}

impl Currency {
    /// Euro.
    pub const EUR: Currency = Currency::new("EUR", "Euro", 978, 2);
    /// US dollar.
    pub const USD: Currency = Currency::new("USD", "U.S. dollar", 840, 2);
    /// Pound sterling.
    pub const GBP: Currency = Currency::new("GBP", "British pound sterling", 826, 2);
    /// Japanese yen.
    pub const JPY: Currency = Currency::new("JPY", "Japanese yen", 392, 0);
    /// Swiss franc.
    pub const CHF: Currency = Currency::new("CHF", "Swiss franc", 756, 2);

    /// A currency from its metadata.
    pub const fn new(code: &'static str, name: &'static str, numeric_code: u16, rounding: u8) -> Self {
        Self {
            code,
            name,
            numeric_code,
            rounding,
        }
    }

    /// Round `amount` to this currency's precision (half away from zero).
    pub fn round(&self, amount: Real) -> Real {
        let scale = 10_f64.powi(i32::from(self.rounding));
        (amount * scale).round() / scale
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

/// An amount in a given currency.
///
/// Corresponds to `QuantLib::Money`.  Arithmetic between amounts in
/// different currencies is a programming error and panics in debug builds
/// only; use [`ExchangeRate`](crate::ExchangeRate) to convert first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Money {
    /// Numeric amount.
    pub value: Real,
    /// Currency of the amount.
    pub currency: Currency,
}

impl Money {
    /// `value` units of `currency`.
    pub fn new(value: Real, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// The amount rounded to its currency's precision.
    pub fn rounded(&self) -> Self {
        Self::new(self.currency.round(self.value), self.currency)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        debug_assert_eq!(self.currency, rhs.currency);
        Money::new(self.value + rhs.value, self.currency)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        debug_assert_eq!(self.currency, rhs.currency);
        Money::new(self.value - rhs.value, self.currency)
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money::new(-self.value, self.currency)
    }
}

impl Mul<Real> for Money {
    type Output = Money;
    fn mul(self, rhs: Real) -> Money {
        Money::new(self.value * rhs, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*} {}", usize::from(self.currency.rounding), self.value, self.currency)
    }
}
