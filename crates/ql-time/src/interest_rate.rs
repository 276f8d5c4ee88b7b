//! Interest rate with compounding and day-counting conventions
//! (translates `ql/interestrate.hpp`).

use crate::date::Date;
use crate::day_counter::DayCounter;
use crate::frequency::Frequency;
use ql_core::errors::Result;
use ql_core::{Compounding, Real, Time};
use std::fmt;

/// An interest rate with associated compounding and day-counting conventions.
///
/// Corresponds to `QuantLib::InterestRate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterestRate {
    rate: Real,
    day_counter: DayCounter,
    compounding: Compounding,
    frequency: Frequency,
}

impl InterestRate {
    /// Create a new interest rate.  The frequency is ignored for `Simple`
    /// and `Continuous` compounding.
    pub fn new(rate: Real, day_counter: DayCounter, compounding: Compounding, frequency: Frequency) -> Self {
        Self {
            rate,
            day_counter,
            compounding,
            frequency,
        }
    }

    /// The rate value.
    pub fn rate(&self) -> Real {
        self.rate
    }

    /// The day counter.
    pub fn day_counter(&self) -> DayCounter {
        self.day_counter
    }

    /// The compounding convention.
    pub fn compounding(&self) -> Compounding {
        self.compounding
    }

    /// The compounding frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    fn periods(&self) -> Result<Real> {
        self.frequency.as_real()
    }

    /// Growth of one unit over `t` years.
    ///
    /// # Errors
    /// Negative `t` is a domain error, as is a non-positive simple factor.
    pub fn compound_factor(&self, t: Time) -> Result<Real> {
        ql_core::ensure_domain!(t >= 0.0, "negative time ({t}) not allowed");
        let r = self.rate;
        let factor = match self.compounding {
            Compounding::Simple => 1.0 + r * t,
            Compounding::Continuous => (r * t).exp(),
            Compounding::Compounded => {
                let f = self.periods()?;
                (1.0 + r / f).powf(f * t)
            }
            Compounding::SimpleThenCompounded => {
                let f = self.periods()?;
                if t <= 1.0 / f {
                    1.0 + r * t
                } else {
                    (1.0 + r / f).powf(f * t)
                }
            }
            Compounding::CompoundedThenSimple => {
                let f = self.periods()?;
                if t <= 1.0 / f {
                    (1.0 + r / f).powf(f * t)
                } else {
                    1.0 + r * t
                }
            }
        };
        ql_core::ensure_domain!(factor > 0.0, "non-positive compound factor {factor} for rate {r}");
        Ok(factor)
    }

    /// Compound factor between two dates.
    pub fn compound_factor_dates(&self, d1: Date, d2: Date) -> Result<Real> {
        self.compound_factor(self.day_counter.year_fraction(d1, d2))
    }

    /// Discount factor over `t` years.
    pub fn discount_factor(&self, t: Time) -> Result<Real> {
        Ok(1.0 / self.compound_factor(t)?)
    }

    /// The rate with the given conventions that yields `compound` over `t`.
    ///
    /// # Errors
    /// `compound` must be positive and `t` must be positive unless
    /// `compound == 1`.
    pub fn implied_rate(
        compound: Real,
        day_counter: DayCounter,
        comp: Compounding,
        freq: Frequency,
        t: Time,
    ) -> Result<InterestRate> {
        ql_core::ensure_domain!(compound > 0.0, "positive compound factor required, got {compound}");
        let r = if compound == 1.0 {
            0.0
        } else {
            ql_core::ensure_domain!(t > 0.0, "positive time required, got {t}");
            match comp {
                Compounding::Simple => (compound - 1.0) / t,
                Compounding::Continuous => compound.ln() / t,
                Compounding::Compounded => {
                    let f = freq.as_real()?;
                    (compound.powf(1.0 / (f * t)) - 1.0) * f
                }
                Compounding::SimpleThenCompounded => {
                    let f = freq.as_real()?;
                    if t <= 1.0 / f {
                        (compound - 1.0) / t
                    } else {
                        (compound.powf(1.0 / (f * t)) - 1.0) * f
                    }
                }
                Compounding::CompoundedThenSimple => {
                    let f = freq.as_real()?;
                    if t <= 1.0 / f {
                        (compound.powf(1.0 / (f * t)) - 1.0) * f
                    } else {
                        (compound - 1.0) / t
                    }
                }
            }
        };
        Ok(InterestRate::new(r, day_counter, comp, freq))
    }

    /// The equivalent rate under other conventions over `t`.
    pub fn equivalent_rate(&self, comp: Compounding, freq: Frequency, t: Time) -> Result<InterestRate> {
        Self::implied_rate(self.compound_factor(t)?, self.day_counter, comp, freq, t)
    }
}

impl fmt::Display for InterestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6}% {} {}",
            self.rate * 100.0,
            self.day_counter,
            self.compounding
        )?;
        if matches!(self.compounding, Compounding::Compounded) {
            write!(f, " {}", self.frequency)?;
        }
        Ok(())
    }
}
