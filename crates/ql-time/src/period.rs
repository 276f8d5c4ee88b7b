//! `Period` — a time span expressed in a [`TimeUnit`] (translates
//! `ql/time/period.hpp`).

use crate::frequency::Frequency;
use crate::time_unit::TimeUnit;
use ql_core::errors::{Error, Result};
use ql_core::Real;
use std::fmt;
use std::str::FromStr;

/// A time span made up of an integer length and a [`TimeUnit`].
///
/// Corresponds to `QuantLib::Period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Period {
    /// Number of units.
    pub length: i32,
    /// The unit of time.
    pub unit: TimeUnit,
}

impl Period {
    /// Create a new period.
    pub const fn new(length: i32, unit: TimeUnit) -> Self {
        Self { length, unit }
    }

    /// The period between two events of the given frequency.
    ///
    /// # Errors
    /// `NoFrequency` has no period.
    pub fn from_frequency(freq: Frequency) -> Result<Self> {
        match freq {
            Frequency::NoFrequency => Err(Error::Configuration(format!(
                "cannot convert {freq} to a period"
            ))),
            Frequency::Once => Ok(Period::new(0, TimeUnit::Years)),
            Frequency::Annual => Ok(Period::new(1, TimeUnit::Years)),
            Frequency::Semiannual => Ok(Period::new(6, TimeUnit::Months)),
            Frequency::EveryFourthMonth => Ok(Period::new(4, TimeUnit::Months)),
            Frequency::Quarterly => Ok(Period::new(3, TimeUnit::Months)),
            Frequency::Bimonthly => Ok(Period::new(2, TimeUnit::Months)),
            Frequency::Monthly => Ok(Period::new(1, TimeUnit::Months)),
            Frequency::Weekly => Ok(Period::new(1, TimeUnit::Weeks)),
            Frequency::Daily => Ok(Period::new(1, TimeUnit::Days)),
        }
    }

    /// Approximate length in years (months/12, days/365).
    pub fn years(self) -> Real {
        let n = Real::from(self.length);
        match self.unit {
            TimeUnit::Days => n / 365.0,
            TimeUnit::Weeks => 7.0 * n / 365.0,
            TimeUnit::Months => n / 12.0,
            TimeUnit::Years => n,
        }
    }

    /// Length in months, for month or year periods.
    pub fn months(self) -> Option<i32> {
        match self.unit {
            TimeUnit::Months => Some(self.length),
            TimeUnit::Years => Some(self.length * 12),
            _ => None,
        }
    }
}

impl std::ops::Neg for Period {
    type Output = Self;

    fn neg(self) -> Self {
        Period::new(-self.length, self.unit)
    }
}

impl std::ops::Mul<i32> for Period {
    type Output = Self;

    fn mul(self, n: i32) -> Self {
        Period::new(self.length * n, self.unit)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.unit)
    }
}

impl FromStr for Period {
    type Err = Error;

    /// Parse strings such as `"3M"`, `"10Y"`, `"2w"`, `"-2D"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bad = || Error::Date(format!("cannot parse '{s}' as a period"));
        let unit_char = s.chars().last().ok_or_else(bad)?;
        let unit = match unit_char.to_ascii_uppercase() {
            'D' => TimeUnit::Days,
            'W' => TimeUnit::Weeks,
            'M' => TimeUnit::Months,
            'Y' => TimeUnit::Years,
            _ => return Err(bad()),
        };
        let length: i32 = s[..s.len() - unit_char.len_utf8()]
            .parse()
            .map_err(|_| bad())?;
        Ok(Period::new(length, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_periods() {
        assert_eq!("3M".parse::<Period>().unwrap(), Period::new(3, TimeUnit::Months));
        assert_eq!("10y".parse::<Period>().unwrap(), Period::new(10, TimeUnit::Years));
        assert_eq!("-2D".parse::<Period>().unwrap(), Period::new(-2, TimeUnit::Days));
        assert!("M".parse::<Period>().is_err());
        assert!("3Q".parse::<Period>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let p = Period::new(18, TimeUnit::Months);
        assert_eq!(p.to_string().parse::<Period>().unwrap(), p);
    }

    #[test]
    fn frequency_periods() {
        assert_eq!(
            Period::from_frequency(Frequency::Quarterly).unwrap(),
            Period::new(3, TimeUnit::Months)
        );
        assert!(Period::from_frequency(Frequency::NoFrequency).is_err());
        assert_eq!(Period::new(2, TimeUnit::Years).months(), Some(24));
    }
}
