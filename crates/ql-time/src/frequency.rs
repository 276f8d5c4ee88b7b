//! `Frequency` — payment / compounding frequency (translates
//! `ql/time/frequency.hpp`).

use ql_core::errors::{Error, Result};
use ql_core::Real;
use std::fmt;
use std::str::FromStr;

/// Number of events per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frequency {
    /// No frequency (e.g. continuous compounding).
    NoFrequency,
    /// Only once (zero-coupon).
    Once,
    /// Once a year.
    Annual,
    /// Twice a year.
    Semiannual,
    /// Every fourth month.
    EveryFourthMonth,
    /// Every third month.
    Quarterly,
    /// Every second month.
    Bimonthly,
    /// Once a month.
    Monthly,
    /// Once a week.
    Weekly,
    /// Once a day.
    Daily,
}

impl Frequency {
    /// Events per year, `None` for `NoFrequency` and `Once`.
    pub fn per_year(self) -> Option<u32> {
        match self {
            Frequency::NoFrequency | Frequency::Once => None,
            Frequency::Annual => Some(1),
            Frequency::Semiannual => Some(2),
            Frequency::EveryFourthMonth => Some(3),
            Frequency::Quarterly => Some(4),
            Frequency::Bimonthly => Some(6),
            Frequency::Monthly => Some(12),
            Frequency::Weekly => Some(52),
            Frequency::Daily => Some(365),
        }
    }

    /// Events per year as a real number.
    ///
    /// # Errors
    /// Returns a configuration error for frequencies without a count.
    pub fn as_real(self) -> Result<Real> {
        self.per_year()
            .map(Real::from)
            .ok_or_else(|| Error::Configuration(format!("frequency {self} has no periods per year")))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::NoFrequency => "No-Frequency",
            Frequency::Once => "Once",
            Frequency::Annual => "Annual",
            Frequency::Semiannual => "Semiannual",
            Frequency::EveryFourthMonth => "Every-Fourth-Month",
            Frequency::Quarterly => "Quarterly",
            Frequency::Bimonthly => "Bimonthly",
            Frequency::Monthly => "Monthly",
            Frequency::Weekly => "Weekly",
            Frequency::Daily => "Daily",
        };
        f.write_str(s)
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "nofrequency" | "none" => Ok(Frequency::NoFrequency),
            "once" => Ok(Frequency::Once),
            "annual" | "a" | "1y" => Ok(Frequency::Annual),
            "semiannual" | "s" | "6m" => Ok(Frequency::Semiannual),
            "everyfourthmonth" | "4m" => Ok(Frequency::EveryFourthMonth),
            "quarterly" | "q" | "3m" => Ok(Frequency::Quarterly),
            "bimonthly" | "2m" => Ok(Frequency::Bimonthly),
            "monthly" | "m" | "1m" => Ok(Frequency::Monthly),
            "weekly" | "w" | "1w" => Ok(Frequency::Weekly),
            "daily" | "d" | "1d" => Ok(Frequency::Daily),
            _ => Err(Error::Configuration(format!("unknown frequency '{s}'"))),
        }
    }
}
