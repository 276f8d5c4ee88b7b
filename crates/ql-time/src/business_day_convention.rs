//! Business-day adjustment conventions (translates
//! `ql/time/businessdayconvention.hpp`).

use ql_core::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// How a date falling on a holiday is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BusinessDayConvention {
    /// First business day after the holiday.
    #[default]
    Following,
    /// Following, unless that crosses into the next month; then preceding.
    ModifiedFollowing,
    /// Last business day before the holiday.
    Preceding,
    /// Preceding, unless that crosses into the previous month; then following.
    ModifiedPreceding,
    /// No adjustment.
    Unadjusted,
}

impl fmt::Display for BusinessDayConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BusinessDayConvention::Following => "Following",
            BusinessDayConvention::ModifiedFollowing => "Modified Following",
            BusinessDayConvention::Preceding => "Preceding",
            BusinessDayConvention::ModifiedPreceding => "Modified Preceding",
            BusinessDayConvention::Unadjusted => "Unadjusted",
        };
        f.write_str(s)
    }
}

impl FromStr for BusinessDayConvention {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "following" | "f" => Ok(BusinessDayConvention::Following),
            "modifiedfollowing" | "mf" => Ok(BusinessDayConvention::ModifiedFollowing),
            "preceding" | "p" => Ok(BusinessDayConvention::Preceding),
            "modifiedpreceding" | "mp" => Ok(BusinessDayConvention::ModifiedPreceding),
            "unadjusted" | "u" => Ok(BusinessDayConvention::Unadjusted),
            _ => Err(Error::Configuration(format!(
                "unknown business-day convention '{s}'"
            ))),
        }
    }
}
