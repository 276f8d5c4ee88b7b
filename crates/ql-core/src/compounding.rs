//! Compounding conventions (translates `ql/compounding.hpp`).

use crate::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// How interest is compounded.
///
/// Mirrors `QuantLib::Compounding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compounding {
    /// Simple interest: `1 + r·t`
    Simple,
    /// Compounded interest: `(1 + r/f)^(f·t)`
    Compounded,
    /// Continuously compounded: `e^(r·t)`
    #[default]
    Continuous,
    /// Simple up to the first period, compounded thereafter.
    SimpleThenCompounded,
    /// Compounded up to the last period, simple thereafter.
    CompoundedThenSimple,
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Compounding::Simple => "Simple",
            Compounding::Compounded => "Compounded",
            Compounding::Continuous => "Continuous",
            Compounding::SimpleThenCompounded => "SimpleThenCompounded",
            Compounding::CompoundedThenSimple => "CompoundedThenSimple",
        };
        f.write_str(s)
    }
}

impl FromStr for Compounding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Compounding::Simple),
            "compounded" => Ok(Compounding::Compounded),
            "continuous" => Ok(Compounding::Continuous),
            "simplethencompounded" => Ok(Compounding::SimpleThenCompounded),
            "compoundedthensimple" => Ok(Compounding::CompoundedThenSimple),
            other => Err(Error::Configuration(format!("unknown compounding '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("continuous".parse::<Compounding>().unwrap(), Compounding::Continuous);
        assert_eq!("Simple".parse::<Compounding>().unwrap(), Compounding::Simple);
        assert!("daily".parse::<Compounding>().is_err());
    }
}
