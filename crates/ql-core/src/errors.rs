//! Error types for the multicurve workspace.
//!
//! A single `thiserror`-derived enum is shared by every crate.  Each variant
//! belongs to one of three [`ErrorKind`]s:
//!
//! * **Configuration** — malformed inputs detected before any numerical work
//!   (unsorted or duplicate nodes, unknown identifiers, reference-date
//!   mismatches, dependency cycles, missing curves);
//! * **Convergence** — a root finder or optimizer ran out of budget;
//! * **Domain** — a query outside the valid range of an object.
//!
//! The `ensure!`, `ensure_domain!` and `fail!` macros are the usual way to
//! produce them.

use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Malformed or inconsistent inputs.
    Configuration,
    /// Iteration budget exhausted or tolerance not met.
    Convergence,
    /// Query outside the valid domain.
    Domain,
}

/// The error type used throughout the workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Inputs are malformed or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A curve required by a calculation is absent or does not cover the
    /// requested date.
    #[error("missing external curve '{curve}' at {date}")]
    MissingCurve {
        /// Role or identifier of the curve.
        curve: String,
        /// Date (formatted) at which the curve was needed.
        date: String,
    },

    /// Invalid calendar date or period.
    #[error("date error: {0}")]
    Date(String),

    /// A solver or optimizer did not converge.
    #[error("{context} did not converge after {iterations} iterations (residual {residual:e})")]
    Convergence {
        /// What was being solved.
        context: String,
        /// Last residual observed.
        residual: f64,
        /// Iterations or evaluations spent.
        iterations: usize,
    },

    /// A query fell outside the domain of the object.
    #[error("domain error: {0}")]
    Domain(String),

    /// Failure while processing one rate helper.
    #[error("{helper} (pillar {pillar}): {source}")]
    Helper {
        /// Helper description.
        helper: String,
        /// Pillar date (formatted).
        pillar: String,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) | Error::MissingCurve { .. } | Error::Date(_) => {
                ErrorKind::Configuration
            }
            Error::Convergence { .. } => ErrorKind::Convergence,
            Error::Domain(_) => ErrorKind::Domain,
            Error::Helper { source, .. } => source.kind(),
        }
    }

    /// Attach the helper description and pillar to an error.
    pub fn in_helper(self, helper: impl Into<String>, pillar: impl ToString) -> Self {
        Error::Helper {
            helper: helper.into(),
            pillar: pillar.to_string(),
            source: Box::new(self),
        }
    }
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return a configuration error if the condition does not hold.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::{Error, ErrorKind}};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert_eq!(positive(-1.0).unwrap_err().kind(), ErrorKind::Configuration);
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Configuration(
                format!($($msg)*)
            ));
        }
    };
}

/// Return a domain error if the condition does not hold.
///
/// # Example
/// ```
/// use ql_core::{ensure_domain, errors::{Error, ErrorKind}};
/// fn sqrt(x: f64) -> ql_core::errors::Result<f64> {
///     ensure_domain!(x >= 0.0, "negative variance {x}");
///     Ok(x.sqrt())
/// }
/// assert_eq!(sqrt(-1.0).unwrap_err().kind(), ErrorKind::Domain);
/// ```
#[macro_export]
macro_rules! ensure_domain {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Domain(
                format!($($msg)*)
            ));
        }
    };
}

/// Return a configuration error immediately.
///
/// # Example
/// ```
/// use ql_core::{fail, errors::Error};
/// fn always_err() -> ql_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Configuration(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_error_inherits_kind() {
        let inner = Error::Convergence {
            context: "Brent".into(),
            residual: 1e-3,
            iterations: 100,
        };
        let wrapped = inner.in_helper("5Y swap", "2030-01-02");
        assert_eq!(wrapped.kind(), ErrorKind::Convergence);
        let msg = wrapped.to_string();
        assert!(msg.contains("5Y swap"));
        assert!(msg.contains("2030-01-02"));
    }

    #[test]
    fn missing_curve_is_configuration() {
        let e = Error::MissingCurve {
            curve: "pay discount".into(),
            date: "2030-01-02".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Configuration);
    }
}
