//! `CashFlow` trait — the base for all cash-flow types.
//!
//! Translates `ql/cashflows/cashflow.hpp`.

use crate::coupon::Coupon;
use ql_core::{errors::Result, Real};
use ql_termstructures::YieldTermStructure;
use ql_time::Date;
use std::fmt;
use std::sync::Arc;

/// An amount paid on a date.
///
/// Corresponds to `QuantLib::CashFlow`.
pub trait CashFlow: fmt::Debug + Send + Sync {
    /// Payment date.
    fn date(&self) -> Date;

    /// Amount paid, forecasting floating rates from the flow's own index.
    fn amount(&self) -> Result<Real>;

    /// Amount paid, forecasting floating rates from `forwarding`.
    fn amount_on(&self, _forwarding: &dyn YieldTermStructure) -> Result<Real> {
        self.amount()
    }

    /// Whether the flow was paid before `ref_date`.  A flow paid on
    /// `ref_date` counts as occurred unless `include_ref_date` is set.
    fn has_occurred(&self, ref_date: Date, include_ref_date: bool) -> bool {
        if include_ref_date {
            self.date() < ref_date
        } else {
            self.date() <= ref_date
        }
    }

    /// The flow as a coupon, if it is one.
    fn as_coupon(&self) -> Option<&dyn Coupon> {
        None
    }
}

/// A sequence of cash flows.
///
/// Corresponds to `QuantLib::Leg`.
pub type Leg = Vec<Arc<dyn CashFlow>>;

/// A known amount on a known date; notional exchanges are modelled this way.
///
/// Corresponds to `QuantLib::SimpleCashFlow`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleCashFlow {
    /// The payment amount.
    pub amount: Real,
    /// The payment date.
    pub date: Date,
}

impl SimpleCashFlow {
    /// Create a new simple cash flow.
    pub fn new(amount: Real, date: Date) -> Self {
        Self { amount, date }
    }
}

impl CashFlow for SimpleCashFlow {
    fn date(&self) -> Date {
        self.date
    }

    fn amount(&self) -> Result<Real> {
        Ok(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_date_flows() {
        let d = Date::from_ymd(2025, 6, 16).unwrap();
        let cf = SimpleCashFlow::new(-1.0, d);
        assert_eq!(cf.amount().unwrap(), -1.0);
        assert!(!cf.has_occurred(d - 1, false));
        assert!(cf.has_occurred(d, false));
        assert!(!cf.has_occurred(d, true));
        assert!(cf.has_occurred(d + 1, true));
        assert!(cf.as_coupon().is_none());
    }
}
