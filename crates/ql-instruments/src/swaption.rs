//! Swaptions (translates `ql/instruments/swaption.hpp`).

use crate::exercise::Exercise;
use crate::instrument::Instrument;
use crate::swap::VanillaSwap;
use ql_time::Date;
use std::sync::Arc;

/// How a swaption settles on exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SettlementType {
    /// The underlying swap is entered.
    #[default]
    Physical,
    /// Its value is paid in cash.
    Cash,
}

/// An option to enter a vanilla swap.
///
/// Corresponds to `QuantLib::Swaption`.
#[derive(Debug, Clone)]
pub struct Swaption {
    underlying: Arc<VanillaSwap>,
    exercise: Exercise,
    settlement_type: SettlementType,
}

impl Swaption {
    /// A physically settled swaption.
    pub fn new(underlying: Arc<VanillaSwap>, exercise: Exercise) -> Self {
        Self {
            underlying,
            exercise,
            settlement_type: SettlementType::Physical,
        }
    }

    /// Change the settlement type.
    pub fn with_settlement_type(mut self, settlement_type: SettlementType) -> Self {
        self.settlement_type = settlement_type;
        self
    }

    /// The swap entered on exercise.
    pub fn underlying(&self) -> &Arc<VanillaSwap> {
        &self.underlying
    }

    /// Exercise dates.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// Settlement type.
    pub fn settlement_type(&self) -> SettlementType {
        self.settlement_type
    }
}

impl Instrument for Swaption {
    fn maturity_date(&self) -> Option<Date> {
        Some(self.exercise.last_date())
    }

    fn is_expired(&self, evaluation_date: Date) -> bool {
        self.exercise.last_date() < evaluation_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::SwapType;
    use ql_indexes::euribor;
    use ql_time::{DayCounter, Period, TimeUnit};

    #[test]
    fn expires_after_the_last_exercise_date() {
        let start = Date::from_ymd(2026, 1, 6).unwrap();
        let swap = VanillaSwap::from_index(
            SwapType::Payer,
            start,
            Period::new(5, TimeUnit::Years),
            Arc::new(euribor(Period::new(6, TimeUnit::Months))),
            0.03,
            Period::new(1, TimeUnit::Years),
            DayCounter::Thirty360,
        )
        .unwrap();
        let expiry = Date::from_ymd(2026, 1, 2).unwrap();
        let swaption = Swaption::new(Arc::new(swap), Exercise::european(expiry))
            .with_settlement_type(SettlementType::Cash);
        assert_eq!(swaption.settlement_type(), SettlementType::Cash);
        assert!(!swaption.is_expired(expiry));
        assert!(swaption.is_expired(expiry + 1));
        assert_eq!(swaption.underlying().fixed_leg().len(), 5);
    }
}
