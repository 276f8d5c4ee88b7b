//! Option exercise schedules (translates `ql/exercise.hpp`).

use ql_core::errors::Result;
use ql_time::Date;
use std::fmt;

/// Type of exercise right.
///
/// Corresponds to `QuantLib::Exercise::Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseType {
    /// Exercisable on one date only.
    European,
    /// Exercisable on a set of dates.
    Bermudan,
}

/// When an option may be exercised.
///
/// Corresponds to `QuantLib::EuropeanExercise` and `QuantLib::BermudanExercise`.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    exercise_type: ExerciseType,
    dates: Vec<Date>,
}

impl Exercise {
    /// Exercise on `expiry` only.
    pub fn european(expiry: Date) -> Self {
        Self {
            exercise_type: ExerciseType::European,
            dates: vec![expiry],
        }
    }

    /// Exercise on any of `dates`, which are sorted and deduplicated.
    ///
    /// # Errors
    /// A configuration error for an empty date set.
    pub fn bermudan(mut dates: Vec<Date>) -> Result<Self> {
        ql_core::ensure!(!dates.is_empty(), "Bermudan exercise needs at least one date");
        dates.sort();
        dates.dedup();
        Ok(Self {
            exercise_type: ExerciseType::Bermudan,
            dates,
        })
    }

    /// The last exercise date.
    pub fn last_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    /// All exercise dates, ascending.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exercise_type {
            ExerciseType::European => write!(f, "European({})", self.dates[0]),
            ExerciseType::Bermudan => write!(f, "Bermudan({} dates)", self.dates.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn european_exercise() {
        let expiry = Date::from_ymd(2026, 6, 15).unwrap();
        let ex = Exercise::european(expiry);
        assert_eq!(ex.exercise_type(), ExerciseType::European);
        assert_eq!(ex.last_date(), expiry);
        assert_eq!(ex.to_string(), "European(2026-06-15)");
    }

    #[test]
    fn bermudan_dates_are_sorted() {
        let d1 = Date::from_ymd(2025, 6, 15).unwrap();
        let d2 = Date::from_ymd(2026, 6, 15).unwrap();
        let ex = Exercise::bermudan(vec![d2, d1, d2]).unwrap();
        assert_eq!(ex.dates(), &[d1, d2]);
        assert_eq!(ex.last_date(), d2);
        assert!(Exercise::bermudan(vec![]).is_err());
    }
}
