//! Salary cycle model.
//!
//! A [`SalaryCycle`] is a stored date range that payroll runs against when
//! the organisation pays on fixed-length cycles instead of calendar months.
//! Cycles are created in batches from a [`SalaryCycleBatch`].

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{PayWindow, RecordStatus};

/// Largest number of cycles one batch may create.
pub const MAX_CYCLES_PER_BATCH: u32 = 1000;

/// A fixed-length payroll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryCycle {
    /// Unique identifier for the cycle.
    pub id: Uuid,
    /// First day of the cycle (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the cycle (inclusive). Payroll runs on this day.
    pub end_date: NaiveDate,
    /// Expected working hours per day during the cycle.
    pub average_work_hours: u32,
    /// Soft-delete status.
    #[serde(default)]
    pub status: RecordStatus,
}

impl SalaryCycle {
    /// Creates an active cycle, rejecting one that ends before it starts.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        average_work_hours: u32,
    ) -> EngineResult<Self> {
        PayWindow::new(start_date, end_date)?;
        validate_average_work_hours(average_work_hours)?;
        Ok(Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            average_work_hours,
            status: RecordStatus::Active,
        })
    }

    /// The window covered by this cycle.
    pub fn window(&self) -> PayWindow {
        PayWindow {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Applies a partial update. The cycle is left untouched on error.
    pub fn apply(&mut self, update: &SalaryCycleUpdate) -> EngineResult<()> {
        let start_date = update.start_date.unwrap_or(self.start_date);
        let end_date = update.end_date.unwrap_or(self.end_date);
        PayWindow::new(start_date, end_date)?;
        if let Some(hours) = update.average_work_hours {
            validate_average_work_hours(hours)?;
            self.average_work_hours = hours;
        }
        self.start_date = start_date;
        self.end_date = end_date;
        Ok(())
    }
}

/// Partial update for a [`SalaryCycle`]; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryCycleUpdate {
    /// New first day.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// New last day.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// New average work hours.
    #[serde(default)]
    pub average_work_hours: Option<u32>,
}

/// A run of back-to-back cycles to create in one go.
///
/// # Example
///
/// ```
/// use teacher_payroll::models::SalaryCycleBatch;
/// use chrono::NaiveDate;
///
/// let batch = SalaryCycleBatch {
///     start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     days_in_cycle: 14,
///     number_of_cycles: 2,
///     average_work_hours: 8,
/// };
/// let cycles = batch.generate().unwrap();
/// assert_eq!(cycles[0].end_date, NaiveDate::from_ymd_opt(2026, 1, 14).unwrap());
/// assert_eq!(cycles[1].start_date, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryCycleBatch {
    /// First day of the first cycle.
    pub start_date: NaiveDate,
    /// Days in every cycle.
    pub days_in_cycle: u32,
    /// Number of cycles to create.
    pub number_of_cycles: u32,
    /// Expected working hours per day.
    #[serde(default)]
    pub average_work_hours: u32,
}

impl SalaryCycleBatch {
    /// Builds the cycles. Each one starts the day after the previous one ends.
    ///
    /// # Errors
    ///
    /// `InvalidSalaryCycle` when the cycle length or count is zero, the count
    /// exceeds [`MAX_CYCLES_PER_BATCH`], or the last cycle would end past the
    /// latest representable date.
    pub fn generate(&self) -> EngineResult<Vec<SalaryCycle>> {
        if self.days_in_cycle == 0 {
            return Err(invalid("days_in_cycle", "must be at least 1"));
        }
        if self.number_of_cycles == 0 || self.number_of_cycles > MAX_CYCLES_PER_BATCH {
            return Err(invalid(
                "number_of_cycles",
                &format!("must be between 1 and {}", MAX_CYCLES_PER_BATCH),
            ));
        }
        let out_of_range = || invalid("days_in_cycle", "cycles run past the last supported date");

        let mut cycles = Vec::with_capacity(self.number_of_cycles as usize);
        let mut start_date = self.start_date;
        for index in 0..self.number_of_cycles {
            if index > 0 {
                start_date = start_date
                    .checked_add_days(Days::new(u64::from(self.days_in_cycle)))
                    .ok_or_else(out_of_range)?;
            }
            let end_date = start_date
                .checked_add_days(Days::new(u64::from(self.days_in_cycle) - 1))
                .ok_or_else(out_of_range)?;
            cycles.push(SalaryCycle::new(start_date, end_date, self.average_work_hours)?);
        }
        Ok(cycles)
    }
}

fn validate_average_work_hours(hours: u32) -> EngineResult<()> {
    if hours > 24 {
        return Err(invalid("average_work_hours", "must be at most 24"));
    }
    Ok(())
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidSalaryCycle {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(days_in_cycle: u32, number_of_cycles: u32) -> SalaryCycleBatch {
        SalaryCycleBatch {
            start_date: date(2026, 1, 1),
            days_in_cycle,
            number_of_cycles,
            average_work_hours: 8,
        }
    }

    #[test]
    fn test_generated_cycles_do_not_overlap() {
        let cycles = batch(30, 3).generate().unwrap();
        assert_eq!(cycles.len(), 3);
        for pair in cycles.windows(2) {
            assert_eq!(pair[1].start_date, pair[0].end_date.succ_opt().unwrap());
        }
        assert_eq!(cycles[2].end_date, date(2026, 3, 31));
        assert!(cycles.iter().all(|c| c.status.is_active()));
    }

    #[test]
    fn test_zero_length_cycle_rejected() {
        let result = batch(0, 3).generate();
        assert!(matches!(
            result,
            Err(EngineError::InvalidSalaryCycle { ref field, .. }) if field == "days_in_cycle"
        ));
    }

    #[test]
    fn test_cycle_count_bounds() {
        assert!(batch(14, 0).generate().is_err());
        assert!(batch(14, MAX_CYCLES_PER_BATCH + 1).generate().is_err());
        assert_eq!(batch(1, MAX_CYCLES_PER_BATCH).generate().unwrap().len(), 1000);
    }

    #[test]
    fn test_oversized_cycle_is_an_error_not_a_panic() {
        let result = batch(u32::MAX, 2).generate();
        assert!(matches!(result, Err(EngineError::InvalidSalaryCycle { .. })));

        let late = SalaryCycleBatch {
            start_date: NaiveDate::MAX.pred_opt().unwrap(),
            ..batch(2, 2)
        };
        assert!(matches!(
            late.generate(),
            Err(EngineError::InvalidSalaryCycle { .. })
        ));
    }

    #[test]
    fn test_update_rejects_inverted_range() {
        let mut cycle = SalaryCycle::new(date(2026, 1, 1), date(2026, 1, 14), 8).unwrap();
        let result = cycle.apply(&SalaryCycleUpdate {
            end_date: Some(date(2025, 12, 31)),
            average_work_hours: Some(7),
            ..Default::default()
        });
        assert!(matches!(result, Err(EngineError::InvalidWindow { .. })));
        assert_eq!(cycle.end_date, date(2026, 1, 14));
        assert_eq!(cycle.average_work_hours, 8);

        cycle
            .apply(&SalaryCycleUpdate {
                end_date: Some(date(2026, 1, 15)),
                average_work_hours: Some(7),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(cycle.window().days(), 15);
        assert_eq!(cycle.average_work_hours, 7);
    }

    #[test]
    fn test_batch_deserialization() {
        let json = r#"{"start_date": "2026-01-01", "days_in_cycle": 14, "number_of_cycles": 2}"#;
        let batch: SalaryCycleBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.average_work_hours, 0);
        assert_eq!(batch.generate().unwrap().len(), 2);
    }
}
