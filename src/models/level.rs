//! Level (pay grade) model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::RecordStatus;

/// A pay tier; `pay_grade` is the hourly rate for teachers on this level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Unique identifier for the level.
    pub id: Uuid,
    /// Human-readable name (e.g. "Graduate", "Senior").
    pub name: String,
    /// Hourly rate.
    pub pay_grade: Decimal,
    /// Soft-delete status.
    #[serde(default)]
    pub status: RecordStatus,
}

impl Level {
    /// Creates an active level after validating its fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use teacher_payroll::models::Level;
    /// use rust_decimal::Decimal;
    ///
    /// let level = Level::new("Graduate", Decimal::new(1250, 2)).unwrap();
    /// assert_eq!(level.pay_grade, Decimal::new(1250, 2));
    /// assert!(Level::new("Broken", Decimal::ZERO).is_err());
    /// ```
    pub fn new(name: impl Into<String>, pay_grade: Decimal) -> EngineResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_pay_grade(pay_grade)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            pay_grade,
            status: RecordStatus::Active,
        })
    }

    /// Applies a partial update, validating any field that changes.
    pub fn apply(&mut self, update: LevelUpdate) -> EngineResult<()> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(pay_grade) = update.pay_grade {
            validate_pay_grade(pay_grade)?;
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(pay_grade) = update.pay_grade {
            self.pay_grade = pay_grade;
        }
        Ok(())
    }
}

/// Partial update for a [`Level`]; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpdate {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New hourly rate.
    #[serde(default)]
    pub pay_grade: Option<Decimal>,
}

fn validate_name(name: &str) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::InvalidLevel {
            field: "name".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_pay_grade(pay_grade: Decimal) -> EngineResult<()> {
    if pay_grade <= Decimal::ZERO {
        return Err(EngineError::InvalidLevel {
            field: "pay_grade".to_string(),
            message: format!("must be positive, got {}", pay_grade),
        });
    }
    Ok(())
}
