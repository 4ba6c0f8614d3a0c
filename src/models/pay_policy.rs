//! Organisation pay policy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The organisation-wide parameters used for payroll.
///
/// Exactly one policy exists at a time; the policy store enforces this.
///
/// # Example
///
/// ```
/// use teacher_payroll::models::PayPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = PayPolicy::new(Decimal::from(8), Decimal::from(50)).unwrap();
/// assert_eq!(policy.overtime_multiplier(), Decimal::new(15, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPolicy {
    /// Regular hours expected per attended day.
    pub work_hours_per_day: Decimal,
    /// Premium on top of the hourly rate for overtime, in percent.
    pub overtime_percent: Decimal,
}

impl PayPolicy {
    /// Builds a validated policy.
    pub fn new(work_hours_per_day: Decimal, overtime_percent: Decimal) -> EngineResult<Self> {
        let policy = Self {
            work_hours_per_day,
            overtime_percent,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Checks that work hours are positive and the overtime premium is not negative.
    pub fn validate(&self) -> EngineResult<()> {
        if self.work_hours_per_day <= Decimal::ZERO {
            return Err(EngineError::InvalidPolicy {
                field: "work_hours_per_day".to_string(),
                message: format!("must be positive, got {}", self.work_hours_per_day),
            });
        }
        if self.overtime_percent < Decimal::ZERO {
            return Err(EngineError::InvalidPolicy {
                field: "overtime_percent".to_string(),
                message: format!("must not be negative, got {}", self.overtime_percent),
            });
        }
        Ok(())
    }

    /// `1 + overtime_percent / 100`.
    pub fn overtime_multiplier(&self) -> Decimal {
        Decimal::ONE + self.overtime_percent / Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_zero_work_hours_rejected() {
        match PayPolicy::new(dec("0"), dec("50")) {
            Err(EngineError::InvalidPolicy { field, .. }) => {
                assert_eq!(field, "work_hours_per_day")
            }
            other => panic!("Expected InvalidPolicy, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_overtime_rejected() {
        match PayPolicy::new(dec("8"), dec("-5")) {
            Err(EngineError::InvalidPolicy { field, .. }) => assert_eq!(field, "overtime_percent"),
            other => panic!("Expected InvalidPolicy, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_overtime_percent_allowed() {
        let policy = PayPolicy::new(dec("7.5"), dec("0")).unwrap();
        assert_eq!(policy.overtime_multiplier(), Decimal::ONE);
    }

    #[test]
    fn test_fractional_overtime_multiplier() {
        let policy = PayPolicy::new(dec("8"), dec("12.5")).unwrap();
        assert_eq!(policy.overtime_multiplier(), dec("1.125"));
    }

    #[test]
    fn test_policy_deserialization_from_yaml_numbers() {
        let yaml = "work_hours_per_day: 8\novertime_percent: 50\n";
        let policy: PayPolicy = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(policy.work_hours_per_day, dec("8"));
        assert_eq!(policy.overtime_percent, dec("50"));
    }
}
