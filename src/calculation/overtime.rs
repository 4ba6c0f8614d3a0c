//! Regular capacity and overtime detection.
//!
//! Regular hours are a capacity figure: attended days multiplied by the
//! policy's daily hours. Anything worked beyond that capacity over the whole
//! window is overtime. A short day therefore still counts a full day towards
//! the capacity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::AuditStep;

/// Regular hours available to a teacher for the window.
///
/// # Example
///
/// ```
/// use teacher_payroll::calculation::regular_capacity;
/// use rust_decimal::Decimal;
///
/// assert_eq!(regular_capacity(3, Decimal::from(8)), Decimal::from(24));
/// ```
pub fn regular_capacity(days_attended: u32, work_hours_per_day: Decimal) -> Decimal {
    Decimal::from(days_attended) * work_hours_per_day
}

/// The split of worked hours into regular and overtime portions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeDetection {
    /// The regular capacity the split was made against.
    pub total_regular_hours: Decimal,
    /// Worked hours paid at the base rate (never above capacity).
    pub regular_hours_paid: Decimal,
    /// Worked hours beyond capacity (zero when under).
    pub overtime_hours: Decimal,
    /// The audit step recording this detection.
    pub audit_step: AuditStep,
}

/// Splits total worked hours against the regular capacity.
///
/// # Examples
///
/// ## Over capacity
///
/// ```
/// use teacher_payroll::calculation::detect_overtime;
/// use rust_decimal::Decimal;
///
/// let result = detect_overtime(Decimal::from(30), Decimal::from(24), None, 1);
/// assert_eq!(result.overtime_hours, Decimal::from(6));
/// assert_eq!(result.regular_hours_paid, Decimal::from(24));
/// ```
///
/// ## Under capacity
///
/// ```
/// use teacher_payroll::calculation::detect_overtime;
/// use rust_decimal::Decimal;
///
/// let result = detect_overtime(Decimal::from(20), Decimal::from(24), None, 1);
/// assert_eq!(result.overtime_hours, Decimal::ZERO);
/// assert_eq!(result.regular_hours_paid, Decimal::from(20));
/// ```
pub fn detect_overtime(
    total_worked_hours: Decimal,
    total_regular_hours: Decimal,
    teacher_id: Option<uuid::Uuid>,
    step_number: u32,
) -> OvertimeDetection {
    let overtime_hours = if total_worked_hours > total_regular_hours {
        total_worked_hours - total_regular_hours
    } else {
        Decimal::ZERO
    };
    let regular_hours_paid = total_worked_hours - overtime_hours;

    let reasoning = if overtime_hours > Decimal::ZERO {
        format!(
            "{} hours worked exceeds {} hour capacity by {} hours, triggering overtime",
            total_worked_hours.round_dp(4).normalize(),
            total_regular_hours.normalize(),
            overtime_hours.round_dp(4).normalize()
        )
    } else if total_worked_hours == total_regular_hours {
        format!(
            "{} hours worked equals {} hour capacity, no overtime triggered",
            total_worked_hours.round_dp(4).normalize(),
            total_regular_hours.normalize()
        )
    } else {
        format!(
            "{} hours worked is under {} hour capacity, no overtime triggered",
            total_worked_hours.round_dp(4).normalize(),
            total_regular_hours.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime_detection".to_string(),
        rule_name: "Overtime Detection".to_string(),
        teacher_id,
        input: serde_json::json!({
            "total_worked_hours": total_worked_hours.normalize().to_string(),
            "total_regular_hours": total_regular_hours.normalize().to_string()
        }),
        output: serde_json::json!({
            "regular_hours_paid": regular_hours_paid.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string()
        }),
        reasoning,
    };

    OvertimeDetection {
        total_regular_hours,
        regular_hours_paid,
        overtime_hours,
        audit_step,
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
    fn test_capacity_counts_days_not_hours() {
        assert_eq!(regular_capacity(0, dec("8")), dec("0"));
        assert_eq!(regular_capacity(5, dec("7.5")), dec("37.5"));
    }

    #[test]
    fn test_thirty_hours_over_three_days() {
        let capacity = regular_capacity(3, dec("8"));
        let result = detect_overtime(dec("30"), capacity, None, 1);

        assert_eq!(result.total_regular_hours, dec("24"));
        assert_eq!(result.overtime_hours, dec("6"));
        assert_eq!(result.regular_hours_paid, dec("24"));
        assert_eq!(result.audit_step.rule_id, "overtime_detection");
        assert_eq!(
            result.audit_step.output["overtime_hours"].as_str().unwrap(),
            "6"
        );
    }

    #[test]
    fn test_exactly_at_capacity() {
        let result = detect_overtime(dec("24.0"), dec("24"), None, 1);
        assert_eq!(result.overtime_hours, Decimal::ZERO);
        assert_eq!(result.regular_hours_paid, dec("24"));
        assert!(result.audit_step.reasoning.contains("equals"));
    }

    #[test]
    fn test_short_days_do_not_create_overtime() {
        // Three half days: 12 hours worked against 24 hours capacity.
        let result = detect_overtime(dec("12"), regular_capacity(3, dec("8")), None, 1);
        assert_eq!(result.overtime_hours, Decimal::ZERO);
        assert_eq!(result.regular_hours_paid, dec("12"));
        assert!(result.audit_step.reasoning.contains("under"));
    }

    #[test]
    fn test_long_day_offset_by_short_day() {
        // 11h + 5h over two 8h days: 16 worked, 16 capacity.
        let result = detect_overtime(dec("16"), regular_capacity(2, dec("8")), None, 1);
        assert_eq!(result.overtime_hours, Decimal::ZERO);
    }

    #[test]
    fn test_fractional_overtime() {
        let result = detect_overtime(dec("8.25"), dec("8"), None, 1);
        assert_eq!(result.overtime_hours, dec("0.25"));
        assert_eq!(result.regular_hours_paid, dec("8"));
    }

    #[test]
    fn test_step_number_and_teacher_passed_through() {
        let teacher = uuid::Uuid::new_v4();
        let result = detect_overtime(dec("10"), dec("8"), Some(teacher), 7);
        assert_eq!(result.audit_step.step_number, 7);
        assert_eq!(result.audit_step.teacher_id, Some(teacher));
    }
}
