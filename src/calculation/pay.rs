//! Overtime rate and pay calculation.
//!
//! Overtime is paid at the teacher's pay grade inflated by the policy's
//! overtime percentage. Regular and overtime pay are kept at full precision
//! here; rounding happens when the statement is assembled.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AuditStep, PayPolicy};

/// The result of deriving the overtime rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRateResult {
    /// The hourly overtime rate.
    pub rate: Decimal,
    /// The audit step recording this derivation.
    pub audit_step: AuditStep,
}

/// Derives the overtime rate from a pay grade.
///
/// `rate = pay_grade × (1 + overtime_percent / 100)`
///
/// # Example
///
/// ```
/// use teacher_payroll::calculation::calculate_overtime_rate;
/// use teacher_payroll::models::PayPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = PayPolicy::new(Decimal::from(8), Decimal::from(50)).unwrap();
/// let result = calculate_overtime_rate(Decimal::from(10), &policy, None, 1);
/// assert_eq!(result.rate, Decimal::from(15));
/// ```
pub fn calculate_overtime_rate(
    pay_grade: Decimal,
    policy: &PayPolicy,
    teacher_id: Option<Uuid>,
    step_number: u32,
) -> OvertimeRateResult {
    let multiplier = policy.overtime_multiplier();
    let rate = pay_grade * multiplier;

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime_rate".to_string(),
        rule_name: "Overtime Rate".to_string(),
        teacher_id,
        input: serde_json::json!({
            "pay_grade": pay_grade.normalize().to_string(),
            "overtime_percent": policy.overtime_percent.normalize().to_string()
        }),
        output: serde_json::json!({
            "multiplier": multiplier.normalize().to_string(),
            "overtime_rate": rate.normalize().to_string()
        }),
        reasoning: format!(
            "Pay grade ${} × {} ({}% overtime) = ${}/hr",
            pay_grade.normalize(),
            multiplier.normalize(),
            policy.overtime_percent.normalize(),
            rate.normalize()
        ),
    };

    OvertimeRateResult { rate, audit_step }
}

/// Unrounded pay for one teacher's window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayCalculation {
    /// regular_hours_paid × pay_grade.
    pub regular_pay: Decimal,
    /// overtime_hours × overtime_rate.
    pub overtime_pay: Decimal,
    /// regular_pay + overtime_pay.
    pub total_pay: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates regular and overtime pay.
///
/// # Example
///
/// ```
/// use teacher_payroll::calculation::calculate_pay;
/// use rust_decimal::Decimal;
///
/// let result = calculate_pay(
///     Decimal::from(24),
///     Decimal::from(6),
///     Decimal::from(10),
///     Decimal::from(15),
///     None,
///     1,
/// );
/// assert_eq!(result.regular_pay, Decimal::from(240));
/// assert_eq!(result.overtime_pay, Decimal::from(90));
/// assert_eq!(result.total_pay, Decimal::from(330));
/// ```
pub fn calculate_pay(
    regular_hours_paid: Decimal,
    overtime_hours: Decimal,
    pay_grade: Decimal,
    overtime_rate: Decimal,
    teacher_id: Option<Uuid>,
    step_number: u32,
) -> PayCalculation {
    let regular_pay = regular_hours_paid * pay_grade;
    let overtime_pay = overtime_hours * overtime_rate;
    let total_pay = regular_pay + overtime_pay;

    let audit_step = AuditStep {
        step_number,
        rule_id: "pay_calculation".to_string(),
        rule_name: "Pay Calculation".to_string(),
        teacher_id,
        input: serde_json::json!({
            "regular_hours_paid": regular_hours_paid.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string(),
            "pay_grade": pay_grade.normalize().to_string(),
            "overtime_rate": overtime_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "regular_pay": regular_pay.normalize().to_string(),
            "overtime_pay": overtime_pay.normalize().to_string(),
            "total_pay": total_pay.normalize().to_string()
        }),
        reasoning: format!(
            "{} regular hours × ${} = ${}; {} overtime hours × ${} = ${}",
            regular_hours_paid.round_dp(4).normalize(),
            pay_grade.normalize(),
            regular_pay.round_dp(4).normalize(),
            overtime_hours.round_dp(4).normalize(),
            overtime_rate.normalize(),
            overtime_pay.round_dp(4).normalize()
        ),
    };

    PayCalculation {
        regular_pay,
        overtime_pay,
        total_pay,
        audit_step,
    }
}
