//! Pay statement and payroll run models.
//!
//! This module contains the [`PayStatement`] produced for each teacher, the
//! [`PayrollRun`] envelope wrapping a full run, and the audit types that
//! record every step of a calculation.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PayWindow;

/// Decimal places used when presenting hours and money.
pub const PRESENTATION_DP: u32 = 2;

/// Rounds a raw value to two decimal places, midpoint away from zero.
///
/// # Example
///
/// ```
/// use teacher_payroll::models::round_for_presentation;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_for_presentation(Decimal::new(12345, 3)), Decimal::new(1235, 2));
/// ```
pub fn round_for_presentation(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRESENTATION_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// One teacher's pay for a window.
///
/// All hour and money fields are rounded to two decimal places, and
/// `regular_pay + overtime_pay == total_pay` holds exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayStatement {
    /// The teacher this statement is for.
    pub teacher_id: Uuid,
    /// The teacher's display name.
    pub teacher_name: String,
    /// Where the statement is sent.
    pub email: String,
    /// The account the pay is sent to.
    pub account_number: Option<String>,
    /// Hourly rate used.
    pub pay_grade: Decimal,
    /// Attended days multiplied by the policy's daily hours.
    pub total_regular_hours: Decimal,
    /// Hours actually recorded between clock-in and clock-out.
    pub total_worked_hours: Decimal,
    /// Worked hours beyond regular capacity.
    pub overtime_hours: Decimal,
    /// Worked hours paid at the base rate.
    pub regular_hours_paid: Decimal,
    /// Hourly rate applied to overtime.
    pub overtime_rate: Decimal,
    /// Pay for regular hours.
    pub regular_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Sum of regular and overtime pay.
    pub total_pay: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The teacher the step applies to, when teacher-specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<Uuid>,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a payroll run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of computing payroll for a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run was computed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The window that was aggregated.
    pub window: PayWindow,
    /// One statement per teacher with qualifying attendance.
    pub statements: Vec<PayStatement>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl PayrollRun {
    /// Sum of `total_pay` over every statement.
    pub fn total_payout(&self) -> Decimal {
        self.statements.iter().map(|s| s.total_pay).sum()
    }
}
