//! Pay statement assembly.
//!
//! Ties the aggregation, overtime and pay steps together into one statement per
//! teacher. This is the only place values are rounded: each presented money
//! field is rounded on its own and `total_pay` is the sum of the rounded
//! components.

use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, PayPolicy, PayStatement, PayWindow, PayrollRun,
    QualifyingAttendance, round_for_presentation,
};

use super::aggregation::{TeacherAttendance, aggregate_attendance};
use super::overtime::{detect_overtime, regular_capacity};
use super::pay::{calculate_overtime_rate, calculate_pay};

/// Version stamped on every [`PayrollRun`].
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Computes one statement per teacher with qualifying attendance in `window`.
///
/// Statements come back ordered by teacher name, then id.
///
/// # Errors
///
/// - [`EngineError::ConfigurationMissing`] when `policy` is `None`.
/// - [`EngineError::InvalidAttendance`] when a row's clock-out is not after
///   its clock-in.
///
/// # Example
///
/// ```
/// use teacher_payroll::calculation::compute_statements;
/// use teacher_payroll::models::{PayPolicy, PayWindow};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let window = PayWindow::new(
///     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
/// )
/// .unwrap();
/// let policy = PayPolicy::new(Decimal::from(8), Decimal::from(50)).unwrap();
///
/// let statements = compute_statements(&window, Some(&policy), &[]).unwrap();
/// assert!(statements.is_empty());
/// ```
pub fn compute_statements(
    window: &PayWindow,
    policy: Option<&PayPolicy>,
    rows: &[QualifyingAttendance],
) -> EngineResult<Vec<PayStatement>> {
    run_payroll(window, policy, rows).map(|run| run.statements)
}

/// Computes statements and wraps them with a full audit trace.
pub fn run_payroll(
    window: &PayWindow,
    policy: Option<&PayPolicy>,
    rows: &[QualifyingAttendance],
) -> EngineResult<PayrollRun> {
    let start_time = Instant::now();
    let policy = policy.ok_or(EngineError::ConfigurationMissing)?;

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();

    let aggregation = aggregate_attendance(window, rows, 1)?;
    let mut step_number = aggregation.audit_steps.len() as u32 + 1;
    steps.extend(aggregation.audit_steps);

    if aggregation.ignored_rows > 0 {
        warnings.push(AuditWarning {
            code: "ROWS_OUTSIDE_WINDOW".to_string(),
            message: format!(
                "{} attendance row(s) dated outside {} were ignored",
                aggregation.ignored_rows, window
            ),
            severity: "low".to_string(),
        });
    }

    let mut statements = Vec::with_capacity(aggregation.teachers.len());
    for teacher in &aggregation.teachers {
        let (statement, teacher_steps) = assemble_statement(teacher, policy, step_number);
        step_number += teacher_steps.len() as u32;
        steps.extend(teacher_steps);
        statements.push(statement);
    }

    statements.sort_by(|a, b| {
        a.teacher_name
            .cmp(&b.teacher_name)
            .then_with(|| a.teacher_id.cmp(&b.teacher_id))
    });

    Ok(PayrollRun {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        window: *window,
        statements,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us: start_time.elapsed().as_micros() as u64,
        },
    })
}

fn assemble_statement(
    teacher: &TeacherAttendance,
    policy: &PayPolicy,
    step_number_start: u32,
) -> (PayStatement, Vec<AuditStep>) {
    let teacher_id = Some(teacher.teacher_id);
    let mut step_number = step_number_start;

    let capacity = regular_capacity(teacher.days_attended, policy.work_hours_per_day);
    let detection = detect_overtime(
        teacher.total_worked_hours,
        capacity,
        teacher_id,
        step_number,
    );
    step_number += 1;

    let rate = calculate_overtime_rate(teacher.pay_grade, policy, teacher_id, step_number);
    step_number += 1;

    let pay = calculate_pay(
        detection.regular_hours_paid,
        detection.overtime_hours,
        teacher.pay_grade,
        rate.rate,
        teacher_id,
        step_number,
    );
    step_number += 1;

    let regular_pay = round_for_presentation(pay.regular_pay);
    let overtime_pay = round_for_presentation(pay.overtime_pay);
    let total_pay = regular_pay + overtime_pay;

    let rounding_step = AuditStep {
        step_number,
        rule_id: "statement_rounding".to_string(),
        rule_name: "Statement Rounding".to_string(),
        teacher_id,
        input: serde_json::json!({
            "regular_pay": pay.regular_pay.normalize().to_string(),
            "overtime_pay": pay.overtime_pay.normalize().to_string()
        }),
        output: serde_json::json!({
            "regular_pay": regular_pay.to_string(),
            "overtime_pay": overtime_pay.to_string(),
            "total_pay": total_pay.to_string()
        }),
        reasoning: format!(
            "Rounded to 2dp: ${} + ${} = ${}",
            regular_pay, overtime_pay, total_pay
        ),
    };

    let statement = PayStatement {
        teacher_id: teacher.teacher_id,
        teacher_name: teacher.teacher_name.clone(),
        email: teacher.email.clone(),
        account_number: teacher.account_number.clone(),
        pay_grade: teacher.pay_grade,
        total_regular_hours: round_for_presentation(detection.total_regular_hours),
        total_worked_hours: round_for_presentation(teacher.total_worked_hours),
        overtime_hours: round_for_presentation(detection.overtime_hours),
        regular_hours_paid: round_for_presentation(detection.regular_hours_paid),
        overtime_rate: round_for_presentation(rate.rate),
        regular_pay,
        overtime_pay,
        total_pay,
    };

    (
        statement,
        vec![
            detection.audit_step,
            rate.audit_step,
            pay.audit_step,
            rounding_step,
        ],
    )
}
