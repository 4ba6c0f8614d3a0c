//! Plain-text message bodies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ChangeDirection, Level, PayStatement, PayWindow, Teacher};

/// Values rendered into a pay slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipTemplateData {
    /// The teacher's display name.
    pub teacher_name: String,
    /// Hours recorded between clock-in and clock-out.
    pub total_work_hours: Decimal,
    /// Attended-day capacity.
    pub total_regular_work_hours: Decimal,
    /// Hours beyond capacity.
    pub overtime_hours: Decimal,
    /// The teacher's hourly rate.
    pub pay_per_hour: Decimal,
    /// Pay for regular hours.
    pub work_hours_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Regular plus overtime pay.
    pub total_pay: Decimal,
}

impl From<&PayStatement> for PayslipTemplateData {
    fn from(statement: &PayStatement) -> Self {
        Self {
            teacher_name: statement.teacher_name.clone(),
            total_work_hours: statement.total_worked_hours,
            total_regular_work_hours: statement.total_regular_hours,
            overtime_hours: statement.overtime_hours,
            pay_per_hour: statement.pay_grade,
            work_hours_pay: statement.regular_pay,
            overtime_pay: statement.overtime_pay,
            total_pay: statement.total_pay,
        }
    }
}

impl PayslipTemplateData {
    /// Renders the pay slip body for `window`.
    ///
    /// # Example
    ///
    /// ```
    /// use teacher_payroll::notification::PayslipTemplateData;
    /// use teacher_payroll::models::PayWindow;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let data = PayslipTemplateData {
    ///     teacher_name: "Ada Obi".to_string(),
    ///     total_work_hours: Decimal::from(30),
    ///     total_regular_work_hours: Decimal::from(24),
    ///     overtime_hours: Decimal::from(6),
    ///     pay_per_hour: Decimal::from(10),
    ///     work_hours_pay: Decimal::from(240),
    ///     overtime_pay: Decimal::from(90),
    ///     total_pay: Decimal::from(330),
    /// };
    /// let window = PayWindow::calendar_month(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    /// let body = data.render(&window);
    /// assert!(body.contains("Total pay: 330.00"));
    /// ```
    pub fn render(&self, window: &PayWindow) -> String {
        format!(
            "Hello {name},\n\n\
             Your pay slip for {start} to {end} is ready.\n\n\
             Total work hours: {worked}\n\
             Regular work hours: {regular}\n\
             Overtime hours: {overtime}\n\
             Pay per hour: {rate}\n\
             Work hours pay: {regular_pay}\n\
             Overtime pay: {overtime_pay}\n\
             Total pay: {total}\n",
            name = self.teacher_name,
            start = window.start_date,
            end = window.end_date,
            worked = money(self.total_work_hours),
            regular = money(self.total_regular_work_hours),
            overtime = money(self.overtime_hours),
            rate = money(self.pay_per_hour),
            regular_pay = money(self.work_hours_pay),
            overtime_pay = money(self.overtime_pay),
            total = money(self.total_pay),
        )
    }
}

/// Renders the body sent after a promotion or demotion.
pub fn render_level_change(teacher: &Teacher, level: &Level, direction: ChangeDirection) -> String {
    let verb = match direction {
        ChangeDirection::Promotion => "promoted",
        ChangeDirection::Demotion => "demoted",
    };
    format!(
        "Hello {},\n\nYou have been {} to {}. Your new hourly rate is {}.\n",
        teacher.full_name(),
        verb,
        level.name,
        money(level.pay_grade)
    )
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}
