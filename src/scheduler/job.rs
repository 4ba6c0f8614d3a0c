//! The payroll job.
//!
//! One run closes forgotten attendance, reads a snapshot of the window's
//! qualifying attendance, computes statements and delivers them. Delivery is
//! tracked per teacher and window, so running the job again for the same
//! window only retries the teachers who have not been paid a slip yet. Each
//! slip is claimed in the store before it is sent, which keeps two
//! overlapping runs (a scheduled tick and a manual trigger) from both
//! sending it.

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::{DEFAULT_AUTO_CLOSE_TIME, reconcile_open_attendance};
use crate::calculation::run_payroll;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditTrace, PayStatement, PayWindow};
use crate::notification::{Notifier, PayslipTemplateData};
use crate::models::SalaryCycle;
use crate::store::{
    AttendanceLedger, DispatchClaim, DispatchLog, PayrollStore, PolicyStore, SalaryCycleRepository,
};

/// Default number of immediate delivery attempts per teacher.
pub const DEFAULT_MAX_DELIVERY_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(3) {
    Some(attempts) => attempts,
    None => NonZeroU32::MIN,
};

/// Default subject line for pay slips.
pub const DEFAULT_PAY_STATEMENT_SUBJECT: &str = "Your Pay Slip Has Arrived";

/// Tunables for [`PayrollJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollJobSettings {
    /// Cutoff at which open attendance is closed.
    pub auto_close_time: NaiveTime,
    /// Immediate attempts per teacher before deferring to the next run.
    pub max_delivery_attempts: NonZeroU32,
    /// Subject line for pay slips.
    pub pay_statement_subject: String,
}

impl Default for PayrollJobSettings {
    fn default() -> Self {
        Self {
            auto_close_time: DEFAULT_AUTO_CLOSE_TIME,
            max_delivery_attempts: DEFAULT_MAX_DELIVERY_ATTEMPTS,
            pay_statement_subject: DEFAULT_PAY_STATEMENT_SUBJECT.to_string(),
        }
    }
}

/// A statement that could not be delivered in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDelivery {
    /// The teacher whose slip failed.
    pub teacher_id: Uuid,
    /// Where it was sent.
    pub email: String,
    /// The last error seen.
    pub error: String,
    /// How many attempts were made.
    pub attempts: u32,
}

/// Summary of one job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRunReport {
    /// Id of the underlying payroll run.
    pub run_id: Uuid,
    /// The window paid.
    pub window: PayWindow,
    /// Statements computed.
    pub statements_computed: usize,
    /// Sum of total pay over every computed statement.
    pub total_payout: Decimal,
    /// Open records closed at the cutoff.
    pub auto_closed: usize,
    /// Open records left out because they could not be closed.
    pub left_open: usize,
    /// Slips delivered in this run.
    pub dispatched: usize,
    /// Slips skipped because an earlier run delivered them.
    pub already_dispatched: usize,
    /// Slips skipped because a concurrent run was delivering them.
    pub in_flight: usize,
    /// Slips that failed every attempt in this run.
    pub failed: Vec<FailedDelivery>,
    /// Audit trace of the calculation, auto-close included.
    pub audit_trace: AuditTrace,
}

impl PayrollRunReport {
    /// True when every statement for the window has now been delivered.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.in_flight == 0
    }
}

/// Runs payroll for a window against a store and a notifier.
#[derive(Clone)]
pub struct PayrollJob {
    store: Arc<dyn PayrollStore>,
    notifier: Arc<dyn Notifier>,
    settings: PayrollJobSettings,
}

impl PayrollJob {
    /// Creates a job.
    pub fn new(
        store: Arc<dyn PayrollStore>,
        notifier: Arc<dyn Notifier>,
        settings: PayrollJobSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            settings,
        }
    }

    /// Whether every slip for `window` has already been delivered.
    pub fn is_window_complete(&self, window: &PayWindow) -> EngineResult<bool> {
        self.store.is_window_complete(window)
    }

    /// The active salary cycles the schedule may pay against.
    pub fn salary_cycles(&self) -> EngineResult<Vec<SalaryCycle>> {
        self.store.salary_cycles()
    }

    /// Runs payroll for `window` as of `now`.
    ///
    /// # Errors
    ///
    /// [`EngineError::ConfigurationMissing`] when no pay policy is set.
    /// Delivery failures are reported in the result, not as errors.
    pub fn run(&self, window: &PayWindow, now: NaiveDateTime) -> EngineResult<PayrollRunReport> {
        let policy = self
            .store
            .active_policy()?
            .ok_or(EngineError::ConfigurationMissing)?;

        let reconciliation = reconcile_open_attendance(
            self.store.as_ref(),
            window,
            self.settings.auto_close_time,
            now,
            1,
        )?;
        let rows = self.store.find_qualifying_attendance(window)?;
        let mut run = run_payroll(window, Some(&policy), &rows)?;

        run.audit_trace.steps.insert(0, reconciliation.audit_step);
        for (i, step) in run.audit_trace.steps.iter_mut().enumerate() {
            step.step_number = i as u32 + 1;
        }
        run.audit_trace.warnings.extend(reconciliation.warning);

        let mut dispatched = 0;
        let mut already_dispatched = 0;
        let mut in_flight = 0;
        let mut failed = Vec::new();

        for statement in &run.statements {
            match self.store.claim_dispatch(window, statement.teacher_id)? {
                DispatchClaim::Delivered => {
                    already_dispatched += 1;
                    continue;
                }
                DispatchClaim::InFlight => {
                    in_flight += 1;
                    continue;
                }
                DispatchClaim::Claimed => {}
            }
            match self.deliver(window, statement) {
                Ok(()) => {
                    self.store
                        .confirm_dispatch(window, statement.teacher_id, Utc::now())?;
                    dispatched += 1;
                }
                Err(failure) => {
                    self.store.release_dispatch(window, statement.teacher_id)?;
                    failed.push(failure);
                }
            }
        }

        if failed.is_empty() && in_flight == 0 {
            self.store.mark_window_complete(window)?;
        }

        let report = PayrollRunReport {
            run_id: run.run_id,
            window: *window,
            statements_computed: run.statements.len(),
            total_payout: run.total_payout(),
            auto_closed: reconciliation.closed.len(),
            left_open: reconciliation.still_open.len(),
            dispatched,
            already_dispatched,
            in_flight,
            failed,
            audit_trace: run.audit_trace,
        };

        info!(
            run_id = %report.run_id,
            window = %window,
            statements = report.statements_computed,
            total_payout = %report.total_payout,
            dispatched = report.dispatched,
            already_dispatched = report.already_dispatched,
            in_flight = report.in_flight,
            failed = report.failed.len(),
            "Payroll run completed"
        );
        Ok(report)
    }

    fn deliver(&self, window: &PayWindow, statement: &PayStatement) -> Result<(), FailedDelivery> {
        let body = PayslipTemplateData::from(statement).render(window);
        let max_attempts = self.settings.max_delivery_attempts.get();
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self
                .notifier
                .send(&statement.email, &self.settings.pay_statement_subject, &body)
            {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(
                        teacher_id = %statement.teacher_id,
                        attempt,
                        max_attempts,
                        error = %err,
                        "Pay slip delivery failed"
                    );
                    last_error = err.to_string();
                }
            }
        }

        Err(FailedDelivery {
            teacher_id: statement.teacher_id,
            email: statement.email.clone(),
            error: last_error,
            attempts: max_attempts,
        })
    }
}
