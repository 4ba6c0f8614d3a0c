//! Background loop that triggers payroll when it falls due.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::SalaryCycle;

use super::job::{PayrollJob, PayrollRunReport};
use super::schedule::PayrollSchedule;

/// Polls the schedule and runs the payroll job when a window is due.
pub struct SchedulerRunner {
    job: PayrollJob,
    schedule: PayrollSchedule,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
}

impl SchedulerRunner {
    /// Creates a runner.
    pub fn new(
        job: PayrollJob,
        schedule: PayrollSchedule,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            job,
            schedule,
            clock,
            poll_interval,
        }
    }

    /// Checks the schedule once and runs the job if a window is due and not
    /// yet fully delivered.
    pub fn tick(&self) -> EngineResult<Option<PayrollRunReport>> {
        let now = self.clock.now();
        let cycles = self.salary_cycles()?;
        let Some(window) = self.schedule.due_window(now, &cycles) else {
            return Ok(None);
        };
        if self.job.is_window_complete(&window)? {
            debug!(window = %window, "Payroll window already complete");
            return Ok(None);
        }
        info!(window = %window, "Payroll window due");
        self.job.run(&window, now).map(Some)
    }

    fn salary_cycles(&self) -> EngineResult<Vec<SalaryCycle>> {
        if self.schedule.uses_salary_cycles() {
            self.job.salary_cycles()
        } else {
            Ok(Vec::new())
        }
    }

    /// Runs until `shutdown` turns true or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let runner = Arc::new(self);
        let mut ticker = interval(runner.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let cycles = runner.salary_cycles().unwrap_or_default();
        info!(
            poll_interval_secs = runner.poll_interval.as_secs(),
            next_run_date = ?runner.schedule.next_run_date(runner.clock.today(), &cycles),
            "Payroll scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let tick_runner = Arc::clone(&runner);
                    match tokio::task::spawn_blocking(move || tick_runner.tick()).await {
                        Ok(Ok(_)) => {}
                        Ok(Err(EngineError::ConfigurationMissing)) => {
                            warn!("Payroll due but no pay policy is configured");
                        }
                        Ok(Err(err)) => error!(error = %err, "Payroll run failed"),
                        Err(err) => error!(error = %err, "Payroll task panicked"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Payroll scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{AttendanceRecord, Level, NewTeacher, PayPolicy, SalaryCycleBatch};
    use crate::notification::RecordingNotifier;
    use crate::scheduler::{DEFAULT_RUN_TIME, PayrollJobSettings};
    use crate::store::{
        AttendanceLedger, LevelRepository, MemoryStore, PolicyStore, SalaryCycleRepository,
        TeacherRepository,
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn runner_at(now: NaiveDateTime) -> (SchedulerRunner, Arc<RecordingNotifier>, Arc<ManualClock>) {
        let (runner, _, notifier, clock) = runner_with(
            now,
            PayrollSchedule::MonthStart {
                run_time: DEFAULT_RUN_TIME,
            },
        );
        (runner, notifier, clock)
    }

    fn runner_with(
        now: NaiveDateTime,
        schedule: PayrollSchedule,
    ) -> (SchedulerRunner, Arc<MemoryStore>, Arc<RecordingNotifier>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        store
            .initialize_policy(PayPolicy::new(Decimal::from(8), Decimal::from(50)).unwrap())
            .unwrap();
        let level = store.insert_level(Level::new("Graduate", Decimal::from(10)).unwrap()).unwrap();
        let teacher = store
            .insert_teacher(
                NewTeacher {
                    first_name: "Ada".to_string(),
                    last_name: "Obi".to_string(),
                    email: "ada@school.org".to_string(),
                    level_id: level.id,
                    account_number: None,
                    account_name: String::new(),
                    bank: String::new(),
                }
                .into_teacher(make_datetime("2026-02-01", "09:00:00"))
                .unwrap(),
            )
            .unwrap();
        let mut record = AttendanceRecord::open(teacher.id, make_datetime("2026-03-02", "08:00:00"));
        record.clock_out = Some(make_datetime("2026-03-02", "16:00:00"));
        store.insert_attendance(record).unwrap();

        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(ManualClock::new(now));
        let job = PayrollJob::new(store.clone(), notifier.clone(), PayrollJobSettings::default());
        let runner = SchedulerRunner::new(job, schedule, clock.clone(), Duration::from_millis(10));
        (runner, store, notifier, clock)
    }

    #[test]
    fn test_tick_runs_once_per_window() {
        let (runner, notifier, clock) = runner_at(make_datetime("2026-03-31", "09:00:00"));
        assert!(runner.tick().unwrap().is_none());

        clock.set(make_datetime("2026-04-01", "09:00:00"));
        let report = runner.tick().unwrap().unwrap();
        assert_eq!(report.dispatched, 1);

        clock.set(make_datetime("2026-04-01", "09:05:00"));
        assert!(runner.tick().unwrap().is_none());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (runner, notifier, _) = runner_at(make_datetime("2026-04-01", "09:30:00"));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(runner.run(rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(notifier.sent().len(), 1);
    }

    #[test]
    fn test_tick_sees_cycles_added_after_start() {
        let (runner, store, notifier, clock) = runner_with(
            make_datetime("2026-03-14", "09:00:00"),
            PayrollSchedule::SalaryCycle {
                run_time: DEFAULT_RUN_TIME,
            },
        );
        assert!(runner.tick().unwrap().is_none());

        store
            .insert_salary_cycles(
                SalaryCycleBatch {
                    start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                    days_in_cycle: 14,
                    number_of_cycles: 2,
                    average_work_hours: 8,
                }
                .generate()
                .unwrap(),
            )
            .unwrap();

        let report = runner.tick().unwrap().unwrap();
        assert_eq!(report.window.end_date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert_eq!(report.dispatched, 1);

        clock.set(make_datetime("2026-03-20", "09:00:00"));
        assert!(runner.tick().unwrap().is_none());
        assert_eq!(notifier.sent().len(), 1);
    }
}
