//! Configuration types for the payroll service.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::num::{NonZeroU32, NonZeroU64};
use std::time::Duration;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::attendance::{ClockRules, DEFAULT_AUTO_CLOSE_TIME, DEFAULT_MIN_SHIFT_MINUTES};
use crate::models::SalaryCycleBatch;
use crate::scheduler::{
    DEFAULT_MAX_DELIVERY_ATTEMPTS, DEFAULT_PAY_STATEMENT_SUBJECT, DEFAULT_RUN_TIME,
    PayrollJobSettings, PayrollSchedule,
};

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_min_shift_minutes() -> i64 {
    DEFAULT_MIN_SHIFT_MINUTES
}

fn default_auto_close_time() -> NaiveTime {
    DEFAULT_AUTO_CLOSE_TIME
}

fn default_run_time() -> NaiveTime {
    DEFAULT_RUN_TIME
}

fn default_poll_interval_secs() -> NonZeroU64 {
    NonZeroU64::new(60).unwrap_or(NonZeroU64::MIN)
}

fn default_max_delivery_attempts() -> NonZeroU32 {
    DEFAULT_MAX_DELIVERY_ATTEMPTS
}

fn default_from_email() -> String {
    "payroll@localhost".to_string()
}

fn default_pay_statement_subject() -> String {
    DEFAULT_PAY_STATEMENT_SUBJECT.to_string()
}

fn default_level_change_subject() -> String {
    "Your Level Has Changed".to_string()
}

/// The whole of `service.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Clock-in and clock-out rules.
    #[serde(default)]
    pub attendance: AttendanceConfig,
    /// When payroll runs and how it delivers.
    #[serde(default)]
    pub payroll: PayrollConfig,
    /// Outgoing message settings.
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address the server listens on, e.g. "0.0.0.0:8080".
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Attendance rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceConfig {
    /// Minimum minutes between clock-in and clock-out.
    #[serde(default = "default_min_shift_minutes")]
    pub min_shift_minutes: i64,
    /// Time of day forgotten clock-outs are closed at.
    #[serde(default = "default_auto_close_time")]
    pub auto_close_time: NaiveTime,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            min_shift_minutes: default_min_shift_minutes(),
            auto_close_time: default_auto_close_time(),
        }
    }
}

impl AttendanceConfig {
    /// The clock rules these settings describe.
    pub fn clock_rules(&self) -> ClockRules {
        ClockRules::with_min_shift_minutes(self.min_shift_minutes)
    }
}

/// The payroll calendar as written in YAML.
///
/// ```yaml
/// schedule:
///   mode: salary_cycle
///   run_time: "09:00:00"
/// ```
///
/// In salary cycle mode the cycles themselves are stored records, seeded from
/// `salary_cycles.yaml` and managed through the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScheduleConfig {
    /// First day of every month, for the previous month.
    MonthStart {
        /// Time of day the run becomes due.
        #[serde(default = "default_run_time")]
        run_time: NaiveTime,
    },
    /// At the end of each stored salary cycle.
    SalaryCycle {
        /// Time of day the run becomes due.
        #[serde(default = "default_run_time")]
        run_time: NaiveTime,
    },
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig::MonthStart {
            run_time: default_run_time(),
        }
    }
}

impl ScheduleConfig {
    /// Builds the runtime schedule.
    pub fn to_schedule(&self) -> PayrollSchedule {
        match self {
            ScheduleConfig::MonthStart { run_time } => PayrollSchedule::MonthStart {
                run_time: *run_time,
            },
            ScheduleConfig::SalaryCycle { run_time } => PayrollSchedule::SalaryCycle {
                run_time: *run_time,
            },
        }
    }
}

/// Payroll run settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PayrollConfig {
    /// The payroll calendar.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Seconds between schedule checks. Zero is rejected when parsing.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: NonZeroU64,
    /// Immediate delivery attempts per teacher. Zero is rejected when parsing.
    #[serde(default = "default_max_delivery_attempts")]
    pub max_delivery_attempts: NonZeroU32,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            poll_interval_secs: default_poll_interval_secs(),
            max_delivery_attempts: default_max_delivery_attempts(),
        }
    }
}

impl PayrollConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.get())
    }
}

/// Outgoing message settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationConfig {
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Subject line of pay slips.
    #[serde(default = "default_pay_statement_subject")]
    pub pay_statement_subject: String,
    /// Subject line of promotion and demotion notices.
    #[serde(default = "default_level_change_subject")]
    pub level_change_subject: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            from_email: default_from_email(),
            pay_statement_subject: default_pay_statement_subject(),
            level_change_subject: default_level_change_subject(),
        }
    }
}

impl ServiceConfig {
    /// Settings for the payroll job.
    pub fn job_settings(&self) -> PayrollJobSettings {
        PayrollJobSettings {
            auto_close_time: self.attendance.auto_close_time,
            max_delivery_attempts: self.payroll.max_delivery_attempts,
            pay_statement_subject: self.notification.pay_statement_subject.clone(),
        }
    }
}

/// A level to create at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LevelSeed {
    /// Level name.
    pub name: String,
    /// Hourly pay grade.
    pub pay_grade: Decimal,
}

/// Levels configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LevelsConfig {
    /// Levels in the order they should be created.
    #[serde(default)]
    pub levels: Vec<LevelSeed>,
}

/// Salary cycles configuration file structure.
///
/// ```yaml
/// batches:
///   - start_date: 2026-01-01
///     days_in_cycle: 14
///     number_of_cycles: 26
///     average_work_hours: 8
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SalaryCyclesConfig {
    /// Batches of cycles to create at startup.
    #[serde(default)]
    pub batches: Vec<SalaryCycleBatch>,
}
