//! Persistence seams for the payroll service.
//!
//! Each concern gets its own trait so callers can depend on just what they
//! use. Every mutation that must check existing state first (duplicate
//! attendance, unique emails, levels in use) is performed by the store in one
//! step, so implementations can hold a single lock across the check and the
//! write.

mod memory;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, Level, LevelChange, LevelUpdate, PayPolicy, PayWindow,
    QualifyingAttendance, SalaryCycle, SalaryCycleUpdate, Teacher,
};

pub use memory::MemoryStore;

/// Records left after sweeping a window's open attendance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenAttendanceSweep {
    /// Records that were closed by the sweep.
    pub closed: Vec<AttendanceRecord>,
    /// Records that are still open and will be excluded from payroll.
    pub still_open: Vec<AttendanceRecord>,
}

/// The per-teacher, per-day attendance ledger.
pub trait AttendanceLedger: Send + Sync {
    /// Inserts a new record.
    ///
    /// Fails with `DuplicateAttendance` when an active record already exists
    /// for the same teacher and date.
    fn insert_attendance(&self, record: AttendanceRecord) -> EngineResult<AttendanceRecord>;

    /// Applies `change` to the active record for `teacher_id` on `date`.
    ///
    /// Fails with `AttendanceNotFound` when no such record exists. The change
    /// is only persisted when it returns `Ok`.
    fn modify_attendance(
        &self,
        teacher_id: Uuid,
        date: NaiveDate,
        change: &mut dyn FnMut(&mut AttendanceRecord) -> EngineResult<()>,
    ) -> EngineResult<AttendanceRecord>;

    /// The active record for `teacher_id` on `date`, if any.
    fn attendance_on(&self, teacher_id: Uuid, date: NaiveDate)
    -> EngineResult<Option<AttendanceRecord>>;

    /// Closed attendance within `window` for active teachers, joined with the
    /// teacher's details and current pay grade. Read as one consistent snapshot.
    fn find_qualifying_attendance(
        &self,
        window: &PayWindow,
    ) -> EngineResult<Vec<QualifyingAttendance>>;

    /// Closes open records in `window` at the instant `close_at` returns.
    ///
    /// Records for which `close_at` returns `None` are left open.
    fn close_open_attendance(
        &self,
        window: &PayWindow,
        close_at: &dyn Fn(&AttendanceRecord) -> Option<NaiveDateTime>,
    ) -> EngineResult<OpenAttendanceSweep>;
}

/// Storage for the singleton pay policy.
pub trait PolicyStore: Send + Sync {
    /// The current policy, if one has been set.
    fn active_policy(&self) -> EngineResult<Option<PayPolicy>>;

    /// Sets the policy for the first time. Fails with `PolicyAlreadySet` after that.
    fn initialize_policy(&self, policy: PayPolicy) -> EngineResult<PayPolicy>;

    /// Replaces the policy. Fails with `ConfigurationMissing` when none is set.
    fn update_policy(&self, policy: PayPolicy) -> EngineResult<PayPolicy>;
}

/// Storage for pay levels.
pub trait LevelRepository: Send + Sync {
    /// Inserts a new level.
    fn insert_level(&self, level: Level) -> EngineResult<Level>;

    /// The active level with `id`, if any.
    fn level(&self, id: Uuid) -> EngineResult<Option<Level>>;

    /// Every active level, ordered by pay grade then name.
    fn levels(&self) -> EngineResult<Vec<Level>>;

    /// Applies a partial update. Fails with `LevelNotFound` when absent.
    fn update_level(&self, id: Uuid, update: LevelUpdate) -> EngineResult<Level>;

    /// Soft-deletes a level. Fails with `LevelInUse` while active teachers
    /// reference it.
    fn delete_level(&self, id: Uuid) -> EngineResult<Level>;
}

/// Storage for teachers and their level history.
pub trait TeacherRepository: Send + Sync {
    /// Inserts a new teacher after checking the level exists and the email and
    /// account number are unused by any active teacher.
    fn insert_teacher(&self, teacher: Teacher) -> EngineResult<Teacher>;

    /// The active teacher with `id`, if any.
    fn teacher(&self, id: Uuid) -> EngineResult<Option<Teacher>>;

    /// The active teacher with `email` (case-insensitive), if any.
    fn teacher_by_email(&self, email: &str) -> EngineResult<Option<Teacher>>;

    /// Every active teacher, ordered by last then first name.
    fn teachers(&self) -> EngineResult<Vec<Teacher>>;

    /// Marks a teacher deleted. Fails with `TeacherNotFound` when absent.
    fn soft_delete_teacher(&self, id: Uuid, now: NaiveDateTime) -> EngineResult<Teacher>;

    /// Moves a teacher to `change.new_level_id` and appends `change` to their
    /// history, as one step.
    fn record_level_change(&self, change: LevelChange) -> EngineResult<Teacher>;

    /// A teacher's level history, oldest first.
    fn level_history(&self, teacher_id: Uuid) -> EngineResult<Vec<LevelChange>>;
}

/// Storage for salary cycles.
pub trait SalaryCycleRepository: Send + Sync {
    /// Inserts a batch of cycles as one step.
    ///
    /// Fails with `DuplicateSalaryCycle`, inserting nothing, when any cycle
    /// starts on the same day as an active cycle or another cycle in the batch.
    fn insert_salary_cycles(&self, cycles: Vec<SalaryCycle>) -> EngineResult<Vec<SalaryCycle>>;

    /// The active cycle with `id`, if any.
    fn salary_cycle(&self, id: Uuid) -> EngineResult<Option<SalaryCycle>>;

    /// Every active cycle, ordered by start date.
    fn salary_cycles(&self) -> EngineResult<Vec<SalaryCycle>>;

    /// Applies a partial update. Fails with `SalaryCycleNotFound` when absent
    /// and `DuplicateSalaryCycle` when the new start date is taken.
    fn update_salary_cycle(&self, id: Uuid, update: SalaryCycleUpdate)
    -> EngineResult<SalaryCycle>;

    /// Soft-deletes a cycle. Fails with `SalaryCycleNotFound` when absent.
    fn delete_salary_cycle(&self, id: Uuid) -> EngineResult<SalaryCycle>;
}

/// Outcome of [`DispatchLog::claim_dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchClaim {
    /// The caller now owns delivery for this teacher and window.
    Claimed,
    /// Another run is delivering this statement right now.
    InFlight,
    /// The statement was already delivered.
    Delivered,
}

/// Remembers which pay statements have been delivered for which window.
///
/// Delivery is claimed before sending, so two runs for the same window never
/// both send a teacher's statement.
pub trait DispatchLog: Send + Sync {
    /// Whether `teacher_id` has already received their statement for `window`.
    fn is_dispatched(&self, window: &PayWindow, teacher_id: Uuid) -> EngineResult<bool>;

    /// Claims delivery of `teacher_id`'s statement for `window`.
    ///
    /// Only one caller gets [`DispatchClaim::Claimed`] until the claim is
    /// confirmed or released.
    fn claim_dispatch(&self, window: &PayWindow, teacher_id: Uuid) -> EngineResult<DispatchClaim>;

    /// Turns a claim into a recorded delivery.
    fn confirm_dispatch(
        &self,
        window: &PayWindow,
        teacher_id: Uuid,
        at: DateTime<Utc>,
    ) -> EngineResult<()>;

    /// Drops a claim after a failed delivery so a later run can retry.
    fn release_dispatch(&self, window: &PayWindow, teacher_id: Uuid) -> EngineResult<()>;

    /// Whether every statement for `window` has been delivered.
    fn is_window_complete(&self, window: &PayWindow) -> EngineResult<bool>;

    /// Marks `window` as fully delivered.
    fn mark_window_complete(&self, window: &PayWindow) -> EngineResult<()>;
}

/// Everything the service needs from storage.
pub trait PayrollStore:
    AttendanceLedger
    + PolicyStore
    + LevelRepository
    + TeacherRepository
    + SalaryCycleRepository
    + DispatchLog
{
}

impl<T> PayrollStore for T where
    T: AttendanceLedger
        + PolicyStore
        + LevelRepository
        + TeacherRepository
        + SalaryCycleRepository
        + DispatchLog
{
}
