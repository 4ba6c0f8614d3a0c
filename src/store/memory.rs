//! In-memory store.
//!
//! All tables live behind one `RwLock`, so a check and the write that depends
//! on it always happen under the same guard, and payroll reads see a single
//! consistent snapshot of attendance, teachers and levels.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, Level, LevelChange, LevelUpdate, PayPolicy, PayWindow,
    QualifyingAttendance, RecordStatus, SalaryCycle, SalaryCycleUpdate, Teacher,
};

use super::{
    AttendanceLedger, DispatchClaim, DispatchLog, LevelRepository, OpenAttendanceSweep,
    PolicyStore, SalaryCycleRepository, TeacherRepository,
};

#[derive(Debug, Clone, Copy)]
enum Delivery {
    Pending,
    Delivered(DateTime<Utc>),
}

#[derive(Debug, Default)]
struct Tables {
    attendance: Vec<AttendanceRecord>,
    policy: Option<PayPolicy>,
    levels: HashMap<Uuid, Level>,
    teachers: HashMap<Uuid, Teacher>,
    level_changes: Vec<LevelChange>,
    salary_cycles: HashMap<Uuid, SalaryCycle>,
    dispatched: HashMap<PayWindow, HashMap<Uuid, Delivery>>,
    completed_windows: HashSet<PayWindow>,
}

impl Tables {
    fn active_attendance_mut(
        &mut self,
        teacher_id: Uuid,
        date: NaiveDate,
    ) -> Option<&mut AttendanceRecord> {
        self.attendance
            .iter_mut()
            .find(|r| r.status.is_active() && r.teacher_id == teacher_id && r.date == date)
    }

    fn active_teacher(&self, id: Uuid) -> Option<&Teacher> {
        self.teachers.get(&id).filter(|t| t.is_active())
    }

    fn active_level(&self, id: Uuid) -> Option<&Level> {
        self.levels.get(&id).filter(|l| l.status.is_active())
    }

    fn cycle_start_taken(&self, start_date: NaiveDate, except: Option<Uuid>) -> bool {
        self.salary_cycles.values().any(|c| {
            c.status.is_active() && c.start_date == start_date && Some(c.id) != except
        })
    }
}

/// A [`PayrollStore`](super::PayrollStore) kept entirely in process memory.
///
/// # Example
///
/// ```
/// use teacher_payroll::store::{MemoryStore, PolicyStore};
/// use teacher_payroll::models::PayPolicy;
/// use rust_decimal::Decimal;
///
/// let store = MemoryStore::new();
/// assert!(store.active_policy().unwrap().is_none());
///
/// let policy = PayPolicy::new(Decimal::from(8), Decimal::from(50)).unwrap();
/// store.initialize_policy(policy.clone()).unwrap();
/// assert_eq!(store.active_policy().unwrap(), Some(policy));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|e| EngineError::StoreUnavailable {
            message: e.to_string(),
        })
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|e| EngineError::StoreUnavailable {
            message: e.to_string(),
        })
    }
}

impl AttendanceLedger for MemoryStore {
    fn insert_attendance(&self, record: AttendanceRecord) -> EngineResult<AttendanceRecord> {
        let mut tables = self.write()?;
        if tables
            .active_attendance_mut(record.teacher_id, record.date)
            .is_some()
        {
            return Err(EngineError::DuplicateAttendance {
                teacher_id: record.teacher_id.to_string(),
                date: record.date,
            });
        }
        tables.attendance.push(record.clone());
        Ok(record)
    }

    fn modify_attendance(
        &self,
        teacher_id: Uuid,
        date: NaiveDate,
        change: &mut dyn FnMut(&mut AttendanceRecord) -> EngineResult<()>,
    ) -> EngineResult<AttendanceRecord> {
        let mut tables = self.write()?;
        let record = tables.active_attendance_mut(teacher_id, date).ok_or_else(|| {
            EngineError::AttendanceNotFound {
                teacher_id: teacher_id.to_string(),
                date,
            }
        })?;
        let mut updated = record.clone();
        change(&mut updated)?;
        *record = updated.clone();
        Ok(updated)
    }

    fn attendance_on(
        &self,
        teacher_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>> {
        let tables = self.read()?;
        Ok(tables
            .attendance
            .iter()
            .find(|r| r.status.is_active() && r.teacher_id == teacher_id && r.date == date)
            .cloned())
    }

    fn find_qualifying_attendance(
        &self,
        window: &PayWindow,
    ) -> EngineResult<Vec<QualifyingAttendance>> {
        let tables = self.read()?;
        let mut rows = Vec::new();

        for record in &tables.attendance {
            if !record.status.is_active() || !window.contains_date(record.date) {
                continue;
            }
            let Some(clock_out) = record.clock_out else {
                continue;
            };
            let Some(teacher) = tables.active_teacher(record.teacher_id) else {
                continue;
            };
            let level =
                tables
                    .levels
                    .get(&teacher.level_id)
                    .ok_or_else(|| EngineError::LevelNotFound {
                        id: teacher.level_id.to_string(),
                    })?;

            rows.push(QualifyingAttendance {
                record_id: record.id,
                teacher_id: teacher.id,
                teacher_name: teacher.full_name(),
                email: teacher.email.clone(),
                account_number: teacher.account_number.clone(),
                pay_grade: level.pay_grade,
                date: record.date,
                clock_in: record.clock_in,
                clock_out,
            });
        }

        debug!(window = %window, rows = rows.len(), "Read qualifying attendance");
        Ok(rows)
    }

    fn close_open_attendance(
        &self,
        window: &PayWindow,
        close_at: &dyn Fn(&AttendanceRecord) -> Option<NaiveDateTime>,
    ) -> EngineResult<OpenAttendanceSweep> {
        let mut tables = self.write()?;
        let mut sweep = OpenAttendanceSweep::default();

        for record in tables.attendance.iter_mut() {
            if !record.status.is_active()
                || record.is_closed()
                || !window.contains_date(record.date)
            {
                continue;
            }
            match close_at(record) {
                Some(instant) => {
                    record.clock_out = Some(instant);
                    sweep.closed.push(record.clone());
                }
                None => sweep.still_open.push(record.clone()),
            }
        }

        Ok(sweep)
    }
}

impl PolicyStore for MemoryStore {
    fn active_policy(&self) -> EngineResult<Option<PayPolicy>> {
        Ok(self.read()?.policy.clone())
    }

    fn initialize_policy(&self, policy: PayPolicy) -> EngineResult<PayPolicy> {
        policy.validate()?;
        let mut tables = self.write()?;
        if tables.policy.is_some() {
            return Err(EngineError::PolicyAlreadySet);
        }
        tables.policy = Some(policy.clone());
        Ok(policy)
    }

    fn update_policy(&self, policy: PayPolicy) -> EngineResult<PayPolicy> {
        policy.validate()?;
        let mut tables = self.write()?;
        match tables.policy.as_mut() {
            Some(current) => {
                *current = policy.clone();
                Ok(policy)
            }
            None => Err(EngineError::ConfigurationMissing),
        }
    }
}

impl LevelRepository for MemoryStore {
    fn insert_level(&self, level: Level) -> EngineResult<Level> {
        let mut tables = self.write()?;
        tables.levels.insert(level.id, level.clone());
        Ok(level)
    }

    fn level(&self, id: Uuid) -> EngineResult<Option<Level>> {
        Ok(self.read()?.active_level(id).cloned())
    }

    fn levels(&self) -> EngineResult<Vec<Level>> {
        let tables = self.read()?;
        let mut levels: Vec<Level> = tables
            .levels
            .values()
            .filter(|l| l.status.is_active())
            .cloned()
            .collect();
        levels.sort_by(|a, b| a.pay_grade.cmp(&b.pay_grade).then_with(|| a.name.cmp(&b.name)));
        Ok(levels)
    }

    fn update_level(&self, id: Uuid, update: LevelUpdate) -> EngineResult<Level> {
        let mut tables = self.write()?;
        let level = tables
            .levels
            .get_mut(&id)
            .filter(|l| l.status.is_active())
            .ok_or_else(|| EngineError::LevelNotFound { id: id.to_string() })?;
        level.apply(update)?;
        Ok(level.clone())
    }

    fn delete_level(&self, id: Uuid) -> EngineResult<Level> {
        let mut tables = self.write()?;
        if tables.active_level(id).is_none() {
            return Err(EngineError::LevelNotFound { id: id.to_string() });
        }
        let teacher_count = tables
            .teachers
            .values()
            .filter(|t| t.is_active() && t.level_id == id)
            .count();
        if teacher_count > 0 {
            return Err(EngineError::LevelInUse {
                level_id: id.to_string(),
                teacher_count,
            });
        }
        let level = tables
            .levels
            .get_mut(&id)
            .ok_or_else(|| EngineError::LevelNotFound { id: id.to_string() })?;
        level.status = RecordStatus::Deleted;
        Ok(level.clone())
    }
}

impl TeacherRepository for MemoryStore {
    fn insert_teacher(&self, teacher: Teacher) -> EngineResult<Teacher> {
        let mut tables = self.write()?;
        if tables.active_level(teacher.level_id).is_none() {
            return Err(EngineError::LevelNotFound {
                id: teacher.level_id.to_string(),
            });
        }
        let active = || tables.teachers.values().filter(|t| t.is_active());
        if active().any(|t| t.email == teacher.email) {
            return Err(EngineError::DuplicateEmail {
                email: teacher.email.clone(),
            });
        }
        if let Some(account_number) = &teacher.account_number {
            if active().any(|t| t.account_number.as_ref() == Some(account_number)) {
                return Err(EngineError::DuplicateAccountNumber {
                    account_number: account_number.clone(),
                });
            }
        }
        tables.teachers.insert(teacher.id, teacher.clone());
        Ok(teacher)
    }

    fn teacher(&self, id: Uuid) -> EngineResult<Option<Teacher>> {
        Ok(self.read()?.active_teacher(id).cloned())
    }

    fn teacher_by_email(&self, email: &str) -> EngineResult<Option<Teacher>> {
        let email = email.trim().to_lowercase();
        let tables = self.read()?;
        Ok(tables
            .teachers
            .values()
            .find(|t| t.is_active() && t.email == email)
            .cloned())
    }

    fn teachers(&self) -> EngineResult<Vec<Teacher>> {
        let tables = self.read()?;
        let mut teachers: Vec<Teacher> = tables
            .teachers
            .values()
            .filter(|t| t.is_active())
            .cloned()
            .collect();
        teachers.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(teachers)
    }

    fn soft_delete_teacher(&self, id: Uuid, now: NaiveDateTime) -> EngineResult<Teacher> {
        let mut tables = self.write()?;
        let teacher = tables
            .teachers
            .get_mut(&id)
            .filter(|t| t.is_active())
            .ok_or_else(|| EngineError::TeacherNotFound { id: id.to_string() })?;
        teacher.status = RecordStatus::Deleted;
        teacher.updated_at = now;
        Ok(teacher.clone())
    }

    fn record_level_change(&self, change: LevelChange) -> EngineResult<Teacher> {
        let mut tables = self.write()?;
        let level_name = tables
            .active_level(change.new_level_id)
            .map(|l| l.name.clone())
            .ok_or_else(|| EngineError::LevelNotFound {
                id: change.new_level_id.to_string(),
            })?;
        let teacher = tables
            .teachers
            .get_mut(&change.teacher_id)
            .filter(|t| t.is_active())
            .ok_or_else(|| EngineError::TeacherNotFound {
                id: change.teacher_id.to_string(),
            })?;
        if teacher.level_id == change.new_level_id {
            return Err(EngineError::AlreadyAtLevel { level: level_name });
        }

        teacher.level_id = change.new_level_id;
        teacher.last_level_change = Some(change.direction);
        teacher.updated_at = change.changed_at;
        let updated = teacher.clone();
        tables.level_changes.push(change);
        Ok(updated)
    }

    fn level_history(&self, teacher_id: Uuid) -> EngineResult<Vec<LevelChange>> {
        let tables = self.read()?;
        let mut history: Vec<LevelChange> = tables
            .level_changes
            .iter()
            .filter(|c| c.teacher_id == teacher_id)
            .cloned()
            .collect();
        history.sort_by_key(|c| c.changed_at);
        Ok(history)
    }
}

impl SalaryCycleRepository for MemoryStore {
    fn insert_salary_cycles(&self, cycles: Vec<SalaryCycle>) -> EngineResult<Vec<SalaryCycle>> {
        let mut tables = self.write()?;
        let mut starts = HashSet::new();
        for cycle in &cycles {
            if !starts.insert(cycle.start_date) || tables.cycle_start_taken(cycle.start_date, None) {
                return Err(EngineError::DuplicateSalaryCycle {
                    start_date: cycle.start_date,
                });
            }
        }
        for cycle in &cycles {
            tables.salary_cycles.insert(cycle.id, cycle.clone());
        }
        debug!(count = cycles.len(), "Inserted salary cycles");
        Ok(cycles)
    }

    fn salary_cycle(&self, id: Uuid) -> EngineResult<Option<SalaryCycle>> {
        Ok(self
            .read()?
            .salary_cycles
            .get(&id)
            .filter(|c| c.status.is_active())
            .cloned())
    }

    fn salary_cycles(&self) -> EngineResult<Vec<SalaryCycle>> {
        let tables = self.read()?;
        let mut cycles: Vec<SalaryCycle> = tables
            .salary_cycles
            .values()
            .filter(|c| c.status.is_active())
            .cloned()
            .collect();
        cycles.sort_by_key(|c| (c.start_date, c.id));
        Ok(cycles)
    }

    fn update_salary_cycle(
        &self,
        id: Uuid,
        update: SalaryCycleUpdate,
    ) -> EngineResult<SalaryCycle> {
        let mut tables = self.write()?;
        if let Some(start_date) = update.start_date {
            if tables.cycle_start_taken(start_date, Some(id)) {
                return Err(EngineError::DuplicateSalaryCycle { start_date });
            }
        }
        let cycle = tables
            .salary_cycles
            .get_mut(&id)
            .filter(|c| c.status.is_active())
            .ok_or_else(|| EngineError::SalaryCycleNotFound { id: id.to_string() })?;
        cycle.apply(&update)?;
        Ok(cycle.clone())
    }

    fn delete_salary_cycle(&self, id: Uuid) -> EngineResult<SalaryCycle> {
        let mut tables = self.write()?;
        let cycle = tables
            .salary_cycles
            .get_mut(&id)
            .filter(|c| c.status.is_active())
            .ok_or_else(|| EngineError::SalaryCycleNotFound { id: id.to_string() })?;
        cycle.status = RecordStatus::Deleted;
        Ok(cycle.clone())
    }
}

impl DispatchLog for MemoryStore {
    fn is_dispatched(&self, window: &PayWindow, teacher_id: Uuid) -> EngineResult<bool> {
        Ok(self
            .read()?
            .dispatched
            .get(window)
            .and_then(|sent| sent.get(&teacher_id))
            .is_some_and(|delivery| matches!(delivery, Delivery::Delivered(_))))
    }

    fn claim_dispatch(&self, window: &PayWindow, teacher_id: Uuid) -> EngineResult<DispatchClaim> {
        let mut tables = self.write()?;
        let sent = tables.dispatched.entry(*window).or_default();
        Ok(match sent.get(&teacher_id) {
            Some(Delivery::Delivered(_)) => DispatchClaim::Delivered,
            Some(Delivery::Pending) => DispatchClaim::InFlight,
            None => {
                sent.insert(teacher_id, Delivery::Pending);
                DispatchClaim::Claimed
            }
        })
    }

    fn confirm_dispatch(
        &self,
        window: &PayWindow,
        teacher_id: Uuid,
        at: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.write()?
            .dispatched
            .entry(*window)
            .or_default()
            .insert(teacher_id, Delivery::Delivered(at));
        Ok(())
    }

    fn release_dispatch(&self, window: &PayWindow, teacher_id: Uuid) -> EngineResult<()> {
        let mut tables = self.write()?;
        if let Some(sent) = tables.dispatched.get_mut(window) {
            if matches!(sent.get(&teacher_id), Some(Delivery::Pending)) {
                sent.remove(&teacher_id);
            }
        }
        Ok(())
    }

    fn is_window_complete(&self, window: &PayWindow) -> EngineResult<bool> {
        Ok(self.read()?.completed_windows.contains(window))
    }

    fn mark_window_complete(&self, window: &PayWindow) -> EngineResult<()> {
        self.write()?.completed_windows.insert(*window);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeDirection, NewTeacher, SalaryCycleBatch};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn march() -> PayWindow {
        PayWindow::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn seeded() -> (MemoryStore, Level, Teacher) {
        let store = MemoryStore::new();
        let level = store.insert_level(Level::new("Graduate", dec("10")).unwrap()).unwrap();
        let teacher = NewTeacher {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: "ada@school.org".to_string(),
            level_id: level.id,
            account_number: Some("0123456789".to_string()),
            account_name: "Ada Obi".to_string(),
            bank: "First Bank".to_string(),
        }
        .into_teacher(make_datetime("2026-03-01", "09:00:00"))
        .unwrap();
        let teacher = store.insert_teacher(teacher).unwrap();
        (store, level, teacher)
    }

    fn closed_record(teacher_id: Uuid, date: &str, start: &str, end: &str) -> AttendanceRecord {
        let mut record = AttendanceRecord::open(teacher_id, make_datetime(date, start));
        record.clock_out = Some(make_datetime(date, end));
        record
    }

    #[test]
    fn test_duplicate_attendance_rejected() {
        let (store, _, teacher) = seeded();
        let now = make_datetime("2026-03-02", "08:00:00");
        store
            .insert_attendance(AttendanceRecord::open(teacher.id, now))
            .unwrap();
        let result = store.insert_attendance(AttendanceRecord::open(teacher.id, now));
        assert!(matches!(result, Err(EngineError::DuplicateAttendance { .. })));
    }

    #[test]
    fn test_failed_modification_not_persisted() {
        let (store, _, teacher) = seeded();
        let now = make_datetime("2026-03-02", "08:00:00");
        store
            .insert_attendance(AttendanceRecord::open(teacher.id, now))
            .unwrap();

        let result = store.modify_attendance(teacher.id, now.date(), &mut |record: &mut AttendanceRecord| {
            record.clock_out = Some(make_datetime("2026-03-02", "09:00:00"));
            Err(EngineError::InvalidAttendance {
                record_id: record.id.to_string(),
                message: "rejected".to_string(),
            })
        });
        assert!(result.is_err());
        let stored = store.attendance_on(teacher.id, now.date()).unwrap().unwrap();
        assert!(stored.clock_out.is_none());
    }

    #[test]
    fn test_qualifying_attendance_joins_teacher_and_grade() {
        let (store, _, teacher) = seeded();
        store
            .insert_attendance(closed_record(teacher.id, "2026-03-02", "08:00:00", "16:00:00"))
            .unwrap();
        store
            .insert_attendance(AttendanceRecord::open(
                teacher.id,
                make_datetime("2026-03-03", "08:00:00"),
            ))
            .unwrap();
        store
            .insert_attendance(closed_record(teacher.id, "2026-04-01", "08:00:00", "16:00:00"))
            .unwrap();

        let rows = store.find_qualifying_attendance(&march()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].teacher_name, "Ada Obi");
        assert_eq!(rows[0].pay_grade, dec("10"));
        assert_eq!(rows[0].account_number.as_deref(), Some("0123456789"));
    }

    #[test]
    fn test_deleted_teacher_excluded_from_payroll() {
        let (store, _, teacher) = seeded();
        store
            .insert_attendance(closed_record(teacher.id, "2026-03-02", "08:00:00", "16:00:00"))
            .unwrap();
        store
            .soft_delete_teacher(teacher.id, make_datetime("2026-03-05", "09:00:00"))
            .unwrap();

        assert!(store.find_qualifying_attendance(&march()).unwrap().is_empty());
        assert!(store.teacher(teacher.id).unwrap().is_none());
        assert!(store.teachers().unwrap().is_empty());
    }

    #[test]
    fn test_policy_singleton() {
        let store = MemoryStore::new();
        let policy = PayPolicy::new(dec("8"), dec("50")).unwrap();

        assert!(matches!(
            store.update_policy(policy.clone()),
            Err(EngineError::ConfigurationMissing)
        ));
        store.initialize_policy(policy.clone()).unwrap();
        assert!(matches!(
            store.initialize_policy(policy),
            Err(EngineError::PolicyAlreadySet)
        ));

        let updated = store
            .update_policy(PayPolicy::new(dec("7.5"), dec("25")).unwrap())
            .unwrap();
        assert_eq!(store.active_policy().unwrap(), Some(updated));
    }

    #[test]
    fn test_level_in_use_cannot_be_deleted() {
        let (store, level, teacher) = seeded();
        let result = store.delete_level(level.id);
        assert!(matches!(
            result,
            Err(EngineError::LevelInUse { teacher_count: 1, .. })
        ));

        store
            .soft_delete_teacher(teacher.id, make_datetime("2026-03-05", "09:00:00"))
            .unwrap();
        let deleted = store.delete_level(level.id).unwrap();
        assert_eq!(deleted.status, RecordStatus::Deleted);
        assert!(store.level(level.id).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_and_account_rejected() {
        let (store, level, _) = seeded();
        let now = make_datetime("2026-03-02", "08:00:00");
        let mut payload = NewTeacher {
            first_name: "Ben".to_string(),
            last_name: "Eze".to_string(),
            email: "ADA@school.org".to_string(),
            level_id: level.id,
            account_number: None,
            account_name: String::new(),
            bank: String::new(),
        };
        let result = store.insert_teacher(payload.clone().into_teacher(now).unwrap());
        assert!(matches!(result, Err(EngineError::DuplicateEmail { .. })));

        payload.email = "ben@school.org".to_string();
        payload.account_number = Some("0123456789".to_string());
        let result = store.insert_teacher(payload.into_teacher(now).unwrap());
        assert!(matches!(
            result,
            Err(EngineError::DuplicateAccountNumber { .. })
        ));
    }

    #[test]
    fn test_level_change_updates_teacher_and_history() {
        let (store, level, teacher) = seeded();
        let senior = store.insert_level(Level::new("Senior", dec("15")).unwrap()).unwrap();
        let change = LevelChange {
            id: Uuid::new_v4(),
            teacher_id: teacher.id,
            old_level_id: level.id,
            new_level_id: senior.id,
            direction: ChangeDirection::Promotion,
            reason: None,
            changed_at: make_datetime("2026-03-10", "10:00:00"),
        };

        let updated = store.record_level_change(change.clone()).unwrap();
        assert_eq!(updated.level_id, senior.id);
        assert_eq!(updated.last_level_change, Some(ChangeDirection::Promotion));
        assert_eq!(store.level_history(teacher.id).unwrap(), vec![change.clone()]);

        let again = store.record_level_change(LevelChange {
            id: Uuid::new_v4(),
            ..change
        });
        assert!(matches!(again, Err(EngineError::AlreadyAtLevel { .. })));
        assert_eq!(store.level_history(teacher.id).unwrap().len(), 1);
    }

    #[test]
    fn test_close_open_attendance_respects_callback() {
        let (store, _, teacher) = seeded();
        store
            .insert_attendance(AttendanceRecord::open(
                teacher.id,
                make_datetime("2026-03-02", "08:00:00"),
            ))
            .unwrap();
        store
            .insert_attendance(AttendanceRecord::open(
                teacher.id,
                make_datetime("2026-03-03", "17:00:00"),
            ))
            .unwrap();

        let sweep = store
            .close_open_attendance(&march(), &|record: &AttendanceRecord| {
                let cutoff = record.date.and_hms_opt(16, 0, 0)?;
                (cutoff > record.clock_in).then_some(cutoff)
            })
            .unwrap();
        assert_eq!(sweep.closed.len(), 1);
        assert_eq!(sweep.still_open.len(), 1);
        assert_eq!(
            sweep.closed[0].clock_out,
            Some(make_datetime("2026-03-02", "16:00:00"))
        );
    }

    #[test]
    fn test_dispatch_log_is_per_window() {
        let store = MemoryStore::new();
        let teacher = Uuid::new_v4();
        let april = PayWindow::calendar_month(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());

        assert_eq!(
            store.claim_dispatch(&march(), teacher).unwrap(),
            DispatchClaim::Claimed
        );
        store.confirm_dispatch(&march(), teacher, Utc::now()).unwrap();
        assert!(store.is_dispatched(&march(), teacher).unwrap());
        assert!(!store.is_dispatched(&april, teacher).unwrap());

        assert!(!store.is_window_complete(&march()).unwrap());
        store.mark_window_complete(&march()).unwrap();
        assert!(store.is_window_complete(&march()).unwrap());
    }

    #[test]
    fn test_dispatch_claim_is_exclusive_until_released() {
        let store = MemoryStore::new();
        let teacher = Uuid::new_v4();

        assert_eq!(
            store.claim_dispatch(&march(), teacher).unwrap(),
            DispatchClaim::Claimed
        );
        assert_eq!(
            store.claim_dispatch(&march(), teacher).unwrap(),
            DispatchClaim::InFlight
        );
        assert!(!store.is_dispatched(&march(), teacher).unwrap());

        store.release_dispatch(&march(), teacher).unwrap();
        assert_eq!(
            store.claim_dispatch(&march(), teacher).unwrap(),
            DispatchClaim::Claimed
        );
        store.confirm_dispatch(&march(), teacher, Utc::now()).unwrap();
        store.release_dispatch(&march(), teacher).unwrap();
        assert_eq!(
            store.claim_dispatch(&march(), teacher).unwrap(),
            DispatchClaim::Delivered
        );
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let teacher = Uuid::new_v4();

        let claims: Vec<DispatchClaim> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = Arc::clone(&store);
                    scope.spawn(move || store.claim_dispatch(&march(), teacher).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let claimed = claims.iter().filter(|c| **c == DispatchClaim::Claimed).count();
        assert_eq!(claimed, 1);
        assert_eq!(claims.len() - claimed, 7);
    }

    fn cycles(start: &str, days_in_cycle: u32, number_of_cycles: u32) -> Vec<SalaryCycle> {
        SalaryCycleBatch {
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            days_in_cycle,
            number_of_cycles,
            average_work_hours: 8,
        }
        .generate()
        .unwrap()
    }

    #[test]
    fn test_salary_cycles_sorted_and_soft_deleted() {
        let store = MemoryStore::new();
        store.insert_salary_cycles(cycles("2026-02-01", 14, 1)).unwrap();
        let january = store.insert_salary_cycles(cycles("2026-01-01", 14, 2)).unwrap();

        let listed = store.salary_cycles().unwrap();
        let starts: Vec<String> = listed.iter().map(|c| c.start_date.to_string()).collect();
        assert_eq!(starts, vec!["2026-01-01", "2026-01-15", "2026-02-01"]);

        let deleted = store.delete_salary_cycle(january[0].id).unwrap();
        assert_eq!(deleted.status, RecordStatus::Deleted);
        assert!(store.salary_cycle(january[0].id).unwrap().is_none());
        assert_eq!(store.salary_cycles().unwrap().len(), 2);
        assert!(matches!(
            store.delete_salary_cycle(january[0].id),
            Err(EngineError::SalaryCycleNotFound { .. })
        ));

        // The start date is free again once its cycle is deleted.
        store.insert_salary_cycles(cycles("2026-01-01", 14, 1)).unwrap();
    }

    #[test]
    fn test_duplicate_cycle_start_rejects_whole_batch() {
        let store = MemoryStore::new();
        store.insert_salary_cycles(cycles("2026-01-15", 14, 1)).unwrap();

        let result = store.insert_salary_cycles(cycles("2026-01-01", 14, 3));
        assert!(matches!(
            result,
            Err(EngineError::DuplicateSalaryCycle { .. })
        ));
        assert_eq!(store.salary_cycles().unwrap().len(), 1);
    }

    #[test]
    fn test_update_salary_cycle() {
        let store = MemoryStore::new();
        let inserted = store.insert_salary_cycles(cycles("2026-01-01", 14, 2)).unwrap();

        let taken = store.update_salary_cycle(
            inserted[1].id,
            SalaryCycleUpdate {
                start_date: Some(inserted[0].start_date),
                ..Default::default()
            },
        );
        assert!(matches!(taken, Err(EngineError::DuplicateSalaryCycle { .. })));

        let updated = store
            .update_salary_cycle(
                inserted[1].id,
                SalaryCycleUpdate {
                    average_work_hours: Some(6),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.average_work_hours, 6);
        assert!(matches!(
            store.update_salary_cycle(Uuid::new_v4(), SalaryCycleUpdate::default()),
            Err(EngineError::SalaryCycleNotFound { .. })
        ));
    }
}
