//! Promotion and demotion.
//!
//! A level change is a guarded transition: the teacher and the target level
//! must exist and the target must differ from the current level. One history
//! entry is written together with the new level. The teacher is then
//! notified; a failed notification is logged and does not undo the change.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{ChangeDirection, LevelChange, Teacher};
use crate::notification::{Notifier, render_level_change};
use crate::store::{LevelRepository, TeacherRepository};

use super::levels::get_level;
use super::teachers::get_teacher;

/// Target of a promotion or demotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChangeRequest {
    /// The level to move the teacher to.
    pub level_id: Uuid,
    /// Optional free-text reason kept in the history.
    #[serde(default)]
    pub reason: Option<String>,
}

/// The result of a level change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChangeOutcome {
    /// The teacher after the change.
    pub teacher: Teacher,
    /// The history entry that was written.
    pub change: LevelChange,
    /// Whether the notification was delivered.
    pub notified: bool,
}

/// Moves a teacher to a higher level.
pub fn promote<S, N>(
    store: &S,
    notifier: &N,
    subject: &str,
    teacher_id: Uuid,
    request: LevelChangeRequest,
    now: NaiveDateTime,
) -> EngineResult<LevelChangeOutcome>
where
    S: TeacherRepository + LevelRepository + ?Sized,
    N: Notifier + ?Sized,
{
    change_level(
        store,
        notifier,
        subject,
        teacher_id,
        ChangeDirection::Promotion,
        request,
        now,
    )
}

/// Moves a teacher to a lower level.
pub fn demote<S, N>(
    store: &S,
    notifier: &N,
    subject: &str,
    teacher_id: Uuid,
    request: LevelChangeRequest,
    now: NaiveDateTime,
) -> EngineResult<LevelChangeOutcome>
where
    S: TeacherRepository + LevelRepository + ?Sized,
    N: Notifier + ?Sized,
{
    change_level(
        store,
        notifier,
        subject,
        teacher_id,
        ChangeDirection::Demotion,
        request,
        now,
    )
}

fn change_level<S, N>(
    store: &S,
    notifier: &N,
    subject: &str,
    teacher_id: Uuid,
    direction: ChangeDirection,
    request: LevelChangeRequest,
    now: NaiveDateTime,
) -> EngineResult<LevelChangeOutcome>
where
    S: TeacherRepository + LevelRepository + ?Sized,
    N: Notifier + ?Sized,
{
    let teacher = get_teacher(store, teacher_id)?;
    let level = get_level(store, request.level_id)?;
    if teacher.level_id == level.id {
        return Err(EngineError::AlreadyAtLevel { level: level.name });
    }

    let change = LevelChange {
        id: Uuid::new_v4(),
        teacher_id,
        old_level_id: teacher.level_id,
        new_level_id: level.id,
        direction,
        reason: request.reason.filter(|r| !r.trim().is_empty()),
        changed_at: now,
    };
    let teacher = store.record_level_change(change.clone())?;

    info!(
        teacher_id = %teacher_id,
        direction = direction.as_str(),
        old_level_id = %change.old_level_id,
        new_level_id = %change.new_level_id,
        "Level changed"
    );

    let body = render_level_change(&teacher, &level, direction);
    let notified = match notifier.send(&teacher.email, subject, &body) {
        Ok(()) => true,
        Err(err) => {
            warn!(
                teacher_id = %teacher_id,
                error = %err,
                "Level change notification failed"
            );
            false
        }
    };

    Ok(LevelChangeOutcome {
        teacher,
        change,
        notified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, NewTeacher};
    use crate::notification::RecordingNotifier;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-03-02 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn setup() -> (MemoryStore, Level, Level, Teacher) {
        let store = MemoryStore::new();
        let graduate = store.insert_level(Level::new("Graduate", Decimal::from(10)).unwrap()).unwrap();
        let senior = store.insert_level(Level::new("Senior", Decimal::from(15)).unwrap()).unwrap();
        let teacher = store
            .insert_teacher(
                NewTeacher {
                    first_name: "Ada".to_string(),
                    last_name: "Obi".to_string(),
                    email: "ada@school.org".to_string(),
                    level_id: graduate.id,
                    account_number: None,
                    account_name: String::new(),
                    bank: String::new(),
                }
                .into_teacher(now())
                .unwrap(),
            )
            .unwrap();
        (store, graduate, senior, teacher)
    }

    fn to(level: &Level) -> LevelChangeRequest {
        LevelChangeRequest {
            level_id: level.id,
            reason: None,
        }
    }

    #[test]
    fn test_promotion_to_current_level_rejected() {
        let (store, graduate, _, teacher) = setup();
        let notifier = RecordingNotifier::new();

        let result = promote(&store, &notifier, "Level change", teacher.id, to(&graduate), now());
        assert!(matches!(result, Err(EngineError::AlreadyAtLevel { .. })));
        assert!(store.level_history(teacher.id).unwrap().is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn test_promotion_updates_level_and_history() {
        let (store, graduate, senior, teacher) = setup();
        let notifier = RecordingNotifier::new();

        let outcome = promote(&store, &notifier, "Level change", teacher.id, to(&senior), now()).unwrap();
        assert_eq!(outcome.teacher.level_id, senior.id);
        assert_eq!(outcome.teacher.last_level_change, Some(ChangeDirection::Promotion));
        assert_eq!(outcome.change.old_level_id, graduate.id);
        assert!(outcome.notified);

        let history = store.level_history(teacher.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].direction, ChangeDirection::Promotion);

        let sent = notifier.sent_to("ada@school.org");
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("promoted to Senior"));
    }

    #[test]
    fn test_demotion_marks_direction() {
        let (store, graduate, senior, teacher) = setup();
        let notifier = RecordingNotifier::new();
        promote(&store, &notifier, "Level change", teacher.id, to(&senior), now()).unwrap();

        let outcome = demote(&store, &notifier, "Level change", teacher.id, to(&graduate), now()).unwrap();
        assert_eq!(outcome.teacher.level_id, graduate.id);
        assert_eq!(outcome.teacher.last_level_change, Some(ChangeDirection::Demotion));
        assert_eq!(store.level_history(teacher.id).unwrap().len(), 2);
    }

    #[test]
    fn test_notification_failure_does_not_roll_back() {
        let (store, _, senior, teacher) = setup();
        let notifier = RecordingNotifier::new();
        notifier.fail_always("ada@school.org");

        let outcome = promote(&store, &notifier, "Level change", teacher.id, to(&senior), now()).unwrap();
        assert!(!outcome.notified);
        assert_eq!(store.teacher(teacher.id).unwrap().unwrap().level_id, senior.id);
        assert_eq!(store.level_history(teacher.id).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_teacher_and_level() {
        let (store, _, senior, teacher) = setup();
        let notifier = RecordingNotifier::new();

        let result = promote(&store, &notifier, "s", Uuid::new_v4(), to(&senior), now());
        assert!(matches!(result, Err(EngineError::TeacherNotFound { .. })));

        let result = promote(
            &store,
            &notifier,
            "s",
            teacher.id,
            LevelChangeRequest {
                level_id: Uuid::new_v4(),
                reason: None,
            },
            now(),
        );
        assert!(matches!(result, Err(EngineError::LevelNotFound { .. })));
    }
}
