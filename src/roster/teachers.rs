//! Teacher onboarding and lookup.

use chrono::NaiveDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{LevelChange, NewTeacher, Teacher};
use crate::store::TeacherRepository;

/// Validates and stores a new teacher.
///
/// # Errors
///
/// - [`EngineError::InvalidTeacher`] for malformed fields.
/// - [`EngineError::LevelNotFound`] when the level is missing or deleted.
/// - [`EngineError::DuplicateEmail`] / [`EngineError::DuplicateAccountNumber`]
///   when another active teacher already uses them.
pub fn onboard_teacher<R>(
    repository: &R,
    new_teacher: NewTeacher,
    now: NaiveDateTime,
) -> EngineResult<Teacher>
where
    R: TeacherRepository + ?Sized,
{
    let teacher = repository.insert_teacher(new_teacher.into_teacher(now)?)?;
    info!(
        teacher_id = %teacher.id,
        level_id = %teacher.level_id,
        "Teacher onboarded"
    );
    Ok(teacher)
}

/// The active teacher with `id`.
pub fn get_teacher<R>(repository: &R, id: Uuid) -> EngineResult<Teacher>
where
    R: TeacherRepository + ?Sized,
{
    repository
        .teacher(id)?
        .ok_or_else(|| EngineError::TeacherNotFound { id: id.to_string() })
}

/// Every active teacher.
pub fn list_teachers<R>(repository: &R) -> EngineResult<Vec<Teacher>>
where
    R: TeacherRepository + ?Sized,
{
    repository.teachers()
}

/// The active teacher with `email`.
pub fn find_teacher_by_email<R>(repository: &R, email: &str) -> EngineResult<Teacher>
where
    R: TeacherRepository + ?Sized,
{
    repository
        .teacher_by_email(email)?
        .ok_or_else(|| EngineError::TeacherNotFound {
            id: email.to_string(),
        })
}

/// Soft-deletes a teacher; they drop out of every query and of payroll.
pub fn soft_delete_teacher<R>(repository: &R, id: Uuid, now: NaiveDateTime) -> EngineResult<Teacher>
where
    R: TeacherRepository + ?Sized,
{
    let teacher = repository.soft_delete_teacher(id, now)?;
    info!(teacher_id = %id, "Teacher deleted");
    Ok(teacher)
}

/// A teacher's promotions and demotions, oldest first.
pub fn level_history<R>(repository: &R, teacher_id: Uuid) -> EngineResult<Vec<LevelChange>>
where
    R: TeacherRepository + ?Sized,
{
    get_teacher(repository, teacher_id)?;
    repository.level_history(teacher_id)
}
