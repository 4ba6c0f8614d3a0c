//! Level (pay grade) management.

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Level, LevelUpdate};
use crate::store::LevelRepository;

/// Creates a level with a positive hourly rate.
pub fn create_level<R>(repository: &R, name: &str, pay_grade: Decimal) -> EngineResult<Level>
where
    R: LevelRepository + ?Sized,
{
    let level = repository.insert_level(Level::new(name, pay_grade)?)?;
    info!(level_id = %level.id, name = %level.name, pay_grade = %level.pay_grade, "Level created");
    Ok(level)
}

/// The active level with `id`.
pub fn get_level<R>(repository: &R, id: Uuid) -> EngineResult<Level>
where
    R: LevelRepository + ?Sized,
{
    repository
        .level(id)?
        .ok_or_else(|| EngineError::LevelNotFound { id: id.to_string() })
}

/// Every active level.
pub fn list_levels<R>(repository: &R) -> EngineResult<Vec<Level>>
where
    R: LevelRepository + ?Sized,
{
    repository.levels()
}

/// Changes a level's name and/or pay grade.
pub fn update_level<R>(repository: &R, id: Uuid, update: LevelUpdate) -> EngineResult<Level>
where
    R: LevelRepository + ?Sized,
{
    let level = repository.update_level(id, update)?;
    info!(level_id = %id, pay_grade = %level.pay_grade, "Level updated");
    Ok(level)
}

/// Soft-deletes a level that no active teacher is on.
pub fn delete_level<R>(repository: &R, id: Uuid) -> EngineResult<Level>
where
    R: LevelRepository + ?Sized,
{
    let level = repository.delete_level(id)?;
    info!(level_id = %id, "Level deleted");
    Ok(level)
}
