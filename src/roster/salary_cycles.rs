//! Salary cycle management.

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{SalaryCycle, SalaryCycleBatch, SalaryCycleUpdate};
use crate::store::SalaryCycleRepository;

/// Creates a batch of back-to-back cycles.
///
/// Nothing is stored when any generated cycle starts on the same day as an
/// existing active cycle.
pub fn create_salary_cycles<R>(
    repository: &R,
    batch: &SalaryCycleBatch,
) -> EngineResult<Vec<SalaryCycle>>
where
    R: SalaryCycleRepository + ?Sized,
{
    let cycles = repository.insert_salary_cycles(batch.generate()?)?;
    info!(
        start_date = %batch.start_date,
        days_in_cycle = batch.days_in_cycle,
        count = cycles.len(),
        "Salary cycles created"
    );
    Ok(cycles)
}

/// The active cycle with `id`.
pub fn get_salary_cycle<R>(repository: &R, id: Uuid) -> EngineResult<SalaryCycle>
where
    R: SalaryCycleRepository + ?Sized,
{
    repository
        .salary_cycle(id)?
        .ok_or_else(|| EngineError::SalaryCycleNotFound { id: id.to_string() })
}

/// Every active cycle, earliest first.
pub fn list_salary_cycles<R>(repository: &R) -> EngineResult<Vec<SalaryCycle>>
where
    R: SalaryCycleRepository + ?Sized,
{
    repository.salary_cycles()
}

/// The active cycle containing `date`, if any.
pub fn current_salary_cycle<R>(repository: &R, date: NaiveDate) -> EngineResult<Option<SalaryCycle>>
where
    R: SalaryCycleRepository + ?Sized,
{
    Ok(repository
        .salary_cycles()?
        .into_iter()
        .find(|cycle| cycle.window().contains_date(date)))
}

/// Changes a cycle's dates and/or average work hours.
pub fn update_salary_cycle<R>(
    repository: &R,
    id: Uuid,
    update: SalaryCycleUpdate,
) -> EngineResult<SalaryCycle>
where
    R: SalaryCycleRepository + ?Sized,
{
    let cycle = repository.update_salary_cycle(id, update)?;
    info!(cycle_id = %id, window = %cycle.window(), "Salary cycle updated");
    Ok(cycle)
}

/// Soft-deletes a cycle; payroll no longer runs at its end.
pub fn delete_salary_cycle<R>(repository: &R, id: Uuid) -> EngineResult<SalaryCycle>
where
    R: SalaryCycleRepository + ?Sized,
{
    let cycle = repository.delete_salary_cycle(id)?;
    info!(cycle_id = %id, "Salary cycle deleted");
    Ok(cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(start_date: NaiveDate, number_of_cycles: u32) -> SalaryCycleBatch {
        SalaryCycleBatch {
            start_date,
            days_in_cycle: 14,
            number_of_cycles,
            average_work_hours: 8,
        }
    }

    #[test]
    fn test_salary_cycle_crud() {
        let store = MemoryStore::new();
        let created = create_salary_cycles(&store, &batch(date(2026, 1, 1), 3)).unwrap();
        assert_eq!(created.len(), 3);
        assert_eq!(list_salary_cycles(&store).unwrap(), created);

        let updated = update_salary_cycle(
            &store,
            created[2].id,
            SalaryCycleUpdate {
                end_date: Some(date(2026, 2, 15)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.end_date, date(2026, 2, 15));
        assert_eq!(get_salary_cycle(&store, created[2].id).unwrap(), updated);

        delete_salary_cycle(&store, created[0].id).unwrap();
        assert!(matches!(
            get_salary_cycle(&store, created[0].id),
            Err(EngineError::SalaryCycleNotFound { .. })
        ));
        assert_eq!(list_salary_cycles(&store).unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_start_rejected() {
        let store = MemoryStore::new();
        create_salary_cycles(&store, &batch(date(2026, 1, 1), 1)).unwrap();

        let result = create_salary_cycles(&store, &batch(date(2026, 1, 1), 2));
        assert!(matches!(
            result,
            Err(EngineError::DuplicateSalaryCycle { .. })
        ));
        assert_eq!(list_salary_cycles(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_current_salary_cycle() {
        let store = MemoryStore::new();
        let created = create_salary_cycles(&store, &batch(date(2026, 1, 1), 2)).unwrap();

        let current = current_salary_cycle(&store, date(2026, 1, 20)).unwrap().unwrap();
        assert_eq!(current.id, created[1].id);
        assert!(current_salary_cycle(&store, date(2026, 3, 1)).unwrap().is_none());
    }
}
