//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading service
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{Level, PayPolicy, SalaryCycle};
use crate::store::{LevelRepository, PolicyStore, SalaryCycleRepository};

use super::types::{LevelsConfig, SalaryCyclesConfig, ServiceConfig};

/// Loads and provides access to service configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── service.yaml   # Server, attendance, schedule and notification settings
/// ├── policy.yaml          # Pay policy to seed (optional)
/// ├── levels.yaml          # Levels to seed (optional)
/// └── salary_cycles.yaml   # Salary cycle batches to seed (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use teacher_payroll::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Listening on {}", loader.service().server.bind_address);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    service: ServiceConfig,
    policy: Option<PayPolicy>,
    levels: LevelsConfig,
    salary_cycles: Vec<SalaryCycle>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `service.yaml` is missing
    /// - Any present file contains invalid YAML
    /// - A zero `poll_interval_secs` or `max_delivery_attempts` is configured
    /// - The seeded policy, a seeded level or a salary cycle batch is invalid
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let service = Self::load_yaml::<ServiceConfig>(&path.join("service.yaml"))?;

        let policy = Self::load_optional_yaml::<PayPolicy>(&path.join("policy.yaml"))?;
        if let Some(policy) = &policy {
            policy.validate()?;
        }

        let levels =
            Self::load_optional_yaml::<LevelsConfig>(&path.join("levels.yaml"))?.unwrap_or_default();
        for seed in &levels.levels {
            Level::new(seed.name.as_str(), seed.pay_grade)?;
        }

        let batches = Self::load_optional_yaml::<SalaryCyclesConfig>(&path.join("salary_cycles.yaml"))?
            .unwrap_or_default()
            .batches;
        let mut salary_cycles = Vec::new();
        for batch in &batches {
            salary_cycles.extend(batch.generate()?);
        }

        Ok(Self {
            service,
            policy,
            levels,
            salary_cycles,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads a YAML file if it exists.
    fn load_optional_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load_yaml(path).map(Some)
    }

    /// Returns the service settings.
    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    /// Returns the pay policy to seed, if configured.
    pub fn policy(&self) -> Option<&PayPolicy> {
        self.policy.as_ref()
    }

    /// Returns the levels to seed.
    pub fn levels(&self) -> &LevelsConfig {
        &self.levels
    }

    /// Returns the salary cycles generated from `salary_cycles.yaml`.
    pub fn salary_cycles(&self) -> &[SalaryCycle] {
        &self.salary_cycles
    }

    /// Writes the configured policy, levels and salary cycles into an empty
    /// store.
    ///
    /// Returns the number of levels created.
    pub fn seed_store<S>(&self, store: &S) -> EngineResult<usize>
    where
        S: PolicyStore + LevelRepository + SalaryCycleRepository + ?Sized,
    {
        if let Some(policy) = &self.policy {
            store.initialize_policy(policy.clone())?;
        }
        for seed in &self.levels.levels {
            store.insert_level(Level::new(seed.name.as_str(), seed.pay_grade)?)?;
        }
        if !self.salary_cycles.is_empty() {
            store.insert_salary_cycles(self.salary_cycles.clone())?;
        }
        info!(
            policy = self.policy.is_some(),
            levels = self.levels.levels.len(),
            salary_cycles = self.salary_cycles.len(),
            "Seeded store from configuration"
        );
        Ok(self.levels.levels.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("payroll-config-{}-{}", name, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_default_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.service().attendance.min_shift_minutes, 60);
        assert_eq!(
            loader.service().attendance.auto_close_time,
            NaiveTime::from_hms_opt(16, 0, 0).unwrap()
        );
        assert_eq!(
            loader.service().notification.pay_statement_subject,
            "Your Pay Slip Has Arrived"
        );
        let policy = loader.policy().unwrap();
        assert_eq!(policy.work_hours_per_day, dec("8"));
        assert_eq!(policy.overtime_percent, dec("50"));
        assert!(!loader.levels().levels.is_empty());
    }

    #[test]
    fn test_missing_directory_returns_config_not_found() {
        let result = ConfigLoader::load("./config/does-not-exist");
        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.ends_with("service.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_optional_files_may_be_absent() {
        let dir = scratch_dir("minimal");
        fs::write(dir.join("service.yaml"), "server:\n  bind_address: 127.0.0.1:9000\n").unwrap();

        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(loader.service().server.bind_address, "127.0.0.1:9000");
        assert_eq!(loader.service().payroll.schedule, ScheduleConfig::default());
        assert!(loader.policy().is_none());
        assert!(loader.levels().levels.is_empty());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_malformed_yaml_returns_parse_error() {
        let dir = scratch_dir("malformed");
        fs::write(dir.join("service.yaml"), "payroll: [not, a, map").unwrap();

        let result = ConfigLoader::load(&dir);
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let dir = scratch_dir("bad-policy");
        fs::write(dir.join("service.yaml"), "{}\n").unwrap();
        fs::write(
            dir.join("policy.yaml"),
            "work_hours_per_day: \"0\"\novertime_percent: \"50\"\n",
        )
        .unwrap();

        let result = ConfigLoader::load(&dir);
        assert!(matches!(result, Err(EngineError::InvalidPolicy { .. })));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let dir = scratch_dir("zero-poll");
        fs::write(dir.join("service.yaml"), "payroll:\n  poll_interval_secs: 0\n").unwrap();

        let result = ConfigLoader::load(&dir);
        match result {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.ends_with("service.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_zero_delivery_attempts_rejected() {
        let dir = scratch_dir("zero-attempts");
        fs::write(dir.join("service.yaml"), "payroll:\n  max_delivery_attempts: 0\n").unwrap();

        let result = ConfigLoader::load(&dir);
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_salary_cycle_schedule() {
        let dir = scratch_dir("cycles");
        fs::write(
            dir.join("service.yaml"),
            "payroll:\n  schedule:\n    mode: salary_cycle\n",
        )
        .unwrap();
        fs::write(
            dir.join("salary_cycles.yaml"),
            "batches:\n  - start_date: 2026-01-01\n    days_in_cycle: 14\n    number_of_cycles: 2\n    average_work_hours: 8\n",
        )
        .unwrap();

        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(loader.salary_cycles().len(), 2);

        let store = MemoryStore::new();
        loader.seed_store(&store).unwrap();
        let cycles = store.salary_cycles().unwrap();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].average_work_hours, 8);

        let schedule = loader.service().payroll.schedule.to_schedule();
        assert!(schedule.uses_salary_cycles());
        assert_eq!(
            schedule.next_run_date(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(), &cycles),
            NaiveDate::from_ymd_opt(2026, 1, 14)
        );

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_invalid_salary_cycle_batch_rejected() {
        let dir = scratch_dir("bad-cycles");
        fs::write(dir.join("service.yaml"), "{}\n").unwrap();
        fs::write(
            dir.join("salary_cycles.yaml"),
            "batches:\n  - start_date: 2026-01-01\n    days_in_cycle: 0\n    number_of_cycles: 2\n",
        )
        .unwrap();

        let result = ConfigLoader::load(&dir);
        assert!(matches!(result, Err(EngineError::InvalidSalaryCycle { .. })));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_seed_store() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let store = MemoryStore::new();

        let created = loader.seed_store(&store).unwrap();
        assert_eq!(created, loader.levels().levels.len());
        assert_eq!(store.levels().unwrap().len(), created);
        assert!(store.active_policy().unwrap().is_some());
    }
}
