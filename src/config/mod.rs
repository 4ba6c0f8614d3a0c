//! Configuration loading for the payroll service.
//!
//! Settings live in YAML files: service settings, plus an optional pay policy,
//! an optional list of levels and optional salary cycle batches used to seed
//! an empty store.
//!
//! # Example
//!
//! ```no_run
//! use teacher_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Payroll polls every {:?}", config.service().payroll.poll_interval());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AttendanceConfig, LevelSeed, LevelsConfig, NotificationConfig, PayrollConfig,
    SalaryCyclesConfig, ScheduleConfig, ServerConfig, ServiceConfig,
};
