//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::attendance::ClockRules;
use crate::clock::Clock;
use crate::config::ServiceConfig;
use crate::notification::Notifier;
use crate::scheduler::PayrollJob;
use crate::store::PayrollStore;

struct Inner {
    store: Arc<dyn PayrollStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    clock_rules: ClockRules,
    level_change_subject: String,
    job: PayrollJob,
}

/// Shared application state.
///
/// Holds the store, the notifier and the clock every handler works against,
/// plus the payroll job used by manual runs.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// Creates the application state from its collaborators and the service settings.
    pub fn new(
        store: Arc<dyn PayrollStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: &ServiceConfig,
    ) -> Self {
        let job = PayrollJob::new(store.clone(), notifier.clone(), config.job_settings());
        Self {
            inner: Arc::new(Inner {
                store,
                notifier,
                clock,
                clock_rules: config.attendance.clock_rules(),
                level_change_subject: config.notification.level_change_subject.clone(),
                job,
            }),
        }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &dyn PayrollStore {
        self.inner.store.as_ref()
    }

    /// Returns the notifier.
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    /// Returns the clock.
    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    /// Returns the clock-out rules.
    pub fn clock_rules(&self) -> &ClockRules {
        &self.inner.clock_rules
    }

    /// Returns the subject line for level change notices.
    pub fn level_change_subject(&self) -> &str {
        &self.inner.level_change_subject
    }

    /// Returns the payroll job.
    pub fn job(&self) -> &PayrollJob {
        &self.inner.job
    }
}
