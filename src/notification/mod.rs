//! Outbound notifications.
//!
//! Pay statements and level changes are delivered through a [`Notifier`].
//! The service binary uses [`LogNotifier`]; tests use [`RecordingNotifier`]
//! to observe what was sent and to simulate delivery failures.

mod template;

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use crate::error::{EngineError, EngineResult};

pub use template::{PayslipTemplateData, render_level_change};

/// Delivers a message to one recipient.
pub trait Notifier: Send + Sync {
    /// Sends `body` with `subject` to `email`.
    ///
    /// Failures are reported as [`EngineError::DeliveryFailure`].
    fn send(&self, email: &str, subject: &str, body: &str) -> EngineResult<()>;
}

/// Writes every message to the tracing log instead of sending it.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    from_email: String,
}

impl LogNotifier {
    /// Creates a notifier that logs messages as sent from `from_email`.
    pub fn new(from_email: impl Into<String>) -> Self {
        Self {
            from_email: from_email.into(),
        }
    }
}

impl Notifier for LogNotifier {
    fn send(&self, email: &str, subject: &str, body: &str) -> EngineResult<()> {
        info!(
            from = %self.from_email,
            to = %email,
            subject = %subject,
            body_len = body.len(),
            "Notification sent"
        );
        Ok(())
    }
}

/// A message captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient address.
    pub email: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

#[derive(Debug, Default)]
struct Recording {
    sent: Vec<SentMessage>,
    attempts: usize,
    // Remaining forced failures per recipient; `None` fails forever.
    failures: HashMap<String, Option<usize>>,
}

/// Keeps sent messages in memory and fails on demand.
///
/// # Example
///
/// ```
/// use teacher_payroll::notification::{Notifier, RecordingNotifier};
///
/// let notifier = RecordingNotifier::new();
/// notifier.fail_times("ben@school.org", 1);
///
/// assert!(notifier.send("ben@school.org", "Hi", "body").is_err());
/// assert!(notifier.send("ben@school.org", "Hi", "body").is_ok());
/// assert_eq!(notifier.sent().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    inner: Mutex<Recording>,
}

impl RecordingNotifier {
    /// Creates a notifier that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delivery to `email` fail.
    pub fn fail_always(&self, email: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failures.insert(email.to_lowercase(), None);
        }
    }

    /// Makes the next `times` deliveries to `email` fail.
    pub fn fail_times(&self, email: &str, times: usize) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failures.insert(email.to_lowercase(), Some(times));
        }
    }

    /// Stops forcing failures for `email`.
    pub fn recover(&self, email: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failures.remove(&email.to_lowercase());
        }
    }

    /// Messages delivered so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.inner
            .lock()
            .map(|inner| inner.sent.clone())
            .unwrap_or_default()
    }

    /// Messages delivered to `email`.
    pub fn sent_to(&self, email: &str) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.email.eq_ignore_ascii_case(email))
            .collect()
    }

    /// Delivery attempts so far, failed ones included.
    pub fn attempts(&self) -> usize {
        self.inner.lock().map(|inner| inner.attempts).unwrap_or(0)
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, email: &str, subject: &str, body: &str) -> EngineResult<()> {
        let mut inner = self.inner.lock().map_err(|e| EngineError::DeliveryFailure {
            recipient: email.to_string(),
            message: e.to_string(),
        })?;
        inner.attempts += 1;

        let key = email.to_lowercase();
        let fail = match inner.failures.get_mut(&key) {
            Some(None) => true,
            Some(Some(0)) => false,
            Some(Some(remaining)) => {
                *remaining -= 1;
                true
            }
            None => false,
        };
        if fail {
            return Err(EngineError::DeliveryFailure {
                recipient: email.to_string(),
                message: "simulated transport failure".to_string(),
            });
        }

        inner.sent.push(SentMessage {
            email: email.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
