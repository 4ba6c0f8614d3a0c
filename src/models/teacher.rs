//! Teacher model and level-change history.
//!
//! This module defines the [`Teacher`] struct, the [`NewTeacher`] onboarding
//! payload and the [`LevelChange`] history entry written on every promotion
//! or demotion.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::RecordStatus;

/// Maximum length of a bank account number.
pub const ACCOUNT_NUMBER_MAX_LEN: usize = 10;

/// Direction of a level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    /// Moved to a new level through promotion.
    Promotion,
    /// Moved to a new level through demotion.
    Demotion,
}

impl ChangeDirection {
    /// Lowercase label used in logs and notifications.
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeDirection::Promotion => "promotion",
            ChangeDirection::Demotion => "demotion",
        }
    }
}

/// A member of teaching staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique identifier for the teacher.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address; unique among active teachers.
    pub email: String,
    /// The teacher's current level.
    pub level_id: Uuid,
    /// Bank account number; unique among active teachers when present.
    pub account_number: Option<String>,
    /// Name on the bank account.
    #[serde(default)]
    pub account_name: String,
    /// Bank name.
    #[serde(default)]
    pub bank: String,
    /// Direction of the most recent level change, if any.
    pub last_level_change: Option<ChangeDirection>,
    /// Soft-delete status.
    #[serde(default)]
    pub status: RecordStatus,
    /// When the teacher was onboarded.
    pub created_at: NaiveDateTime,
    /// When the teacher was last modified.
    pub updated_at: NaiveDateTime,
}

impl Teacher {
    /// Returns "first last".
    ///
    /// # Examples
    ///
    /// ```
    /// use teacher_payroll::models::NewTeacher;
    /// use chrono::NaiveDateTime;
    /// use uuid::Uuid;
    ///
    /// let now = NaiveDateTime::parse_from_str("2026-03-02 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let teacher = NewTeacher {
    ///     first_name: "Ada".to_string(),
    ///     last_name: "Obi".to_string(),
    ///     email: "ada@school.org".to_string(),
    ///     level_id: Uuid::new_v4(),
    ///     account_number: None,
    ///     account_name: String::new(),
    ///     bank: String::new(),
    /// }
    /// .into_teacher(now)
    /// .unwrap();
    /// assert_eq!(teacher.full_name(), "Ada Obi");
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns true unless the teacher has been soft-deleted.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Onboarding payload for a new teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeacher {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Initial level.
    pub level_id: Uuid,
    /// Bank account number.
    #[serde(default)]
    pub account_number: Option<String>,
    /// Name on the bank account.
    #[serde(default)]
    pub account_name: String,
    /// Bank name.
    #[serde(default)]
    pub bank: String,
}

impl NewTeacher {
    /// Validates the payload and builds an active [`Teacher`].
    ///
    /// Empty account numbers are treated as absent.
    pub fn into_teacher(self, now: NaiveDateTime) -> EngineResult<Teacher> {
        if self.first_name.trim().is_empty() {
            return Err(EngineError::InvalidTeacher {
                field: "first_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        let email = self.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(EngineError::InvalidTeacher {
                field: "email".to_string(),
                message: format!("'{}' is not an email address", self.email),
            });
        }
        let account_number = self
            .account_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if account_number
            .as_ref()
            .is_some_and(|n| n.chars().count() > ACCOUNT_NUMBER_MAX_LEN)
        {
            return Err(EngineError::InvalidTeacher {
                field: "account_number".to_string(),
                message: format!("must be at most {} characters", ACCOUNT_NUMBER_MAX_LEN),
            });
        }

        Ok(Teacher {
            id: Uuid::new_v4(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email,
            level_id: self.level_id,
            account_number,
            account_name: self.account_name,
            bank: self.bank,
            last_level_change: None,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }
}

/// A historical record of one promotion or demotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChange {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// The teacher whose level changed.
    pub teacher_id: Uuid,
    /// Level before the change.
    pub old_level_id: Uuid,
    /// Level after the change.
    pub new_level_id: Uuid,
    /// Whether this was a promotion or a demotion.
    pub direction: ChangeDirection,
    /// Optional free-text reason.
    pub reason: Option<String>,
    /// When the change took effect.
    pub changed_at: NaiveDateTime,
}
