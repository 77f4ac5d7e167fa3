//! Common error types used across the workspace.
//!
//! Every constructor and mutator in the domain returns a [`TrackerError`].
//! Each layer above defines its own typed errors and converts into this
//! one (adapters go through [`TrackerError::Storage`]).

use std::fmt;

/// Top-level error shared by every layer.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("domain rule violated: {0}")]
    DomainRule(#[from] RuleViolation),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TrackerError {
    /// Stable, machine-checkable discriminator for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DomainRule(rule) => rule.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether this error is a business-rule violation.
    #[must_use]
    pub fn is_domain_rule(&self) -> bool {
        matches!(self, Self::DomainRule(_))
    }

    /// Whether this error is a per-field validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this error reports a missing resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Business invariants an entity or value object refused to break.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("key task cannot be empty")]
    EmptyKeyTask,

    #[error("day number must be positive, got {0}")]
    InvalidDayNumber(u32),

    #[error("invalid task category: {0:?}")]
    InvalidCategory(String),

    #[error("task already started")]
    TaskAlreadyStarted,

    #[error("cannot update duration: task not started")]
    TaskNotStarted,

    #[error("{field} cannot be negative")]
    NegativeDuration { field: &'static str },

    #[error("wake time cannot be before bedtime")]
    WakeBeforeBedtime,

    #[error("sleep latency cannot be negative")]
    NegativeSleepLatency,

    #[error("sleep latency seems too long (over 2 hours)")]
    SleepLatencyTooLong,

    #[error("{entity} with id '{id}' already exists")]
    DuplicateId { entity: &'static str, id: String },
}

impl RuleViolation {
    /// Stable code identifying the violated rule.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyKeyTask => "EMPTY_KEY_TASK",
            Self::InvalidDayNumber(_) => "INVALID_DAY_NUMBER",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::TaskAlreadyStarted => "TASK_ALREADY_STARTED",
            Self::TaskNotStarted => "TASK_NOT_STARTED",
            Self::NegativeDuration { .. } => "NEGATIVE_DURATION",
            Self::WakeBeforeBedtime => "WAKE_BEFORE_BEDTIME",
            Self::NegativeSleepLatency => "NEGATIVE_SLEEP_LATENCY",
            Self::SleepLatencyTooLong => "SLEEP_LATENCY_TOO_LONG",
            Self::DuplicateId { .. } => "DUPLICATE_ID",
        }
    }
}

/// A single input field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation error for field '{field}': {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A looked-up resource does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with id '{}' not found", self.entity, self.id)
    }
}

impl std::error::Error for NotFoundError {}
