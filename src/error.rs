//! Error taxonomy for scheduling runs.
//!
//! Only run-level failures are errors. A course the search cannot resolve
//! is reported as data ([`crate::models::UnscheduledCourse`]) and the run
//! still succeeds.

use crate::validation::ValidationError;

/// Boxed error returned by a persistence collaborator.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failed scheduling run.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The caller omitted required selections or supplied invalid configuration.
    #[error("invalid scheduling input: {}", summarize(.0))]
    Validation(Vec<ValidationError>),
    /// Reference data needed to search is missing.
    #[error("reference data unavailable: {what}")]
    DataUnavailable {
        /// What was missing.
        what: String,
    },
    /// The bulk write of resolved sessions was rejected; nothing was committed.
    #[error("bulk write rejected: {0}")]
    Persistence(#[source] StoreError),
}

impl ScheduleError {
    pub(crate) fn data_unavailable(what: impl Into<String>) -> Self {
        Self::DataUnavailable { what: what.into() }
    }

    /// Validation errors, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
