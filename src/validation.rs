//! Input validation for scheduling runs.
//!
//! Checks caller selections and configuration before any search starts.
//! Detects:
//! - Missing exam dates or sections
//! - Zero exam duration
//! - Duplicate section IDs
//! - A pre-loaded snapshot whose dates or duration disagree with the run
//! - Unusable GA parameters, an empty time grid, or penalty weights whose
//!   soft distribution term is not dominated by every hard term

use std::collections::HashSet;

use crate::models::{ExamSection, RunParameters};
use crate::scheduler::SchedulerConfig;
use crate::snapshot::Snapshot;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No candidate exam date was selected.
    NoExamDates,
    /// No course section was selected.
    NoSections,
    /// The exam duration is zero minutes.
    ZeroDuration,
    /// Two sections share the same ID.
    DuplicateSection,
    /// GA parameters, time grid, or penalty weights are unusable.
    InvalidConfig,
    /// A pre-loaded snapshot was built for different run parameters.
    SnapshotMismatch,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the caller's selections for a run.
///
/// Checks:
/// 1. At least one exam date
/// 2. At least one section
/// 3. Non-zero duration
/// 4. No duplicate section IDs
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(sections: &[ExamSection], params: &RunParameters) -> ValidationResult {
    let mut errors = Vec::new();

    if params.exam_dates.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoExamDates,
            "Please select at least one exam date",
        ));
    }

    if sections.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoSections,
            "Please select at least one course section",
        ));
    }

    if params.duration.total_minutes() == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroDuration,
            "Exam duration must be longer than zero minutes",
        ));
    }

    let mut seen = HashSet::new();
    for section in sections {
        if !seen.insert(section.modality_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSection,
                format!("Duplicate section ID: {}", section.modality_id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a pre-loaded snapshot against the run it is scheduled for.
///
/// The snapshot's duration drives session end times and its dates drive
/// the search, so both must match `params`.
pub fn validate_snapshot(snapshot: &Snapshot, params: &RunParameters) -> ValidationResult {
    let mut errors = Vec::new();

    if snapshot.duration.total_minutes() == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroDuration,
            "Snapshot exam duration must be longer than zero minutes",
        ));
    }
    if snapshot.duration != params.duration {
        errors.push(ValidationError::new(
            ValidationErrorKind::SnapshotMismatch,
            format!(
                "Snapshot duration ({} min) differs from the run's ({} min)",
                snapshot.duration.total_minutes(),
                params.duration.total_minutes()
            ),
        ));
    }
    if snapshot.dates != params.sorted_dates() {
        errors.push(ValidationError::new(
            ValidationErrorKind::SnapshotMismatch,
            "Snapshot exam dates differ from the run's selected dates",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates scheduler configuration.
pub fn validate_config(config: &SchedulerConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let mut invalid = |message: String| {
        errors.push(ValidationError::new(ValidationErrorKind::InvalidConfig, message));
    };

    let ga = &config.ga;
    if ga.population_size < 2 {
        invalid(format!("Population size must be at least 2, got {}", ga.population_size));
    }
    if ga.elite_count >= ga.population_size {
        invalid(format!(
            "Elite count ({}) must be smaller than population size ({})",
            ga.elite_count, ga.population_size
        ));
    }
    if ga.tournament_size == 0 {
        invalid("Tournament size must be at least 1".to_string());
    }
    if !(0.0..=1.0).contains(&ga.mutation_rate) {
        invalid(format!("Mutation rate must be within [0, 1], got {}", ga.mutation_rate));
    }
    if !(0.0..=1.0).contains(&ga.crossover_bias) {
        invalid(format!("Crossover bias must be within [0, 1], got {}", ga.crossover_bias));
    }

    if config.time_grid.start_times().is_empty() {
        invalid("Time grid yields no start times".to_string());
    }

    let w = &config.weights;
    if w.hard_floor() <= w.date_imbalance {
        invalid(format!(
            "Date imbalance weight ({}) must stay below every conflict weight (lowest is {})",
            w.date_imbalance,
            w.hard_floor()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
