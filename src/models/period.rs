//! Exam periods and proctor availability.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ExamPeriodId, ProctorId};

/// A college-scoped date range in which exams may be held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPeriod {
    /// Unique period identifier.
    pub examperiod_id: ExamPeriodId,
    /// First date (inclusive).
    pub start_date: NaiveDate,
    /// Last date (inclusive).
    pub end_date: NaiveDate,
    /// Owning college.
    pub college_id: String,
}

impl ExamPeriod {
    /// Creates a new exam period.
    pub fn new(
        examperiod_id: impl Into<ExamPeriodId>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        college_id: impl Into<String>,
    ) -> Self {
        Self {
            examperiod_id: examperiod_id.into(),
            start_date,
            end_date,
            college_id: college_id.into(),
        }
    }

    /// Whether `date` falls inside the period (both ends inclusive).
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Availability status of a proctor on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    /// The proctor may be assigned on this date.
    Available,
    /// The proctor must not be assigned on this date.
    Unavailable,
}

/// A (proctor, date) availability row.
///
/// Availability has no time-of-day granularity: an available proctor may
/// take any slot of the date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProctorAvailability {
    /// Proctor identifier.
    pub proctor_id: ProctorId,
    /// Calendar date.
    pub date: NaiveDate,
    /// Status on that date.
    pub status: AvailabilityStatus,
}

impl ProctorAvailability {
    /// An `available` row.
    pub fn available(proctor_id: impl Into<ProctorId>, date: NaiveDate) -> Self {
        Self {
            proctor_id: proctor_id.into(),
            date,
            status: AvailabilityStatus::Available,
        }
    }

    /// An `unavailable` row.
    pub fn unavailable(proctor_id: impl Into<ProctorId>, date: NaiveDate) -> Self {
        Self {
            proctor_id: proctor_id.into(),
            date,
            status: AvailabilityStatus::Unavailable,
        }
    }

    /// Whether this row makes the proctor assignable.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == AvailabilityStatus::Available
    }
}
