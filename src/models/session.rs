//! Materialized schedule records.
//!
//! An [`ExamSession`] is one section sitting one exam in one room under one
//! proctor. Courses the search could not fully resolve are reported as
//! [`UnscheduledCourse`] instead of being half-persisted.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Cohort, CourseId, ExamPeriodId, ModalityId, ProctorId, ProgramId, RoomId};

/// A persistable exam-session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSession {
    /// Course being examined.
    pub course_id: CourseId,
    /// Program of the section.
    pub program_id: ProgramId,
    /// Section identifier.
    pub modality_id: ModalityId,
    /// Section display name.
    pub section_name: String,
    /// Assigned room.
    pub room_id: RoomId,
    /// Assigned proctor.
    pub proctor_id: ProctorId,
    /// Exam period containing `exam_date`.
    pub examperiod_id: ExamPeriodId,
    /// Exam date.
    pub exam_date: NaiveDate,
    /// Absolute start.
    pub exam_start_time: NaiveDateTime,
    /// Absolute end.
    pub exam_end_time: NaiveDateTime,
    /// Duration label, e.g. `"1h 0m"`.
    pub exam_duration: String,
    /// Academic year label.
    pub academic_year: Option<String>,
    /// Semester label.
    pub semester: Option<String>,
    /// Exam category label.
    pub exam_category: Option<String>,
    /// Label of the selected date range.
    pub exam_period: String,
    /// `"{building name} ({building id})"`.
    pub building_name: String,
}

impl ExamSession {
    /// Whether two sessions share a date and their time windows intersect.
    #[inline]
    pub fn overlaps(&self, other: &ExamSession) -> bool {
        self.exam_date == other.exam_date
            && self.exam_start_time < other.exam_end_time
            && self.exam_end_time > other.exam_start_time
    }

    /// Cohort sitting this session.
    pub fn cohort(&self) -> Cohort {
        Cohort::of(&self.program_id, &self.section_name)
    }
}

/// Why a course was left out of the persisted schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// At least one section has no room.
    NoRoom,
    /// At least one section has no proctor.
    NoProctor,
    /// The assigned date lies in no in-scope exam period.
    NoMatchingPeriod,
    /// A section's room is already booked in an overlapping window.
    RoomConflict,
    /// A section's proctor is already booked in an overlapping window.
    ProctorConflict,
}

impl UnscheduledReason {
    /// Stable snake_case code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRoom => "no_room",
            Self::NoProctor => "no_proctor",
            Self::NoMatchingPeriod => "no_matching_period",
            Self::RoomConflict => "room_conflict",
            Self::ProctorConflict => "proctor_conflict",
        }
    }
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A course the run could not schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledCourse {
    /// Course identifier.
    pub course_id: CourseId,
    /// First blocking reason found.
    pub reason: UnscheduledReason,
}

impl UnscheduledCourse {
    /// Creates a new report entry.
    pub fn new(course_id: impl Into<CourseId>, reason: UnscheduledReason) -> Self {
        Self {
            course_id: course_id.into(),
            reason,
        }
    }
}
