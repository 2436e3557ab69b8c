//! Exam section and cohort models.
//!
//! A section is one class group of a course that must sit the course's
//! exam. Sections of the same course are scheduled together (same date and
//! start time) but each gets its own room and proctor.

use serde::{Deserialize, Serialize};

use super::{CourseId, ModalityId, ProgramId, RoomId};

/// One section of one course needing an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSection {
    /// Section identifier (unique across the run).
    pub modality_id: ModalityId,
    /// Course this section belongs to.
    pub course_id: CourseId,
    /// Program the enrolled students belong to.
    pub program_id: ProgramId,
    /// Section name, e.g. "BSIT 3A". The first digit is the year level.
    pub section_name: String,
    /// Number of enrolled students.
    pub enrolled_students: u32,
    /// Rooms the collaborator marked as possible for this section.
    #[serde(default)]
    pub possible_rooms: Vec<RoomId>,
}

/// Students who cannot sit two exams at once: (year level, program).
///
/// Sections whose name carries no digit share the `None` year level of
/// their program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cohort {
    /// Year level parsed from the section name.
    pub year_level: Option<u8>,
    /// Program identifier.
    pub program_id: ProgramId,
}

impl ExamSection {
    /// Creates a section with no enrolment and no possible rooms.
    pub fn new(
        modality_id: impl Into<ModalityId>,
        course_id: impl Into<CourseId>,
        program_id: impl Into<ProgramId>,
        section_name: impl Into<String>,
    ) -> Self {
        Self {
            modality_id: modality_id.into(),
            course_id: course_id.into(),
            program_id: program_id.into(),
            section_name: section_name.into(),
            enrolled_students: 0,
            possible_rooms: Vec::new(),
        }
    }

    /// Sets the enrolled-student count.
    pub fn with_enrolled(mut self, enrolled: u32) -> Self {
        self.enrolled_students = enrolled;
        self
    }

    /// Sets the possible rooms.
    pub fn with_possible_rooms(mut self, rooms: Vec<RoomId>) -> Self {
        self.possible_rooms = rooms;
        self
    }

    /// Year level: the first decimal digit in the section name.
    pub fn year_level(&self) -> Option<u8> {
        year_level_of(&self.section_name)
    }

    /// The cohort whose students attend this section.
    pub fn cohort(&self) -> Cohort {
        Cohort::of(&self.program_id, &self.section_name)
    }
}

impl Cohort {
    /// Cohort of a section identified by program and section name.
    pub fn of(program_id: &str, section_name: &str) -> Self {
        Self {
            year_level: year_level_of(section_name),
            program_id: program_id.to_string(),
        }
    }
}

fn year_level_of(section_name: &str) -> Option<u8> {
    section_name
        .chars()
        .find_map(|c| c.to_digit(10))
        .map(|d| d as u8)
}
