//! Exam timetabling domain models.
//!
//! Provides the value types exchanged with the collaborators that own
//! reference data (rooms, sections, proctor availability, exam periods)
//! and the records produced for persistence.
//!
//! # Domain Mappings
//!
//! | u-examsched | Registrar | Facilities | Faculty |
//! |-------------|-----------|------------|---------|
//! | ExamSection | Course section | — | — |
//! | Cohort | Year level × program | — | — |
//! | Room | — | Classroom | — |
//! | ProctorAvailability | — | — | Proctor calendar |
//! | ExamSession | Exam slot | Room booking | Proctor duty |

mod params;
mod period;
mod room;
mod section;
mod session;

pub use params::{AcademicTerm, ExamDuration, RunParameters, TimeGrid};
pub(crate) use params::minute_of_day;
pub use period::{AvailabilityStatus, ExamPeriod, ProctorAvailability};
pub use room::{Building, Room};
pub use section::{Cohort, ExamSection};
pub use session::{ExamSession, UnscheduledCourse, UnscheduledReason};

/// Course identifier.
pub type CourseId = String;
/// Academic program identifier.
pub type ProgramId = String;
/// Room identifier.
pub type RoomId = String;
/// Building identifier.
pub type BuildingId = String;
/// Proctor (user) identifier.
pub type ProctorId = String;
/// Exam period identifier.
pub type ExamPeriodId = String;
/// Section modality identifier (unique per section).
pub type ModalityId = String;
