//! Exam timetabling for the U-Engine ecosystem.
//!
//! Places every section of every selected course into a date, a start
//! time, a room and a proctor so that no room, proctor or student cohort is
//! double-booked, using a generational genetic algorithm over a run-scoped
//! snapshot of reference data.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ExamSection`, `Cohort`, `Room`,
//!   `ProctorAvailability`, `ExamPeriod`, `RunParameters`, `ExamSession`
//! - **`snapshot`**: Run-scoped lookup tables built from collaborator data
//! - **`ga`**: Chromosome encoding, penalty fitness, operators and the
//!   generational runner
//! - **`scheduler`**: End-to-end pipeline, materialization, persistence
//!   seam and KPI audit
//! - **`validation`**: Input and configuration checks run before any search
//! - **`error`**: Run-level failures
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_examsched::models::{ExamPeriod, ExamSection, ProctorAvailability, Room, RunParameters};
//! use u_examsched::snapshot::{ReferenceData, Snapshot};
//!
//! let day = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
//! let data = ReferenceData {
//!     sections: vec![ExamSection::new("S1", "IT101", "BSIT", "BSIT 1A").with_enrolled(30)],
//!     rooms: vec![Room::new("R1", 40, "B1"), Room::new("R2", 40, "B1")],
//!     buildings: vec![],
//!     availability: vec![ProctorAvailability::available("U1", day)],
//!     exam_periods: vec![ExamPeriod::new("EP1", day, day, "CITC")],
//! };
//! let params = RunParameters::new(vec![day]);
//!
//! let snapshot = Snapshot::load(&data, &params).unwrap();
//! let outcome = u_examsched::schedule(&snapshot, &params).unwrap();
//! assert_eq!(outcome.sessions.len(), 1);
//! ```
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Qu et al. (2009), "A survey of search methodologies and automated system
//!   development for examination timetabling"

pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod snapshot;
pub mod validation;

pub use error::ScheduleError;
pub use scheduler::schedule;
