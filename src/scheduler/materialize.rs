//! Schedule materialization.
//!
//! Converts the best chromosome into persistable [`ExamSession`] records.
//!
//! # Algorithm
//!
//! For each gene, in course order:
//! 1. Any section without a room (or a gene with fewer rooms than the
//!    course has sections) → `no_room`.
//! 2. Likewise for proctors → `no_proctor`.
//! 3. No in-scope exam period contains the date → `no_matching_period`.
//! 4. Build one session per section. If a room or proctor is already taken
//!    in an overlapping window on that date (by an earlier course or an
//!    earlier section of this one) → `room_conflict` / `proctor_conflict`.
//! 5. Otherwise commit every session of the course.
//!
//! A course is either fully emitted or fully reported; never half.

use chrono::Duration;
use tracing::warn;

use crate::ga::{ExamChromosome, Gene};
use crate::models::{ExamSession, RunParameters, UnscheduledCourse, UnscheduledReason};
use crate::snapshot::{CourseGroup, Snapshot};

/// Turns the best chromosome into sessions and an unscheduled report.
pub fn materialize(
    best: &ExamChromosome,
    snapshot: &Snapshot,
    params: &RunParameters,
) -> (Vec<ExamSession>, Vec<UnscheduledCourse>) {
    let period_label = params.period_label();
    let mut sessions: Vec<ExamSession> = Vec::new();
    let mut unscheduled = Vec::new();

    for (gene, course) in best.genes.iter().zip(&snapshot.courses) {
        match course_sessions(gene, course, snapshot, params, &period_label, &sessions) {
            Ok(mut emitted) => sessions.append(&mut emitted),
            Err(reason) => {
                warn!(course = %course.course_id, %reason, "course left unscheduled");
                unscheduled.push(UnscheduledCourse::new(course.course_id.clone(), reason));
            }
        }
    }

    (sessions, unscheduled)
}

fn course_sessions(
    gene: &Gene,
    course: &CourseGroup,
    snapshot: &Snapshot,
    params: &RunParameters,
    period_label: &str,
    committed: &[ExamSession],
) -> Result<Vec<ExamSession>, UnscheduledReason> {
    let sections = course.sections.len();
    if gene.rooms.len() != sections || gene.rooms.iter().any(Option::is_none) {
        return Err(UnscheduledReason::NoRoom);
    }
    if gene.proctors.len() != sections || gene.proctors.iter().any(Option::is_none) {
        return Err(UnscheduledReason::NoProctor);
    }
    let period = snapshot
        .period_for(gene.date)
        .ok_or(UnscheduledReason::NoMatchingPeriod)?;

    let start = gene.date.and_time(gene.start);
    let end = start + Duration::minutes(i64::from(snapshot.duration.total_minutes()));
    let duration_label = snapshot.duration.label();

    let mut emitted: Vec<ExamSession> = Vec::with_capacity(sections);
    for ((section, room), proctor) in course.sections.iter().zip(&gene.rooms).zip(&gene.proctors) {
        let (Some(room_id), Some(proctor_id)) = (room, proctor) else {
            return Err(UnscheduledReason::NoRoom);
        };
        let session = ExamSession {
            course_id: course.course_id.clone(),
            program_id: section.program_id.clone(),
            modality_id: section.modality_id.clone(),
            section_name: section.section_name.clone(),
            room_id: room_id.clone(),
            proctor_id: proctor_id.clone(),
            examperiod_id: period.examperiod_id.clone(),
            exam_date: gene.date,
            exam_start_time: start,
            exam_end_time: end,
            exam_duration: duration_label.clone(),
            academic_year: params.term.academic_year.clone(),
            semester: params.term.semester.clone(),
            exam_category: params.exam_category.clone(),
            exam_period: period_label.to_string(),
            building_name: snapshot.building_label(room_id).to_string(),
        };

        for other in committed.iter().chain(&emitted).filter(|s| s.overlaps(&session)) {
            if other.room_id == session.room_id {
                return Err(UnscheduledReason::RoomConflict);
            }
            if other.proctor_id == session.proctor_id {
                return Err(UnscheduledReason::ProctorConflict);
            }
        }
        emitted.push(session);
    }
    Ok(emitted)
}
