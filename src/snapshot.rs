//! Reference snapshot loading.
//!
//! Turns the raw collections supplied by data-owning collaborators into the
//! immutable lookup tables one scheduling run searches against. Every run
//! builds its own snapshot; nothing here is cached across runs.
//!
//! Tables whose order feeds random sampling (candidate dates, suitable
//! rooms, proctors per date) keep input order so seeded runs reproduce.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScheduleError;
use crate::models::{
    Building, Cohort, CourseId, ExamDuration, ExamPeriod, ExamSection, ModalityId, ProctorAvailability,
    ProctorId, Room, RoomId, RunParameters, TimeGrid,
};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Raw reference collections for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Sections selected for examination.
    pub sections: Vec<ExamSection>,
    /// All rooms.
    pub rooms: Vec<Room>,
    /// All buildings.
    pub buildings: Vec<Building>,
    /// Proctor availability rows.
    pub availability: Vec<ProctorAvailability>,
    /// Exam periods.
    pub exam_periods: Vec<ExamPeriod>,
}

/// How a section's candidate rooms are drawn from the room list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPreference {
    /// Possible rooms first, then every other room with enough seats.
    #[default]
    AnySufficient,
    /// Only possible rooms with enough seats; any sufficient room when none qualify.
    PossibleOnly,
}

/// All sections of one course, scheduled as one unit.
#[derive(Debug, Clone)]
pub struct CourseGroup {
    /// Course identifier.
    pub course_id: CourseId,
    /// Sections in input order.
    pub sections: Vec<ExamSection>,
    /// Distinct cohorts across the sections, sorted.
    pub cohorts: Vec<Cohort>,
}

/// Immutable run-scoped lookup tables.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Courses in first-appearance order. Gene `i` schedules course `i`.
    pub courses: Vec<CourseGroup>,
    /// Candidate dates, sorted and de-duplicated.
    pub dates: Vec<NaiveDate>,
    /// Legal start times.
    pub start_times: Vec<NaiveTime>,
    /// Exam length.
    pub duration: ExamDuration,
    /// Room → seating capacity.
    pub room_capacity: HashMap<RoomId, u32>,
    /// Room → building label.
    pub room_building: HashMap<RoomId, String>,
    /// Date → available proctors, in availability-row order.
    pub proctors_by_date: BTreeMap<NaiveDate, Vec<ProctorId>>,
    /// Section → rooms with enough seats, preferred rooms first.
    pub suitable_rooms: HashMap<ModalityId, Vec<RoomId>>,
    /// Exam periods in scope for this run.
    pub periods: Vec<ExamPeriod>,
}

const UNKNOWN_BUILDING: &str = "Unknown Building";

impl Snapshot {
    /// Loads a snapshot with the default time grid and room preference.
    pub fn load(data: &ReferenceData, params: &RunParameters) -> Result<Self, ScheduleError> {
        Self::load_with(data, params, RoomPreference::default(), &TimeGrid::default())
    }

    /// Loads a snapshot.
    ///
    /// # Errors
    /// [`ScheduleError::Validation`] for a zero exam duration.
    /// [`ScheduleError::DataUnavailable`] when there are no candidate dates,
    /// no rooms, no in-scope exam periods, or no start times on the grid.
    pub fn load_with(
        data: &ReferenceData,
        params: &RunParameters,
        preference: RoomPreference,
        grid: &TimeGrid,
    ) -> Result<Self, ScheduleError> {
        if params.duration.total_minutes() == 0 {
            return Err(ScheduleError::Validation(vec![ValidationError::new(
                ValidationErrorKind::ZeroDuration,
                "Exam duration must be longer than zero minutes",
            )]));
        }
        let dates = params.sorted_dates();
        if dates.is_empty() {
            return Err(ScheduleError::data_unavailable("no candidate exam dates"));
        }
        if data.rooms.is_empty() {
            return Err(ScheduleError::data_unavailable("no rooms"));
        }
        let periods: Vec<ExamPeriod> = data
            .exam_periods
            .iter()
            .filter(|p| {
                params
                    .college_id
                    .as_ref()
                    .map_or(true, |college| &p.college_id == college)
            })
            .cloned()
            .collect();
        if periods.is_empty() {
            return Err(ScheduleError::data_unavailable("no exam periods in scope"));
        }
        let start_times = grid.start_times();
        if start_times.is_empty() {
            return Err(ScheduleError::data_unavailable("no exam start times on the time grid"));
        }

        let room_capacity: HashMap<RoomId, u32> = data
            .rooms
            .iter()
            .map(|r| (r.room_id.clone(), r.capacity))
            .collect();

        let building_names: HashMap<&str, &str> = data
            .buildings
            .iter()
            .map(|b| (b.building_id.as_str(), b.name.as_str()))
            .collect();
        let room_building = data
            .rooms
            .iter()
            .map(|r| {
                let label = match building_names.get(r.building_id.as_str()) {
                    Some(name) => format!("{name} ({})", r.building_id),
                    None => UNKNOWN_BUILDING.to_string(),
                };
                (r.room_id.clone(), label)
            })
            .collect();

        let date_set: HashSet<NaiveDate> = dates.iter().copied().collect();
        let mut proctors_by_date: BTreeMap<NaiveDate, Vec<ProctorId>> = BTreeMap::new();
        for row in data.availability.iter().filter(|a| a.is_available()) {
            if !date_set.contains(&row.date) {
                continue;
            }
            let list = proctors_by_date.entry(row.date).or_default();
            if !list.contains(&row.proctor_id) {
                list.push(row.proctor_id.clone());
            }
        }

        let suitable_rooms = data
            .sections
            .iter()
            .map(|s| (s.modality_id.clone(), suitable_rooms_for(s, &data.rooms, preference)))
            .collect();

        let courses = group_by_course(&data.sections);

        debug!(
            courses = courses.len(),
            sections = data.sections.len(),
            dates = dates.len(),
            rooms = data.rooms.len(),
            periods = periods.len(),
            "reference snapshot loaded"
        );

        Ok(Self {
            courses,
            dates,
            start_times,
            duration: params.duration,
            room_capacity,
            room_building,
            proctors_by_date,
            suitable_rooms,
            periods,
        })
    }

    /// Number of courses (= genes per chromosome).
    #[inline]
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    /// Proctors available on `date`.
    pub fn proctors_on(&self, date: NaiveDate) -> &[ProctorId] {
        self.proctors_by_date
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rooms a section may be placed in.
    pub fn rooms_for(&self, modality_id: &str) -> &[RoomId] {
        self.suitable_rooms
            .get(modality_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Seating capacity of a room.
    pub fn capacity_of(&self, room_id: &str) -> Option<u32> {
        self.room_capacity.get(room_id).copied()
    }

    /// Building label of a room.
    pub fn building_label(&self, room_id: &str) -> &str {
        self.room_building
            .get(room_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_BUILDING)
    }

    /// First in-scope exam period containing `date`.
    pub fn period_for(&self, date: NaiveDate) -> Option<&ExamPeriod> {
        self.periods.iter().find(|p| p.contains(date))
    }
}

/// Candidate rooms for a section: capacity-sufficient possible rooms first,
/// then (policy permitting) every other capacity-sufficient room.
fn suitable_rooms_for(section: &ExamSection, rooms: &[Room], preference: RoomPreference) -> Vec<RoomId> {
    let enrolled = section.enrolled_students;
    let sufficient: Vec<&Room> = rooms.iter().filter(|r| r.fits(enrolled)).collect();

    let mut combined: Vec<RoomId> = Vec::new();
    for possible in &section.possible_rooms {
        if sufficient.iter().any(|r| &r.room_id == possible) && !combined.contains(possible) {
            combined.push(possible.clone());
        }
    }

    if preference == RoomPreference::PossibleOnly && !combined.is_empty() {
        return combined;
    }

    for room in sufficient {
        if !combined.contains(&room.room_id) {
            combined.push(room.room_id.clone());
        }
    }
    combined
}

fn group_by_course(sections: &[ExamSection]) -> Vec<CourseGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CourseGroup> = Vec::new();

    for section in sections {
        let idx = *index.entry(section.course_id.as_str()).or_insert_with(|| {
            groups.push(CourseGroup {
                course_id: section.course_id.clone(),
                sections: Vec::new(),
                cohorts: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].sections.push(section.clone());
    }

    for group in &mut groups {
        let cohorts: BTreeSet<Cohort> = group.sections.iter().map(ExamSection::cohort).collect();
        group.cohorts = cohorts.into_iter().collect();
    }
    groups
}
