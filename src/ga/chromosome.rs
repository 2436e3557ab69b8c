//! Gene-per-course chromosome for exam timetabling.
//!
//! # Encoding
//!
//! A chromosome holds one [`Gene`] per course, in snapshot course order.
//! Each gene fixes the course's date and start time for all its sections,
//! plus two arrays parallel to the course's section list:
//! - **rooms**: the room each section sits in (`None` = no room)
//! - **proctors**: the proctor of each section (`None` = unassigned)
//!
//! Genes own their arrays, so `Clone` is a deep copy and recombined or
//! mutated children never alias a parent.

use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use rand::prelude::IndexedRandom;

use super::runner::Individual;
use crate::models::{minute_of_day, CourseId, ProctorId, RoomId};
use crate::snapshot::{CourseGroup, Snapshot};

/// Fitness of a chromosome that has not been evaluated yet.
pub const UNEVALUATED: u64 = u64::MAX;

/// One course's scheduling decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    /// Course this gene schedules.
    pub course_id: CourseId,
    /// Exam date.
    pub date: NaiveDate,
    /// Start time on the grid.
    pub start: NaiveTime,
    /// Room per section.
    pub rooms: Vec<Option<RoomId>>,
    /// Proctor per section.
    pub proctors: Vec<Option<ProctorId>>,
}

impl Gene {
    /// Creates a random gene for `course`.
    ///
    /// Date and start time are drawn uniformly from the snapshot; each
    /// section gets a uniform suitable room and a uniform proctor available
    /// on the drawn date.
    pub fn random<R: Rng>(course: &CourseGroup, snapshot: &Snapshot, rng: &mut R) -> Self {
        let date = pick_date(snapshot, rng);
        let start = pick_start(snapshot, rng);
        let proctors_today = snapshot.proctors_on(date);

        let rooms = course
            .sections
            .iter()
            .map(|s| snapshot.rooms_for(&s.modality_id).choose(rng).cloned())
            .collect();
        let proctors = course
            .sections
            .iter()
            .map(|_| proctors_today.choose(rng).cloned())
            .collect();

        Self {
            course_id: course.course_id.clone(),
            date,
            start,
            rooms,
            proctors,
        }
    }

    /// Occupied window `[start, end)` in minutes since midnight.
    #[inline]
    pub fn window(&self, duration_minutes: u32) -> (u32, u32) {
        let start = minute_of_day(self.start);
        (start, start + duration_minutes)
    }

    /// Whether every section has both a room and a proctor.
    pub fn is_resolved(&self) -> bool {
        self.rooms.iter().all(Option::is_some) && self.proctors.iter().all(Option::is_some)
    }
}

/// A complete candidate timetable.
///
/// Lower fitness = better timetable; 0 is conflict-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamChromosome {
    /// One gene per course.
    pub genes: Vec<Gene>,
    /// Penalty score ([`UNEVALUATED`] until evaluated).
    pub fitness: u64,
}

impl Individual for ExamChromosome {
    fn fitness(&self) -> u64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: u64) {
        self.fitness = fitness;
    }
}

impl ExamChromosome {
    /// Creates an unevaluated chromosome from genes.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            fitness: UNEVALUATED,
        }
    }

    /// Creates a random chromosome, one gene per snapshot course.
    pub fn random<R: Rng>(snapshot: &Snapshot, rng: &mut R) -> Self {
        let genes = snapshot
            .courses
            .iter()
            .map(|course| Gene::random(course, snapshot, rng))
            .collect();
        Self::new(genes)
    }

    /// Validates the shape against the snapshot: gene order matches course
    /// order and every array matches its course's section count.
    pub fn is_valid(&self, snapshot: &Snapshot) -> bool {
        self.genes.len() == snapshot.course_count()
            && self.genes.iter().zip(&snapshot.courses).all(|(gene, course)| {
                gene.course_id == course.course_id
                    && gene.rooms.len() == course.sections.len()
                    && gene.proctors.len() == course.sections.len()
            })
    }
}

/// Candidate dates are non-empty for any loaded snapshot.
fn pick_date<R: Rng>(snapshot: &Snapshot, rng: &mut R) -> NaiveDate {
    snapshot.dates.choose(rng).copied().unwrap_or_default()
}

/// Start times are non-empty for any loaded snapshot.
fn pick_start<R: Rng>(snapshot: &Snapshot, rng: &mut R) -> NaiveTime {
    snapshot.start_times.choose(rng).copied().unwrap_or_default()
}

/// Clamps a configured probability into `[0, 1]`; NaN becomes 0.
pub(crate) fn unit_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

// ======================== Crossover ========================

/// Uniform per-gene crossover.
///
/// For each position, with probability `bias` child 1 takes parent 1's
/// gene and child 2 takes parent 2's; otherwise they swap. Parents must
/// share gene count and course order. `bias` outside `[0, 1]` is clamped.
pub fn uniform_crossover<R: Rng>(
    p1: &ExamChromosome,
    p2: &ExamChromosome,
    bias: f64,
    rng: &mut R,
) -> (ExamChromosome, ExamChromosome) {
    let len = p1.genes.len().min(p2.genes.len());
    let mut c1 = Vec::with_capacity(len);
    let mut c2 = Vec::with_capacity(len);
    let bias = unit_probability(bias);

    for (g1, g2) in p1.genes.iter().zip(&p2.genes) {
        if rng.random_bool(bias) {
            c1.push(g1.clone());
            c2.push(g2.clone());
        } else {
            c1.push(g2.clone());
            c2.push(g1.clone());
        }
    }
    (ExamChromosome::new(c1), ExamChromosome::new(c2))
}

// ======================== Mutation operators ========================

/// Date mutation: moves the gene to a random candidate date and re-draws
/// every proctor from that date's availability.
pub fn date_mutation<R: Rng>(gene: &mut Gene, snapshot: &Snapshot, rng: &mut R) {
    gene.date = pick_date(snapshot, rng);
    let available = snapshot.proctors_on(gene.date);
    for proctor in &mut gene.proctors {
        *proctor = available.choose(rng).cloned();
    }
}

/// Time mutation: moves the gene to a random start time on the grid.
pub fn time_mutation<R: Rng>(gene: &mut Gene, snapshot: &Snapshot, rng: &mut R) {
    gene.start = pick_start(snapshot, rng);
}

/// Room mutation: re-draws one random section's room from its suitable
/// rooms. Sections without suitable rooms are left untouched.
pub fn room_mutation<R: Rng>(gene: &mut Gene, course: &CourseGroup, snapshot: &Snapshot, rng: &mut R) {
    let len = gene.rooms.len().min(course.sections.len());
    if len == 0 {
        return;
    }
    let idx = rng.random_range(0..len);
    if let Some(room) = snapshot.rooms_for(&course.sections[idx].modality_id).choose(rng) {
        gene.rooms[idx] = Some(room.clone());
    }
}

/// Proctor mutation: re-draws one random section's proctor from those
/// available on the gene's date. No-op when nobody is available.
pub fn proctor_mutation<R: Rng>(gene: &mut Gene, snapshot: &Snapshot, rng: &mut R) {
    if gene.proctors.is_empty() {
        return;
    }
    let idx = rng.random_range(0..gene.proctors.len());
    if let Some(proctor) = snapshot.proctors_on(gene.date).choose(rng) {
        gene.proctors[idx] = Some(proctor.clone());
    }
}
