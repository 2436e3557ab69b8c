//! Penalty-based fitness for exam timetables.
//!
//! Every gene occupies the half-open window `[start, start + duration)` on
//! its date. Claims on rooms, proctors and cohorts are collected per date
//! and every overlapping pair of claims on the same key is penalized.
//! Two windows overlap iff `start_a < end_b && end_a > start_b`.
//!
//! | Violation | Default weight |
//! |-----------|----------------|
//! | Section without room | 1500 |
//! | Room too small | 300 |
//! | Room double-booked (per pair) | 200 |
//! | Cohort double-booked (per pair) | 200 |
//! | Section without proctor | 800 |
//! | Proctor double-booked (per pair) | 150 |
//! | Cohort back-to-back (per pair) | 80 |
//! | Date imbalance (per course off the ideal band) | 30 |

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::chromosome::ExamChromosome;
use crate::models::Cohort;
use crate::snapshot::Snapshot;

/// Relative weights of each violation.
///
/// Exact values are tunable; hard violations (missing assignments,
/// double-booking) must stay well above the date-imbalance weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Section has no room.
    pub missing_room: u64,
    /// Room capacity below enrolment.
    pub insufficient_capacity: u64,
    /// Room claimed by two overlapping windows.
    pub room_conflict: u64,
    /// Cohort claimed by two overlapping genes.
    pub cohort_conflict: u64,
    /// Section has no proctor.
    pub missing_proctor: u64,
    /// Proctor claimed by two overlapping windows.
    pub proctor_conflict: u64,
    /// Cohort has one exam ending exactly when another starts.
    pub back_to_back: u64,
    /// Per course of deviation from the ideal courses-per-date band.
    pub date_imbalance: u64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            missing_room: 1500,
            insufficient_capacity: 300,
            room_conflict: 200,
            cohort_conflict: 200,
            missing_proctor: 800,
            proctor_conflict: 150,
            back_to_back: 80,
            date_imbalance: 30,
        }
    }
}

impl PenaltyWeights {
    /// Smallest weight among the non-distribution violations.
    pub fn hard_floor(&self) -> u64 {
        [
            self.missing_room,
            self.insufficient_capacity,
            self.room_conflict,
            self.cohort_conflict,
            self.missing_proctor,
            self.proctor_conflict,
            self.back_to_back,
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
}

/// Violation counts behind a fitness score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FitnessBreakdown {
    /// Sections without a room.
    pub missing_rooms: u64,
    /// Sections in a room that is too small or unknown.
    pub insufficient_capacity: u64,
    /// Overlapping pairs of claims on one room.
    pub room_conflicts: u64,
    /// Overlapping pairs of genes sharing a cohort.
    pub cohort_conflicts: u64,
    /// Sections without a proctor.
    pub missing_proctors: u64,
    /// Overlapping pairs of claims on one proctor.
    pub proctor_conflicts: u64,
    /// Adjacent (end == start) pairs of genes sharing a cohort.
    pub back_to_back: u64,
    /// Sum over dates of the distance to the ideal courses-per-date band.
    pub date_imbalance: u64,
}

impl FitnessBreakdown {
    /// Weighted total.
    pub fn penalty(&self, w: &PenaltyWeights) -> u64 {
        self.missing_rooms * w.missing_room
            + self.insufficient_capacity * w.insufficient_capacity
            + self.room_conflicts * w.room_conflict
            + self.cohort_conflicts * w.cohort_conflict
            + self.missing_proctors * w.missing_proctor
            + self.proctor_conflicts * w.proctor_conflict
            + self.back_to_back * w.back_to_back
            + self.date_imbalance * w.date_imbalance
    }

    /// No room, proctor or cohort is double-booked and every section is staffed.
    pub fn is_conflict_free(&self) -> bool {
        self.missing_rooms == 0
            && self.missing_proctors == 0
            && self.room_conflicts == 0
            && self.proctor_conflicts == 0
            && self.cohort_conflicts == 0
    }
}

type Window = (u32, u32);

#[inline]
fn overlaps(a: Window, b: Window) -> bool {
    a.0 < b.1 && a.1 > b.0
}

#[inline]
fn adjacent(a: Window, b: Window) -> bool {
    a.0 == b.1 || b.0 == a.1
}

fn overlapping_pairs(windows: &[Window]) -> u64 {
    let mut count = 0;
    for (i, &a) in windows.iter().enumerate() {
        for &b in &windows[i + 1..] {
            if overlaps(a, b) {
                count += 1;
            }
        }
    }
    count
}

/// Counts every violation in `chromosome`.
///
/// Genes are matched to snapshot courses by position; arrays shorter than
/// the course's section list count the missing entries as unassigned.
pub fn breakdown(chromosome: &ExamChromosome, snapshot: &Snapshot) -> FitnessBreakdown {
    let duration = snapshot.duration.total_minutes();
    let mut b = FitnessBreakdown::default();

    let mut room_claims: HashMap<(NaiveDate, &str), Vec<Window>> = HashMap::new();
    let mut proctor_claims: HashMap<(NaiveDate, &str), Vec<Window>> = HashMap::new();
    let mut cohort_claims: HashMap<(NaiveDate, &Cohort), Vec<Window>> = HashMap::new();
    let mut per_date: HashMap<NaiveDate, u64> = HashMap::new();

    for (gene, course) in chromosome.genes.iter().zip(&snapshot.courses) {
        let window = gene.window(duration);
        *per_date.entry(gene.date).or_insert(0) += 1;

        for cohort in &course.cohorts {
            cohort_claims.entry((gene.date, cohort)).or_default().push(window);
        }

        for (idx, section) in course.sections.iter().enumerate() {
            match gene.rooms.get(idx).and_then(Option::as_deref) {
                None => b.missing_rooms += 1,
                Some(room) => {
                    let fits = snapshot
                        .capacity_of(room)
                        .is_some_and(|cap| cap >= section.enrolled_students);
                    if !fits {
                        b.insufficient_capacity += 1;
                    }
                    room_claims.entry((gene.date, room)).or_default().push(window);
                }
            }

            match gene.proctors.get(idx).and_then(Option::as_deref) {
                None => b.missing_proctors += 1,
                Some(proctor) => {
                    proctor_claims.entry((gene.date, proctor)).or_default().push(window);
                }
            }
        }
    }

    b.room_conflicts = room_claims.values().map(|w| overlapping_pairs(w)).sum();
    b.proctor_conflicts = proctor_claims.values().map(|w| overlapping_pairs(w)).sum();

    for windows in cohort_claims.values() {
        b.cohort_conflicts += overlapping_pairs(windows);
        for (i, &x) in windows.iter().enumerate() {
            for &y in &windows[i + 1..] {
                if adjacent(x, y) {
                    b.back_to_back += 1;
                }
            }
        }
    }

    let counts = snapshot.dates.iter().map(|d| per_date.get(d).copied().unwrap_or(0));
    b.date_imbalance = date_imbalance(chromosome.genes.len() as u64, counts);

    b
}

/// Distance of each date's course count from `[floor(ideal), ceil(ideal)]`,
/// where `ideal = courses / dates`.
fn date_imbalance(courses: u64, counts: impl ExactSizeIterator<Item = u64>) -> u64 {
    let dates = counts.len() as u64;
    if dates == 0 {
        return 0;
    }
    let low = courses / dates;
    let high = courses.div_ceil(dates);
    counts
        .map(|c| {
            if c < low {
                low - c
            } else {
                c.saturating_sub(high)
            }
        })
        .sum()
}

/// Weighted penalty of `chromosome`; 0 means conflict-free and balanced.
pub fn evaluate(chromosome: &ExamChromosome, snapshot: &Snapshot, weights: &PenaltyWeights) -> u64 {
    breakdown(chromosome, snapshot).penalty(weights)
}
