//! Post-run schedule metrics.
//!
//! Computes load indicators from materialized sessions and re-scans them
//! for double-booking, independently of the fitness function that produced
//! them.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Sessions per date | Emitted sessions grouped by exam date |
//! | Rooms / proctors used | Distinct IDs across all sessions |
//! | Avg sessions per date | Mean over dates that hold any session |
//! | Room conflicts | Overlapping session pairs sharing a room |
//! | Proctor conflicts | Overlapping session pairs sharing a proctor |
//! | Cohort conflicts | Overlapping pairs of *different* courses sharing a cohort |

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::ExamSession;

/// Schedule indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleKpi {
    /// Total sessions.
    pub session_count: usize,
    /// Sessions per exam date.
    pub sessions_per_date: BTreeMap<NaiveDate, usize>,
    /// Distinct rooms used.
    pub rooms_used: usize,
    /// Distinct proctors used.
    pub proctors_used: usize,
    /// Mean sessions per used date.
    pub avg_sessions_per_date: f64,
    /// Overlapping pairs in one room.
    pub room_conflicts: usize,
    /// Overlapping pairs under one proctor.
    pub proctor_conflicts: usize,
    /// Overlapping pairs of different courses in one cohort.
    pub cohort_conflicts: usize,
}

impl ScheduleKpi {
    /// Computes indicators for a set of sessions.
    pub fn calculate(sessions: &[ExamSession]) -> Self {
        let mut sessions_per_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for s in sessions {
            *sessions_per_date.entry(s.exam_date).or_default() += 1;
        }

        let rooms_used = sessions.iter().map(|s| s.room_id.as_str()).collect::<HashSet<_>>().len();
        let proctors_used = sessions
            .iter()
            .map(|s| s.proctor_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let avg_sessions_per_date = if sessions_per_date.is_empty() {
            0.0
        } else {
            sessions.len() as f64 / sessions_per_date.len() as f64
        };

        let mut room_conflicts = 0;
        let mut proctor_conflicts = 0;
        let mut cohort_conflicts = 0;
        for (i, a) in sessions.iter().enumerate() {
            for b in &sessions[i + 1..] {
                if !a.overlaps(b) {
                    continue;
                }
                if a.room_id == b.room_id {
                    room_conflicts += 1;
                }
                if a.proctor_id == b.proctor_id {
                    proctor_conflicts += 1;
                }
                if a.course_id != b.course_id && a.cohort() == b.cohort() {
                    cohort_conflicts += 1;
                }
            }
        }

        Self {
            session_count: sessions.len(),
            sessions_per_date,
            rooms_used,
            proctors_used,
            avg_sessions_per_date,
            room_conflicts,
            proctor_conflicts,
            cohort_conflicts,
        }
    }

    /// Whether the re-scan found no double-booking.
    pub fn is_conflict_free(&self) -> bool {
        self.room_conflicts == 0 && self.proctor_conflicts == 0 && self.cohort_conflicts == 0
    }
}
