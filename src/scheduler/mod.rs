//! Exam scheduling pipeline, materialization and KPI evaluation.
//!
//! # Pipeline
//!
//! 1. Validate configuration and the caller's selections.
//! 2. Load a run-scoped [`Snapshot`] from the reference data.
//! 3. Evolve timetables with [`GaRunner`] until a zero score, the
//!    generation budget, or cancellation.
//! 4. Materialize the best-ever chromosome into sessions plus an
//!    unscheduled report.
//! 5. Optionally hand the sessions to a [`SessionStore`] in one bulk write.
//!
//! Steps 1–2 fail fast with [`ScheduleError`]; courses that cannot be
//! placed are reported in [`ScheduleOutcome::unscheduled`] instead.
//!
//! # KPI
//!
//! [`ScheduleKpi`] re-scans emitted sessions for room, proctor and cohort
//! double-booking and reports load per date.

mod kpi;
mod materialize;
mod store;

pub use kpi::ScheduleKpi;
pub use materialize::materialize;
pub use store::{InMemorySessionStore, InMemoryStoreError, SessionStore};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::ScheduleError;
use crate::ga::{
    CancelToken, ExamGaProblem, FitnessBreakdown, GaConfig, GaRunner, PenaltyWeights, Termination,
};
use crate::models::{ExamSection, ExamSession, RunParameters, TimeGrid, UnscheduledCourse};
use crate::snapshot::{ReferenceData, RoomPreference, Snapshot};
use crate::validation::{validate_config, validate_input, validate_snapshot};

/// Everything tunable about a scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// GA parameters.
    pub ga: GaConfig,
    /// Violation weights.
    pub weights: PenaltyWeights,
    /// Legal start times.
    pub time_grid: TimeGrid,
    /// How candidate rooms are drawn.
    pub room_preference: RoomPreference,
}

impl SchedulerConfig {
    /// Sets the GA parameters.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Sets the violation weights.
    pub fn with_weights(mut self, weights: PenaltyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the start-time grid.
    pub fn with_time_grid(mut self, time_grid: TimeGrid) -> Self {
        self.time_grid = time_grid;
        self
    }

    /// Sets the room preference policy.
    pub fn with_room_preference(mut self, preference: RoomPreference) -> Self {
        self.room_preference = preference;
        self
    }
}

/// Result of one scheduling run.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleOutcome {
    /// Sessions ready for persistence.
    pub sessions: Vec<ExamSession>,
    /// Courses left out, with the first blocking reason.
    pub unscheduled: Vec<UnscheduledCourse>,
    /// Penalty of the materialized chromosome (0 = no violation).
    pub best_fitness: u64,
    /// Violation counts behind `best_fitness`.
    pub breakdown: FitnessBreakdown,
    /// Generations evaluated, including the initial population.
    pub generations: usize,
    /// Why the search stopped.
    pub termination: Termination,
}

impl ScheduleOutcome {
    /// Whether every course was scheduled.
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }
}

/// Exam timetabling façade.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_examsched::models::{ExamPeriod, ExamSection, ProctorAvailability, Room, RunParameters};
/// use u_examsched::scheduler::{ExamScheduler, SchedulerConfig};
/// use u_examsched::snapshot::ReferenceData;
/// use u_examsched::ga::GaConfig;
///
/// let day = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
/// let data = ReferenceData {
///     sections: vec![ExamSection::new("S1", "IT101", "BSIT", "BSIT 1A").with_enrolled(30)],
///     rooms: vec![Room::new("R1", 40, "B1")],
///     buildings: vec![],
///     availability: vec![ProctorAvailability::available("U1", day)],
///     exam_periods: vec![ExamPeriod::new("EP1", day, day, "CITC")],
/// };
///
/// let config = SchedulerConfig::default().with_ga(GaConfig::default().with_seed(7));
/// let outcome = ExamScheduler::new(config)
///     .schedule(&data, &RunParameters::new(vec![day]))
///     .unwrap();
/// assert_eq!(outcome.sessions.len(), 1);
/// assert_eq!(outcome.best_fitness, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExamScheduler {
    config: SchedulerConfig,
    cancel: CancelToken,
}

impl ExamScheduler {
    /// Creates a scheduler.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Attaches a cancellation token polled once per generation.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Runs the full pipeline without persisting.
    ///
    /// # Errors
    /// [`ScheduleError::Validation`] for bad selections or configuration,
    /// [`ScheduleError::DataUnavailable`] when the reference data cannot
    /// support a search.
    #[instrument(skip_all, fields(sections = data.sections.len(), dates = params.exam_dates.len()))]
    pub fn schedule(
        &self,
        data: &ReferenceData,
        params: &RunParameters,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        validate_config(&self.config).map_err(ScheduleError::Validation)?;
        validate_input(&data.sections, params).map_err(ScheduleError::Validation)?;

        let snapshot = Snapshot::load_with(
            data,
            params,
            self.config.room_preference,
            &self.config.time_grid,
        )?;
        Ok(self.evolve(&snapshot, params))
    }

    /// Runs on an already loaded snapshot.
    ///
    /// # Errors
    /// [`ScheduleError::Validation`] for an unusable config or selection, or
    /// when the snapshot was loaded with other dates or another duration
    /// than `params` carry.
    pub fn schedule_snapshot(
        &self,
        snapshot: &Snapshot,
        params: &RunParameters,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        validate_config(&self.config).map_err(ScheduleError::Validation)?;
        let sections: Vec<ExamSection> = snapshot
            .courses
            .iter()
            .flat_map(|c| c.sections.iter().cloned())
            .collect();
        let mut errors = validate_input(&sections, params).err().unwrap_or_default();
        errors.extend(validate_snapshot(snapshot, params).err().unwrap_or_default());
        if !errors.is_empty() {
            return Err(ScheduleError::Validation(errors));
        }
        Ok(self.evolve(snapshot, params))
    }

    /// Runs the pipeline and commits resolved sessions in one bulk write.
    ///
    /// The store is not called when no session resolved.
    ///
    /// # Errors
    /// As [`Self::schedule`], plus [`ScheduleError::Persistence`] carrying
    /// the store's rejection.
    pub fn schedule_and_persist<S: SessionStore>(
        &self,
        data: &ReferenceData,
        params: &RunParameters,
        store: &mut S,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        let outcome = self.schedule(data, params)?;
        if outcome.sessions.is_empty() {
            warn!("no session resolved; nothing persisted");
            return Ok(outcome);
        }
        store
            .insert_all(&outcome.sessions)
            .map_err(|e| ScheduleError::Persistence(Box::new(e)))?;
        info!(sessions = outcome.sessions.len(), "sessions persisted");
        Ok(outcome)
    }

    fn evolve(&self, snapshot: &Snapshot, params: &RunParameters) -> ScheduleOutcome {
        let ga = &self.config.ga;
        info!(
            courses = snapshot.course_count(),
            dates = snapshot.dates.len(),
            population = ga.population_size,
            max_generations = ga.max_generations,
            "scheduling run started"
        );

        let problem = ExamGaProblem::new(snapshot, self.config.weights.clone()).with_config(ga);
        let mut rng = match ga.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let result = GaRunner::run_with(&problem, ga, &mut rng, &self.cancel);

        let breakdown = problem.breakdown(&result.best);
        let (sessions, unscheduled) = materialize(&result.best, snapshot, params);

        info!(
            fitness = result.best_fitness,
            generations = result.generations,
            termination = ?result.termination,
            sessions = sessions.len(),
            unscheduled = unscheduled.len(),
            "scheduling run finished"
        );

        ScheduleOutcome {
            sessions,
            unscheduled,
            best_fitness: result.best_fitness,
            breakdown,
            generations: result.generations,
            termination: result.termination,
        }
    }
}

/// Schedules a loaded snapshot with the default configuration.
///
/// # Errors
/// [`ScheduleError::Validation`] when `params` select nothing schedulable
/// or disagree with the snapshot's dates or duration.
pub fn schedule(snapshot: &Snapshot, params: &RunParameters) -> Result<ScheduleOutcome, ScheduleError> {
    ExamScheduler::default().schedule_snapshot(snapshot, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::chromosome_fixtures::{d, sample_snapshot};
    use crate::models::{ExamDuration, ExamPeriod, ProctorAvailability, Room, UnscheduledReason};
    use crate::validation::ValidationErrorKind;

    fn seeded() -> ExamScheduler {
        ExamScheduler::new(SchedulerConfig::default().with_ga(GaConfig::default().with_seed(42)))
    }

    fn sample_data() -> ReferenceData {
        ReferenceData {
            sections: vec![
                ExamSection::new("S1", "C1", "P1", "1A").with_enrolled(30),
                ExamSection::new("S2", "C2", "P1", "2A").with_enrolled(20),
            ],
            rooms: vec![Room::new("R1", 40, "B1"), Room::new("R2", 40, "B1")],
            buildings: vec![],
            availability: vec![
                ProctorAvailability::available("U1", d(5)),
                ProctorAvailability::available("U2", d(5)),
            ],
            exam_periods: vec![ExamPeriod::new("EP1", d(1), d(10), "CITC")],
        }
    }

    #[test]
    fn test_schedule_resolves_every_course() {
        let outcome = seeded()
            .schedule(&sample_data(), &RunParameters::new(vec![d(5)]))
            .unwrap();
        assert_eq!(outcome.best_fitness, 0);
        assert!(outcome.is_complete());
        assert_eq!(outcome.sessions.len(), 2);
        assert_eq!(outcome.termination, Termination::PerfectScore);
        assert!(ScheduleKpi::calculate(&outcome.sessions).is_conflict_free());
    }

    #[test]
    fn test_validation_runs_before_search() {
        let err = seeded()
            .schedule(&sample_data(), &RunParameters::new(vec![]))
            .unwrap_err();
        let kinds: Vec<_> = err.validation_errors().unwrap().iter().map(|e| e.kind.clone()).collect();
        assert_eq!(kinds, vec![ValidationErrorKind::NoExamDates]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let scheduler = ExamScheduler::new(
            SchedulerConfig::default().with_ga(GaConfig::default().with_population_size(1)),
        );
        let err = scheduler
            .schedule(&sample_data(), &RunParameters::new(vec![d(5)]))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
    }

    #[test]
    fn test_no_rooms_is_data_unavailable() {
        let mut data = sample_data();
        data.rooms.clear();
        let err = seeded().schedule(&data, &RunParameters::new(vec![d(5)])).unwrap_err();
        assert!(matches!(err, ScheduleError::DataUnavailable { .. }));
    }

    #[test]
    fn test_pre_cancelled_returns_initial_best() {
        let token = CancelToken::new();
        token.cancel();
        let mut data = sample_data();
        // No proctors: the search cannot reach zero, so only cancellation stops it early.
        data.availability.clear();

        let outcome = seeded()
            .with_cancel(token)
            .schedule(&data, &RunParameters::new(vec![d(5)]))
            .unwrap();
        assert_eq!(outcome.termination, Termination::Cancelled);
        assert_eq!(outcome.generations, 1);
        assert!(outcome
            .unscheduled
            .iter()
            .all(|u| u.reason == UnscheduledReason::NoProctor));
    }

    #[test]
    fn test_free_schedule_on_snapshot() {
        let snap = sample_snapshot();
        let params = RunParameters::new(vec![d(5), d(6)]);
        let outcome = schedule(&snap, &params).unwrap();
        // Every course is either emitted or reported.
        let emitted: std::collections::HashSet<_> =
            outcome.sessions.iter().map(|s| s.course_id.as_str()).collect();
        assert_eq!(emitted.len() + outcome.unscheduled.len(), snap.course_count());
    }

    #[test]
    fn test_schedule_snapshot_rejects_zero_duration() {
        let snap = sample_snapshot();
        let params = RunParameters::new(vec![d(5)]).with_duration(ExamDuration::new(0, 0));
        let err = seeded().schedule_snapshot(&snap, &params).unwrap_err();
        assert!(err
            .validation_errors()
            .unwrap()
            .iter()
            .any(|e| e.kind == ValidationErrorKind::ZeroDuration));
    }

    #[test]
    fn test_schedule_snapshot_rejects_zero_snapshot_duration() {
        let mut snap = sample_snapshot();
        snap.duration = ExamDuration::new(0, 0);
        let params = RunParameters::new(vec![d(5), d(6)]);
        let err = schedule(&snap, &params).unwrap_err();
        let kinds: Vec<_> = err.validation_errors().unwrap().iter().map(|e| e.kind.clone()).collect();
        assert!(kinds.contains(&ValidationErrorKind::ZeroDuration));
        assert!(kinds.contains(&ValidationErrorKind::SnapshotMismatch));
    }

    #[test]
    fn test_schedule_snapshot_rejects_mismatched_params() {
        let snap = sample_snapshot();

        let other_dates = RunParameters::new(vec![d(5), d(7)]);
        let err = schedule(&snap, &other_dates).unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap()[0].kind,
            ValidationErrorKind::SnapshotMismatch
        );

        let other_duration = RunParameters::new(vec![d(6), d(5)]).with_duration(ExamDuration::new(2, 0));
        let err = schedule(&snap, &other_duration).unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap()[0].kind,
            ValidationErrorKind::SnapshotMismatch
        );
    }

    #[test]
    fn test_persist_writes_once() {
        let mut store = InMemorySessionStore::new();
        let outcome = seeded()
            .schedule_and_persist(&sample_data(), &RunParameters::new(vec![d(5)]), &mut store)
            .unwrap();
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.sessions(), outcome.sessions.as_slice());
    }

    #[test]
    fn test_config_deserializes_partial() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"ga": {"seed": 9}, "room_preference": "possible_only"}"#).unwrap();
        assert_eq!(config.ga.seed, Some(9));
        assert_eq!(config.ga.population_size, 60);
        assert_eq!(config.room_preference, RoomPreference::PossibleOnly);
        assert_eq!(config.weights, PenaltyWeights::default());
    }
}
