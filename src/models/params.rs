//! Run parameters supplied once per scheduling request.
//!
//! Replaces the ambient "currently selected" form state of an interactive
//! client with one explicit value passed into the core.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Exam length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamDuration {
    /// Whole hours.
    pub hours: u32,
    /// Additional minutes.
    pub minutes: u32,
}

impl ExamDuration {
    /// Creates a duration.
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }

    /// Total length in minutes.
    #[inline]
    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }

    /// Label persisted with each session, e.g. `"1h 30m"`.
    pub fn label(&self) -> String {
        format!("{}h {}m", self.hours, self.minutes)
    }
}

impl Default for ExamDuration {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Fixed grid of legal exam start times.
///
/// Defaults to 07:00 through 20:30 in 30-minute steps (28 start times).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrid {
    /// First legal start time.
    pub first: NaiveTime,
    /// Last legal start time (inclusive).
    pub last: NaiveTime,
    /// Step between start times, in minutes.
    pub step_minutes: u32,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            first: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
            last: NaiveTime::from_hms_opt(20, 30, 0).unwrap_or_default(),
            step_minutes: 30,
        }
    }
}

impl TimeGrid {
    /// Creates a grid.
    pub fn new(first: NaiveTime, last: NaiveTime, step_minutes: u32) -> Self {
        Self {
            first,
            last,
            step_minutes,
        }
    }

    /// All start times on the grid, ascending.
    ///
    /// Empty when the step is zero or `first > last`.
    pub fn start_times(&self) -> Vec<NaiveTime> {
        if self.step_minutes == 0 {
            return Vec::new();
        }
        let first = minute_of_day(self.first);
        let last = minute_of_day(self.last);
        (first..=last)
            .step_by(self.step_minutes as usize)
            .filter_map(|m| NaiveTime::from_num_seconds_from_midnight_opt(m * 60, 0))
            .collect()
    }
}

/// Minutes since midnight.
#[inline]
pub(crate) fn minute_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Academic year and semester labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicTerm {
    /// e.g. "2024-2025".
    pub academic_year: Option<String>,
    /// e.g. "1st Semester".
    pub semester: Option<String>,
}

impl AcademicTerm {
    /// Creates a term from explicit labels.
    pub fn new(academic_year: impl Into<String>, semester: impl Into<String>) -> Self {
        Self {
            academic_year: Some(academic_year.into()),
            semester: Some(semester.into()),
        }
    }

    /// Parses a combined `"year | semester"` selector value.
    ///
    /// Each part is trimmed; empty parts become `None`.
    ///
    /// ```
    /// use u_examsched::models::AcademicTerm;
    ///
    /// let t = AcademicTerm::parse("2024-2025 | 2nd Semester");
    /// assert_eq!(t.academic_year.as_deref(), Some("2024-2025"));
    /// assert_eq!(t.semester.as_deref(), Some("2nd Semester"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('|').map(str::trim);
        let non_empty = |s: Option<&str>| s.filter(|p| !p.is_empty()).map(str::to_string);
        let academic_year = non_empty(parts.next());
        let semester = non_empty(parts.next());
        Self {
            academic_year,
            semester,
        }
    }
}

/// Everything the caller selects for one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Candidate exam dates.
    pub exam_dates: Vec<NaiveDate>,
    /// Exam length.
    pub duration: ExamDuration,
    /// Academic term labels copied onto every session.
    #[serde(default)]
    pub term: AcademicTerm,
    /// Exam category label (e.g. "Midterm").
    #[serde(default)]
    pub exam_category: Option<String>,
    /// When set, only exam periods of this college are in scope.
    #[serde(default)]
    pub college_id: Option<String>,
}

impl RunParameters {
    /// Creates parameters for the given candidate dates.
    pub fn new(exam_dates: Vec<NaiveDate>) -> Self {
        Self {
            exam_dates,
            ..Self::default()
        }
    }

    /// Sets the exam duration.
    pub fn with_duration(mut self, duration: ExamDuration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the academic term.
    pub fn with_term(mut self, term: AcademicTerm) -> Self {
        self.term = term;
        self
    }

    /// Sets the exam category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.exam_category = Some(category.into());
        self
    }

    /// Restricts exam periods to one college.
    pub fn with_college(mut self, college_id: impl Into<String>) -> Self {
        self.college_id = Some(college_id.into());
        self
    }

    /// Candidate dates, sorted and de-duplicated.
    pub fn sorted_dates(&self) -> Vec<NaiveDate> {
        let mut dates = self.exam_dates.clone();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Human label of the selected range, e.g. `"May 5, 2025 - May 9, 2025"`.
    pub fn period_label(&self) -> String {
        let dates = self.sorted_dates();
        let fmt = |d: &NaiveDate| d.format("%B %-d, %Y").to_string();
        match (dates.first(), dates.last()) {
            (Some(first), Some(last)) if first != last => format!("{} - {}", fmt(first), fmt(last)),
            (Some(only), _) => fmt(only),
            _ => String::new(),
        }
    }
}
