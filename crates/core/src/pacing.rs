use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::model::Snapshot;

//
// ─── CALENDAR ──────────────────────────────────────────────────────────────────
//

/// Gregorian leap-year rule.
#[must_use]
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// 1-based ordinal of `date` within its year (January 1st is 1).
#[must_use]
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// 365, or 366 in leap years.
#[must_use]
pub fn days_in_year(date: NaiveDate) -> u32 {
    if is_leap_year(date.year()) { 366 } else { 365 }
}

//
// ─── SCHEDULE ──────────────────────────────────────────────────────────────────
//

/// Where the reader stands relative to a linear pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleStatus {
    Ahead,
    Behind,
    OnTrack,
}

/// Result of comparing a read count against the pace target for a day.
///
/// # Fields
///
/// * `expected_to_date` - articles the goal calls for by the end of today
/// * `delta` - absolute distance between the count and the target
/// * `status` - sign of `current - expected_to_date`
///
/// # Examples
///
/// ```
/// # use challenge_core::pacing::{compute_schedule, ScheduleStatus};
/// # use chrono::NaiveDate;
/// let today = NaiveDate::from_ymd_opt(2024, 4, 9).unwrap(); // day 100
/// let schedule = compute_schedule(365, 120, today);
/// assert_eq!(schedule.expected_to_date, 100);
/// assert_eq!(schedule.status, ScheduleStatus::Ahead);
/// assert_eq!(schedule.delta, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleComparison {
    pub expected_to_date: u32,
    pub delta: u32,
    pub status: ScheduleStatus,
}

impl ScheduleComparison {
    /// Pace target as a share of the goal, rounded to a whole percent.
    #[must_use]
    pub fn expected_percent(&self, goal: u32) -> u32 {
        progress_percent(self.expected_to_date, goal)
    }

    /// Human-readable status line, e.g. "20 articles ahead of schedule".
    #[must_use]
    pub fn summary(&self) -> String {
        let noun = if self.delta == 1 { "article" } else { "articles" };
        match self.status {
            ScheduleStatus::Ahead => format!("{} {noun} ahead of schedule", self.delta),
            ScheduleStatus::Behind => format!("{} {noun} behind schedule", self.delta),
            ScheduleStatus::OnTrack => "right on schedule".to_string(),
        }
    }
}

/// Articles the goal calls for by the end of `today`.
///
/// `round(goal / days_in_year * day_of_year)`, halves rounding up. A goal of
/// zero yields zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn expected_to_date(goal: u32, today: NaiveDate) -> u32 {
    let per_day = f64::from(goal) / f64::from(days_in_year(today));
    let expected = (per_day * f64::from(day_of_year(today))).round();
    (expected as u32).min(goal)
}

/// Compare `current` against the linear pace for `today`.
///
/// Pure: never reads the system clock.
#[must_use]
pub fn compute_schedule(goal: u32, current: u32, today: NaiveDate) -> ScheduleComparison {
    let expected = expected_to_date(goal, today);
    let status = match current.cmp(&expected) {
        std::cmp::Ordering::Greater => ScheduleStatus::Ahead,
        std::cmp::Ordering::Less => ScheduleStatus::Behind,
        std::cmp::Ordering::Equal => ScheduleStatus::OnTrack,
    };
    ScheduleComparison {
        expected_to_date: expected,
        delta: current.abs_diff(expected),
        status,
    }
}

/// `round(current / goal * 100)`; zero when the goal is zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn progress_percent(current: u32, goal: u32) -> u32 {
    if goal == 0 {
        return 0;
    }
    (f64::from(current) / f64::from(goal) * 100.0).round() as u32
}

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

/// Everything a progress display needs for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub year: i32,
    pub goal: u32,
    pub current: u32,
    pub percent: u32,
    pub schedule: ScheduleComparison,
}

impl ProgressReport {
    #[must_use]
    pub fn new(snapshot: &Snapshot, today: NaiveDate) -> Self {
        let goal = snapshot.goal();
        let current = snapshot.current_count();
        Self {
            year: today.year(),
            goal,
            current,
            percent: progress_percent(current, goal),
            schedule: compute_schedule(goal, current, today),
        }
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.year)?;
        writeln!(
            f,
            "{} / {} ({}%) articles read",
            self.current, self.goal, self.percent
        )?;
        writeln!(
            f,
            "Pace target: {} ({}%)",
            self.schedule.expected_to_date,
            self.schedule.expected_percent(self.goal)
        )?;
        write!(f, "You're {}.", self.schedule.summary())
    }
}
