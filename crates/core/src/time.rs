use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, TimeZone, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
///
/// Calendar questions (today's date, the start of the year) are answered in
/// the user's time zone: the system zone for `Default`, the stored offset for
/// `Fixed`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<FixedOffset>),
}

impl Clock {
    /// Returns a clock that uses the current system time and zone.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp, observed from UTC.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at.fixed_offset())
    }

    /// Returns a clock fixed at the given timestamp in its own offset.
    #[must_use]
    pub fn fixed_local(at: DateTime<FixedOffset>) -> Self {
        Self::Fixed(at)
    }

    /// Calendar date in the clock's zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Default => Local::now().date_naive(),
            Clock::Fixed(t) => t.date_naive(),
        }
    }

    /// Local midnight on January 1st of the current year, as a UTC instant.
    #[must_use]
    pub fn year_start(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => start_of_year(&Local::now()),
            Clock::Fixed(t) => start_of_year(t),
        }
    }
}

/// Midnight on January 1st of the year containing `at`, in `at`'s own zone.
#[must_use]
pub fn start_of_year<Tz: TimeZone>(at: &DateTime<Tz>) -> DateTime<Utc> {
    at.timezone()
        .with_ymd_and_hms(at.year(), 1, 1, 0, 0, 0)
        .earliest()
        .map_or_else(|| at.with_timezone(&Utc), |start| start.with_timezone(&Utc))
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}
