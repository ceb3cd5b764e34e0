//! Calendar helpers shared by the dashboard and the session editor.
//!
//! Stored dates are local calendar days (`YYYY-MM-DD`). They are never
//! interpreted as UTC instants, so a session logged late in the evening
//! stays on the day it was logged.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};

pub fn parse_stored_date(value: &str) -> Result<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| AppError::BadRequest(format!("invalid date '{}': {}", value, e)))
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/mm`
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Monday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

/// Calendar event title, e.g. `Workout 6:05 PM`, in local time.
pub fn calendar_title(created_at: DateTime<Utc>) -> String {
    format!(
        "Workout {}",
        created_at.with_timezone(&Local).format("%-I:%M %p")
    )
}

/// Consistency badges shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    pub streak: u32,
    pub this_week: u32,
    pub this_month: u32,
    pub this_year: u32,
}

impl ActivitySummary {
    pub fn from_dates<I>(dates: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let days: BTreeSet<NaiveDate> = dates.into_iter().collect();
        if days.is_empty() {
            return Self::default();
        }

        let count_since = |start: NaiveDate| days.range(start..).count() as u32;

        Self {
            streak: streak(&days, today),
            this_week: count_since(start_of_week(today)),
            this_month: count_since(start_of_month(today)),
            this_year: count_since(start_of_year(today)),
        }
    }
}

// A missing session today does not break the streak; counting starts from
// yesterday instead.
fn streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}
