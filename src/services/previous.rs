//! Previous performance for an exercise: the baseline volume and the
//! placeholders offered for new set inputs.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::models::WorkoutSet;
use crate::repositories::Repositories;
use crate::services::dates::format_short_date;
use crate::services::volume::format_volume;

pub const WEIGHT_PLACEHOLDER: &str = "kg";
pub const REPS_PLACEHOLDER: &str = "reps";

/// The most recent other session that included the exercise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Baseline {
    pub session_id: i64,
    pub date: NaiveDate,
    pub volume: f64,
    pub sets: Vec<WorkoutSet>,
}

impl Baseline {
    /// `"<volume> - dd/mm"`
    pub fn display(&self) -> String {
        format!(
            "{} - {}",
            format_volume(self.volume),
            format_short_date(self.date)
        )
    }
}

/// Shown in the previous-volume column; "N/A" unless a baseline with
/// positive volume exists.
pub fn previous_volume_display(baseline: Option<&Baseline>) -> String {
    match baseline {
        Some(baseline) if baseline.volume > 0.0 => baseline.display(),
        _ => "N/A".to_string(),
    }
}

/// Two sequential queries: the latest qualifying session, then its sets for
/// the exercise.
pub async fn load_baseline(
    repos: &Repositories,
    exercise_id: i64,
    exclude_session: Option<i64>,
) -> Result<Option<Baseline>> {
    let session = match repos
        .sets
        .find_latest_session_with_exercise(exercise_id, exclude_session)
        .await?
    {
        Some(session) => session,
        None => return Ok(None),
    };

    let sets = repos
        .sets
        .find_for_session_exercise(session.id, exercise_id)
        .await?;
    let volume = sets.iter().map(|set| set.volume).sum();

    Ok(Some(Baseline {
        session_id: session.id,
        date: session.date,
        volume,
        sets,
    }))
}

/// One weight/reps input pair as the editor presents it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetInput {
    pub weight: String,
    pub reps: String,
    pub weight_placeholder: String,
    pub reps_placeholder: String,
}

impl SetInput {
    pub fn empty() -> Self {
        Self::placeholder(WEIGHT_PLACEHOLDER.to_string(), REPS_PLACEHOLDER.to_string())
    }

    pub fn placeholder(weight_placeholder: String, reps_placeholder: String) -> Self {
        Self {
            weight: String::new(),
            reps: String::new(),
            weight_placeholder,
            reps_placeholder,
        }
    }

    fn recorded(set: &WorkoutSet) -> Self {
        let (weight_placeholder, reps_placeholder) = placeholders_from(set);
        Self {
            weight: non_zero(set.weight).unwrap_or_default(),
            reps: non_zero(set.reps as f64).unwrap_or_default(),
            weight_placeholder,
            reps_placeholder,
        }
    }

    fn from_baseline(set: &WorkoutSet) -> Self {
        let (weight_placeholder, reps_placeholder) = placeholders_from(set);
        Self::placeholder(weight_placeholder, reps_placeholder)
    }
}

fn non_zero(value: f64) -> Option<String> {
    (value != 0.0).then(|| value.to_string())
}

fn placeholders_from(set: &WorkoutSet) -> (String, String) {
    (
        non_zero(set.weight).unwrap_or_else(|| WEIGHT_PLACEHOLDER.to_string()),
        non_zero(set.reps as f64).unwrap_or_else(|| REPS_PLACEHOLDER.to_string()),
    )
}

/// Recorded sets first, then any baseline sets beyond the recorded count
/// as empty placeholders. Never returns an empty list.
pub fn plan_set_inputs(recorded: &[WorkoutSet], baseline: Option<&Baseline>) -> Vec<SetInput> {
    let mut inputs: Vec<SetInput> = recorded.iter().map(SetInput::recorded).collect();

    if let Some(baseline) = baseline {
        inputs.extend(
            baseline
                .sets
                .iter()
                .skip(recorded.len())
                .map(SetInput::from_baseline),
        );
    }

    if inputs.is_empty() {
        inputs.push(SetInput::empty());
    }
    inputs
}
