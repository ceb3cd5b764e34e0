//! The workout session editor.
//!
//! A `SessionEditor` owns everything a session being edited needs: its
//! exercise rows and set inputs, the session timer, the rest countdowns,
//! the personal-record tracker and the queue of finished-rest alerts. UI
//! events arrive as `EditorCommand`s.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{AppError, Result};
use crate::models::{Exercise, NewWorkoutSet, Settings, WorkoutSet};
use crate::repositories::{NewExercise, Repositories};
use crate::services::dates::{format_date, today};
use crate::services::previous::{
    load_baseline, plan_set_inputs, previous_volume_display, Baseline, SetInput,
};
use crate::services::records::{RecordCheck, RecordTracker, SetKey};
use crate::services::timer::{RestAlert, RestTimers, SessionTimer};
use crate::services::volume::{
    format_volume, parse_reps, parse_reps_strict, parse_weight, parse_weight_strict, total_volume,
    VolumeChange,
};

pub const AT_LEAST_ONE_SET: &str = "Each exercise must have at least one set.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorCommand {
    AddSet {
        exercise_id: i64,
    },
    DeleteSet {
        exercise_id: i64,
    },
    RemoveExercise {
        exercise_id: i64,
    },
    UpdateSet {
        exercise_id: i64,
        set_index: usize,
        #[serde(default)]
        weight: String,
        #[serde(default)]
        reps: String,
    },
    TogglePause,
}

#[derive(Debug)]
struct SetSlot {
    input: SetInput,
    is_record: bool,
}

impl SetSlot {
    fn new(input: SetInput) -> Self {
        Self {
            input,
            is_record: false,
        }
    }

    fn lenient(&self) -> (f64, i64) {
        (parse_weight(&self.input.weight), parse_reps(&self.input.reps))
    }
}

#[derive(Debug)]
struct EditorRow {
    exercise_id: i64,
    name: String,
    baseline: Option<Baseline>,
    sets: Vec<SetSlot>,
}

impl EditorRow {
    fn volume(&self) -> f64 {
        let pairs: Vec<(f64, i64)> = self.sets.iter().map(SetSlot::lenient).collect();
        total_volume(&pairs)
    }

    fn baseline_volume(&self) -> f64 {
        self.baseline.as_ref().map_or(0.0, |baseline| baseline.volume)
    }
}

#[derive(Debug)]
pub struct SessionEditor {
    session_id: Option<i64>,
    date: NaiveDate,
    rows: Vec<EditorRow>,
    settings: Settings,
    timer: SessionTimer,
    rest: RestTimers,
    alerts: mpsc::UnboundedReceiver<RestAlert>,
    records: RecordTracker,
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedSession {
    pub session_id: i64,
    pub sets_saved: usize,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetView {
    pub index: usize,
    pub weight: String,
    pub reps: String,
    pub weight_placeholder: String,
    pub reps_placeholder: String,
    pub is_record: bool,
    /// Remaining rest countdown, `m:ss`.
    pub rest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub exercise_id: i64,
    pub name: String,
    pub sets: Vec<SetView>,
    pub volume: String,
    pub previous_volume: String,
    pub change: String,
    /// "green" for a gain, "red" for a loss.
    pub change_colour: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorView {
    pub session_id: Option<i64>,
    pub title: String,
    pub timer: String,
    pub elapsed: u64,
    pub running: bool,
    pub rows: Vec<RowView>,
    pub alerts: Vec<RestAlert>,
}

impl SessionEditor {
    /// Opens the editor for a new session (`None`) or an existing one. The
    /// session timer starts ticking straight away.
    pub async fn load(repos: &Repositories, session_id: Option<i64>) -> Result<Self> {
        let (date, duration) = match session_id {
            Some(id) => {
                let session = repos
                    .sessions
                    .find_session_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Workout session not found".to_string()))?;
                (session.date, session.duration.unwrap_or(0))
            }
            None => (today(), 0),
        };

        let mut exercises = repos.exercises.find_routine().await?;
        let mut recorded: HashMap<i64, Vec<WorkoutSet>> = HashMap::new();
        if let Some(id) = session_id {
            for set in repos.sets.find_by_session(id).await? {
                recorded.entry(set.exercise_id).or_default().push(set);
            }
            let shown: HashSet<i64> = exercises.iter().map(|e| e.id).collect();
            let extra: Vec<Exercise> = repos
                .exercises
                .find_all()
                .await?
                .into_iter()
                .filter(|e| !shown.contains(&e.id) && recorded.contains_key(&e.id))
                .collect();
            exercises.extend(extra);
        }

        let mut rows = Vec::with_capacity(exercises.len());
        for exercise in exercises {
            let baseline = load_baseline(repos, exercise.id, session_id).await?;
            let sets = recorded.remove(&exercise.id).unwrap_or_default();
            let inputs = plan_set_inputs(&sets, baseline.as_ref());
            rows.push(EditorRow {
                exercise_id: exercise.id,
                name: exercise.name,
                baseline,
                sets: inputs.into_iter().map(SetSlot::new).collect(),
            });
        }

        let settings = repos.settings.get().await?;
        let (rest, alerts) = RestTimers::new();
        let mut timer = SessionTimer::seeded(duration.max(0) as u64);
        timer.resume();

        tracing::debug!(
            "Opened editor for {:?} with {} exercises",
            session_id,
            rows.len()
        );

        Ok(Self {
            session_id,
            date,
            rows,
            settings,
            timer,
            rest,
            alerts,
            records: RecordTracker::default(),
        })
    }

    /// Replaces the rest-timer settings used by countdowns started from now
    /// on. Running countdowns keep their duration.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn session_id(&self) -> Option<i64> {
        self.session_id
    }

    /// `Workout Session - dd/mm/yyyy`
    pub fn title(&self) -> String {
        format!("Workout Session - {}", format_date(self.date))
    }

    /// Applies a command and returns the personal-record lookups it issued.
    /// The caller runs them and reports back through `apply_record_check`.
    pub fn dispatch(&mut self, command: EditorCommand) -> Result<Vec<RecordCheck>> {
        match command {
            EditorCommand::AddSet { exercise_id } => {
                let row = self.row_mut(exercise_id)?;
                let input = row
                    .sets
                    .last()
                    .map(|last| {
                        SetInput::placeholder(
                            last.input.weight_placeholder.clone(),
                            last.input.reps_placeholder.clone(),
                        )
                    })
                    .unwrap_or_else(SetInput::empty);
                row.sets.push(SetSlot::new(input));
                Ok(Vec::new())
            }
            EditorCommand::DeleteSet { exercise_id } => {
                let row = self.row_mut(exercise_id)?;
                if row.sets.len() <= 1 {
                    return Err(AppError::Validation(AT_LEAST_ONE_SET.to_string()));
                }
                row.sets.pop();
                let key = SetKey {
                    exercise_id,
                    set_index: row.sets.len(),
                };
                self.rest.cancel(&key);
                self.records.invalidate(key);
                Ok(Vec::new())
            }
            EditorCommand::RemoveExercise { exercise_id } => {
                let position = self.row_position(exercise_id)?;
                self.rows.remove(position);
                self.rest.cancel_exercise(exercise_id);
                self.records.invalidate_exercise(exercise_id);
                Ok(Vec::new())
            }
            EditorCommand::UpdateSet {
                exercise_id,
                set_index,
                weight,
                reps,
            } => self.update_set(exercise_id, set_index, weight, reps),
            EditorCommand::TogglePause => {
                let running = self.timer.toggle();
                tracing::debug!("Session timer running: {}", running);
                Ok(Vec::new())
            }
        }
    }

    fn update_set(
        &mut self,
        exercise_id: i64,
        set_index: usize,
        weight: String,
        reps: String,
    ) -> Result<Vec<RecordCheck>> {
        let key = SetKey {
            exercise_id,
            set_index,
        };
        let row = self.row_mut(exercise_id)?;
        let slot = row
            .sets
            .get_mut(set_index)
            .ok_or_else(|| AppError::NotFound(format!("Set {} not found", set_index + 1)))?;
        slot.input.weight = weight;
        slot.input.reps = reps;

        let (weight, reps) = slot.lenient();
        if weight > 0.0 && reps > 0 {
            self.rest.start(
                key,
                self.settings.rest_timer_duration.max(0) as u64,
                self.settings.play_sound_on_timer_end,
            );
            Ok(vec![self.records.issue(key, weight, reps)])
        } else {
            slot.is_record = false;
            self.records.invalidate(key);
            Ok(Vec::new())
        }
    }

    /// Records the outcome of a lookup unless a newer one was issued for the
    /// same slot in the meantime. Returns whether it was applied.
    pub fn apply_record_check(&mut self, check: &RecordCheck, is_record: bool) -> bool {
        if !self.records.is_current(check) {
            tracing::debug!("Discarding stale record check for {:?}", check.key);
            return false;
        }
        let slot = self
            .rows
            .iter_mut()
            .find(|row| row.exercise_id == check.key.exercise_id)
            .and_then(|row| row.sets.get_mut(check.key.set_index));
        match slot {
            Some(slot) => {
                slot.is_record = is_record;
                true
            }
            None => false,
        }
    }

    /// Adds a brand new exercise to the catalog and to this session.
    pub async fn add_exercise(&mut self, repos: &Repositories, name: &str) -> Result<Exercise> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Exercise name is required".to_string(),
            ));
        }

        let ordering = repos
            .exercises
            .find_all()
            .await?
            .iter()
            .map(|e| e.ordering + 1)
            .max()
            .unwrap_or(0);
        let exercise = repos
            .exercises
            .create(NewExercise {
                name: name.to_string(),
                muscle_group: None,
                is_in_routine: true,
                ordering,
            })
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    AppError::Validation(
                        "Failed to add exercise. It might already exist.".to_string(),
                    )
                } else {
                    e
                }
            })?;

        tracing::info!("Added exercise '{}' from the session editor", exercise.name);
        self.rows.push(EditorRow {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
            baseline: None,
            sets: vec![SetSlot::new(SetInput::empty())],
        });
        Ok(exercise)
    }

    /// Persists the session. Only sets whose weight and reps both parse are
    /// kept, numbered from 1 within each exercise. Timers stop only once
    /// every write has succeeded.
    pub async fn save(&mut self, repos: &Repositories) -> Result<SavedSession> {
        let duration = self.timer.elapsed() as i64;

        let session_id = match self.session_id {
            Some(id) => {
                repos.sets.delete_by_session(id).await?;
                repos.sessions.update_duration(id, duration).await?;
                id
            }
            None => {
                repos
                    .sessions
                    .create_session(today(), Some(duration))
                    .await?
                    .id
            }
        };
        self.session_id = Some(session_id);

        let sets = self.collect_sets(session_id);
        let sets_saved = repos.sets.insert_many(sets).await?;

        self.close();
        tracing::info!(
            "Saved workout session {} with {} sets ({}s)",
            session_id,
            sets_saved,
            duration
        );

        Ok(SavedSession {
            session_id,
            sets_saved,
            duration,
        })
    }

    fn collect_sets(&self, session_id: i64) -> Vec<NewWorkoutSet> {
        let mut sets = Vec::new();
        for row in &self.rows {
            let mut set_number = 1;
            for slot in &row.sets {
                let weight = parse_weight_strict(&slot.input.weight);
                let reps = parse_reps_strict(&slot.input.reps);
                if let (Some(weight), Some(reps)) = (weight, reps) {
                    sets.push(NewWorkoutSet {
                        workout_session_id: session_id,
                        exercise_id: row.exercise_id,
                        set_number,
                        weight,
                        reps,
                    });
                    set_number += 1;
                }
            }
        }
        sets
    }

    /// Stops the session timer and every rest countdown.
    pub fn close(&mut self) {
        self.timer.stop();
        self.rest.cancel_all();
    }

    /// Snapshot for the page. Drains the finished-rest alerts, so each is
    /// reported once.
    pub fn view(&mut self) -> EditorView {
        let mut alerts = Vec::new();
        while let Ok(alert) = self.alerts.try_recv() {
            alerts.push(alert);
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let volume = row.volume();
                let change = VolumeChange::between(row.baseline_volume(), volume);
                RowView {
                    exercise_id: row.exercise_id,
                    name: row.name.clone(),
                    sets: row
                        .sets
                        .iter()
                        .enumerate()
                        .map(|(index, slot)| SetView {
                            index,
                            weight: slot.input.weight.clone(),
                            reps: slot.input.reps.clone(),
                            weight_placeholder: slot.input.weight_placeholder.clone(),
                            reps_placeholder: slot.input.reps_placeholder.clone(),
                            is_record: slot.is_record,
                            rest: self.rest.display(&SetKey {
                                exercise_id: row.exercise_id,
                                set_index: index,
                            }),
                        })
                        .collect(),
                    volume: format_volume(volume),
                    previous_volume: previous_volume_display(row.baseline.as_ref()),
                    change: change.to_string(),
                    change_colour: change
                        .is_gain()
                        .map(|gain| if gain { "green" } else { "red" }),
                }
            })
            .collect();

        EditorView {
            session_id: self.session_id,
            title: self.title(),
            timer: self.timer.display(),
            elapsed: self.timer.elapsed(),
            running: self.timer.is_running(),
            rows,
            alerts,
        }
    }

    fn row_position(&self, exercise_id: i64) -> Result<usize> {
        self.rows
            .iter()
            .position(|row| row.exercise_id == exercise_id)
            .ok_or_else(|| AppError::NotFound("Exercise is not part of this session".to_string()))
    }

    fn row_mut(&mut self, exercise_id: i64) -> Result<&mut EditorRow> {
        let position = self.row_position(exercise_id)?;
        Ok(&mut self.rows[position])
    }
}

/// Deletes a session's sets, then the session itself. The two deletes are
/// independent; a failure in between leaves the empty session behind.
pub async fn delete_session(repos: &Repositories, session_id: i64) -> Result<()> {
    if repos.sessions.find_session_by_id(session_id).await?.is_none() {
        return Err(AppError::NotFound("Workout session not found".to_string()));
    }
    let removed = repos.sets.delete_by_session(session_id).await?;
    repos.sessions.delete_session(session_id).await?;
    tracing::info!(
        "Deleted workout session {} and {} sets",
        session_id,
        removed
    );
    Ok(())
}
