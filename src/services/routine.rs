//! The exercise catalog and the ordered routine drawn from it.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::exercise::MUSCLE_GROUPS;
use crate::models::Exercise;
use crate::repositories::{NewExercise, Repositories};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoutineCommand {
    AddToRoutine { id: i64 },
    RemoveFromRoutine { id: i64 },
    MoveUp { id: i64 },
    MoveDown { id: i64 },
    Create { name: String, muscle_group: String },
    Rename { id: i64, name: String },
    Delete { id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineView {
    pub routine: Vec<Exercise>,
    pub available: Vec<Exercise>,
    pub all: Vec<Exercise>,
    pub muscle_groups: Vec<&'static str>,
}

/// The catalog as last read, in `ordering` order. Every command writes
/// through to the database and then reloads.
#[derive(Debug, Default)]
pub struct RoutineManager {
    exercises: Vec<Exercise>,
}

impl RoutineManager {
    pub async fn load(repos: &Repositories) -> Result<Self> {
        Ok(Self {
            exercises: repos.exercises.find_all().await?,
        })
    }

    pub fn routine(&self) -> Vec<&Exercise> {
        self.exercises.iter().filter(|e| e.is_in_routine).collect()
    }

    pub fn available(&self) -> Vec<&Exercise> {
        self.exercises.iter().filter(|e| !e.is_in_routine).collect()
    }

    pub fn all(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn view(&self) -> RoutineView {
        RoutineView {
            routine: self.routine().into_iter().cloned().collect(),
            available: self.available().into_iter().cloned().collect(),
            all: self.exercises.clone(),
            muscle_groups: MUSCLE_GROUPS.to_vec(),
        }
    }

    pub async fn dispatch(&mut self, repos: &Repositories, command: RoutineCommand) -> Result<()> {
        match command {
            RoutineCommand::AddToRoutine { id } => {
                self.find(id)?;
                let ordering = self
                    .routine()
                    .iter()
                    .filter(|e| e.id != id)
                    .map(|e| e.ordering + 1)
                    .max()
                    .unwrap_or(0);
                repos.exercises.set_in_routine(id, true).await?;
                repos.exercises.set_ordering(id, ordering).await?;
            }
            RoutineCommand::RemoveFromRoutine { id } => {
                self.find(id)?;
                repos.exercises.set_in_routine(id, false).await?;
            }
            RoutineCommand::MoveUp { id } => self.move_by(repos, id, -1).await?,
            RoutineCommand::MoveDown { id } => self.move_by(repos, id, 1).await?,
            RoutineCommand::Create { name, muscle_group } => {
                let name = name.trim();
                let muscle_group = muscle_group.trim();
                if name.is_empty() || muscle_group.is_empty() {
                    return Err(AppError::Validation(
                        "Please provide a name and muscle group.".to_string(),
                    ));
                }
                repos
                    .exercises
                    .create(NewExercise {
                        name: name.to_string(),
                        muscle_group: Some(muscle_group.to_string()),
                        is_in_routine: false,
                        ordering: 0,
                    })
                    .await
                    .map_err(|e| duplicate_name(e, "Error creating exercise"))?;
                tracing::info!("Created exercise '{}'", name);
            }
            RoutineCommand::Rename { id, name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::Validation("Name cannot be empty.".to_string()));
                }
                let renamed = repos
                    .exercises
                    .rename(id, name)
                    .await
                    .map_err(|e| duplicate_name(e, "Error updating exercise"))?;
                if !renamed {
                    return Err(not_found());
                }
            }
            RoutineCommand::Delete { id } => {
                if !repos.exercises.delete(id).await? {
                    return Err(not_found());
                }
                tracing::info!("Deleted exercise {} and its sets", id);
            }
        }

        self.exercises = repos.exercises.find_all().await?;
        Ok(())
    }

    /// Moves a routine item one place and writes every routine item's
    /// position back as its ordering, one update per item. Moving past
    /// either end does nothing.
    async fn move_by(&self, repos: &Repositories, id: i64, offset: isize) -> Result<()> {
        let mut routine: Vec<i64> = self.routine().iter().map(|e| e.id).collect();
        let position = routine
            .iter()
            .position(|&e| e == id)
            .ok_or_else(|| AppError::NotFound("Exercise is not in the routine".to_string()))?;
        let target = position as isize + offset;
        if target < 0 || target as usize >= routine.len() {
            return Ok(());
        }
        routine.swap(position, target as usize);

        for (ordering, exercise_id) in routine.into_iter().enumerate() {
            repos
                .exercises
                .set_ordering(exercise_id, ordering as i64)
                .await?;
        }
        Ok(())
    }

    fn find(&self, id: i64) -> Result<&Exercise> {
        self.exercises
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Exercise not found".to_string())
}

fn duplicate_name(error: AppError, action: &str) -> AppError {
    if error.is_unique_violation() {
        AppError::Validation(format!("{}. It might already exist.", action))
    } else {
        error
    }
}
