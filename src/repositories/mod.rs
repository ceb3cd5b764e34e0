pub mod exercise_repo;
pub mod set_repo;
pub mod settings_repo;
pub mod workout_repo;

pub use exercise_repo::{ExerciseRepository, NewExercise};
pub use set_repo::SetRepository;
pub use settings_repo::SettingsRepository;
pub use workout_repo::WorkoutRepository;

use crate::db::DbPool;

/// Handles on every table, shared by the services that orchestrate several
/// backend calls.
#[derive(Clone)]
pub struct Repositories {
    pub exercises: ExerciseRepository,
    pub sessions: WorkoutRepository,
    pub sets: SetRepository,
    pub settings: SettingsRepository,
}

impl Repositories {
    pub fn new(pool: DbPool) -> Self {
        Self {
            exercises: ExerciseRepository::new(pool.clone()),
            sessions: WorkoutRepository::new(pool.clone()),
            sets: SetRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool),
        }
    }
}
