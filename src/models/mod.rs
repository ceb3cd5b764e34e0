pub mod exercise;
pub mod from_row;
pub mod settings;
pub mod workout_session;
pub mod workout_set;

pub use exercise::Exercise;
pub use from_row::FromSqliteRow;
pub use settings::{Settings, UpdateSettings};
pub use workout_session::WorkoutSession;
pub use workout_set::{NewWorkoutSet, PersonalBest, SessionWithSets, SetWithExercise, WorkoutSet};
