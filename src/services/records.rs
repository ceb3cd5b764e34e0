//! Live personal-record checks for set inputs.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::models::PersonalBest;
use crate::repositories::Repositories;

/// Identifies one set input inside a session editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SetKey {
    pub exercise_id: i64,
    pub set_index: usize,
}

/// True iff there is no prior best, or the weight beats it, or the weight
/// ties and the reps beat it.
pub fn is_new_record(weight: f64, reps: i64, best: Option<&PersonalBest>) -> bool {
    match best {
        None => true,
        Some(best) => weight > best.weight || (weight == best.weight && reps > best.reps),
    }
}

/// A personal-record lookup issued for one set input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordCheck {
    pub key: SetKey,
    pub weight: f64,
    pub reps: i64,
    generation: u64,
}

/// Hands out per-slot generations so that only the newest lookup for a
/// slot may change its record flag.
#[derive(Debug, Default)]
pub struct RecordTracker {
    generations: HashMap<SetKey, u64>,
}

impl RecordTracker {
    pub fn issue(&mut self, key: SetKey, weight: f64, reps: i64) -> RecordCheck {
        let generation = self.bump(key);
        RecordCheck {
            key,
            weight,
            reps,
            generation,
        }
    }

    /// Invalidates whatever lookup is in flight for the slot.
    pub fn invalidate(&mut self, key: SetKey) {
        self.bump(key);
    }

    pub fn invalidate_exercise(&mut self, exercise_id: i64) {
        for (key, generation) in self.generations.iter_mut() {
            if key.exercise_id == exercise_id {
                *generation += 1;
            }
        }
    }

    pub fn is_current(&self, check: &RecordCheck) -> bool {
        self.generations.get(&check.key) == Some(&check.generation)
    }

    fn bump(&mut self, key: SetKey) -> u64 {
        let generation = self.generations.entry(key).or_insert(0);
        *generation += 1;
        *generation
    }
}

/// Runs the backend query behind a check. No caching: every input change
/// queries again.
pub async fn lookup(repos: &Repositories, check: &RecordCheck) -> Result<bool> {
    let best = repos.sets.find_personal_best(check.key.exercise_id).await?;
    Ok(is_new_record(check.weight, check.reps, best.as_ref()))
}

/// Best set per exercise as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalRecordEntry {
    pub exercise_id: i64,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: i64,
}

impl PersonalRecordEntry {
    pub fn display(&self) -> String {
        format!("{} kg x {} reps", self.weight, self.reps)
    }
}

/// One query per catalog exercise, in catalog order. Exercises never
/// logged are left out.
pub async fn personal_records(repos: &Repositories) -> Result<Vec<PersonalRecordEntry>> {
    let exercises = repos.exercises.find_all().await?;
    let mut records = Vec::new();
    for exercise in exercises {
        if let Some(best) = repos.sets.find_personal_best(exercise.id).await? {
            records.push(PersonalRecordEntry {
                exercise_id: exercise.id,
                exercise_name: exercise.name,
                weight: best.weight,
                reps: best.reps,
            });
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: SetKey = SetKey {
        exercise_id: 1,
        set_index: 0,
    };

    fn best(weight: f64, reps: i64) -> PersonalBest {
        PersonalBest { weight, reps }
    }

    #[test]
    fn test_no_prior_best_is_record() {
        assert!(is_new_record(20.0, 1, None));
    }

    #[test]
    fn test_heavier_is_record() {
        assert!(is_new_record(102.5, 1, Some(&best(100.0, 5))));
    }

    #[test]
    fn test_same_weight_more_reps_is_record() {
        assert!(is_new_record(100.0, 6, Some(&best(100.0, 5))));
    }

    #[test]
    fn test_tie_is_not_record() {
        assert!(!is_new_record(100.0, 5, Some(&best(100.0, 5))));
    }

    #[test]
    fn test_lighter_with_more_reps_is_not_record() {
        assert!(!is_new_record(90.0, 20, Some(&best(100.0, 5))));
    }

    #[test]
    fn test_only_newest_check_is_current() {
        let mut tracker = RecordTracker::default();

        let older = tracker.issue(KEY, 100.0, 5);
        let newer = tracker.issue(KEY, 105.0, 5);

        assert!(!tracker.is_current(&older));
        assert!(tracker.is_current(&newer));
    }

    #[test]
    fn test_invalidate_discards_in_flight_check() {
        let mut tracker = RecordTracker::default();
        let check = tracker.issue(KEY, 100.0, 5);

        tracker.invalidate(KEY);

        assert!(!tracker.is_current(&check));
    }

    #[test]
    fn test_invalidate_exercise_only_touches_that_exercise() {
        let mut tracker = RecordTracker::default();
        let other_key = SetKey {
            exercise_id: 2,
            set_index: 0,
        };
        let first = tracker.issue(KEY, 100.0, 5);
        let second = tracker.issue(other_key, 60.0, 8);

        tracker.invalidate_exercise(1);

        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut tracker = RecordTracker::default();
        let first = tracker.issue(KEY, 100.0, 5);
        let second = tracker.issue(
            SetKey {
                exercise_id: 1,
                set_index: 1,
            },
            100.0,
            5,
        );

        assert!(tracker.is_current(&first));
        assert!(tracker.is_current(&second));
    }

    #[test]
    fn test_record_display() {
        let entry = PersonalRecordEntry {
            exercise_id: 1,
            exercise_name: "Squat".to_string(),
            weight: 140.0,
            reps: 3,
        };

        assert_eq!(entry.display(), "140 kg x 3 reps");
    }
}
