//! Open session editors, keyed by a draft id handed to the page.
//!
//! A draft that is not touched for [`DRAFT_TTL`] is treated as abandoned:
//! it is evicted on its next access or by the periodic sweep, and its
//! timers are stopped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::repositories::Repositories;
use crate::services::editor::{EditorCommand, EditorView, SessionEditor};
use crate::services::records;

pub type SharedEditor = Arc<AsyncMutex<SessionEditor>>;

pub const DRAFT_TTL: Duration = Duration::from_secs(6 * 60 * 60);
pub const SWEEP_PERIOD: Duration = Duration::from_secs(5 * 60);

struct Draft {
    editor: SharedEditor,
    touched: Instant,
}

#[derive(Clone)]
pub struct DraftStore {
    drafts: Arc<Mutex<HashMap<Uuid, Draft>>>,
    ttl: Duration,
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::with_ttl(DRAFT_TTL)
    }
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            drafts: Arc::default(),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Draft>> {
        self.drafts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, draft: &Draft, now: Instant) -> bool {
        now.duration_since(draft.touched) >= self.ttl
    }

    pub fn open(&self, editor: SessionEditor) -> (Uuid, SharedEditor) {
        let id = Uuid::new_v4();
        let editor = Arc::new(AsyncMutex::new(editor));
        self.lock().insert(
            id,
            Draft {
                editor: Arc::clone(&editor),
                touched: Instant::now(),
            },
        );
        (id, editor)
    }

    /// Returns the draft and marks it as touched. An expired draft is
    /// closed and removed instead.
    pub async fn get(&self, id: &Uuid) -> Result<SharedEditor> {
        let now = Instant::now();
        let expired = {
            let mut drafts = self.lock();
            match drafts.get_mut(id) {
                Some(draft) if !self.is_expired(draft, now) => {
                    draft.touched = now;
                    return Ok(Arc::clone(&draft.editor));
                }
                Some(_) => drafts.remove(id),
                None => None,
            }
        };

        if let Some(draft) = expired {
            tracing::debug!("Draft {} expired", id);
            draft.editor.lock().await.close();
        }
        Err(AppError::NotFound("Draft not found".to_string()))
    }

    pub fn remove(&self, id: &Uuid) -> Option<SharedEditor> {
        self.lock().remove(id).map(|draft| draft.editor)
    }

    /// Closes and drops every draft idle for longer than the TTL. Returns
    /// how many were evicted.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<Draft> = {
            let mut drafts = self.lock();
            let ids: Vec<Uuid> = drafts
                .iter()
                .filter(|(_, draft)| self.is_expired(draft, now))
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| drafts.remove(id)).collect()
        };

        for draft in &expired {
            draft.editor.lock().await.close();
        }
        expired.len()
    }

    /// Runs [`Self::sweep_expired`] every `period` until the handle is
    /// aborted.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.sweep_expired().await;
                if evicted > 0 {
                    tracing::debug!("Evicted {} abandoned drafts", evicted);
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Dispatches a command, then runs the record lookups it issued without
/// holding the editor lock. Each result is applied only if it is still the
/// newest for its set.
pub async fn run_command(
    repos: &Repositories,
    editor: &SharedEditor,
    command: EditorCommand,
) -> Result<EditorView> {
    // Rest countdowns use the duration saved at the moment they start.
    if matches!(command, EditorCommand::UpdateSet { .. }) {
        let settings = repos.settings.get().await?;
        editor.lock().await.set_settings(settings);
    }

    let checks = editor.lock().await.dispatch(command)?;

    for check in checks {
        let is_record = records::lookup(repos, &check).await?;
        editor.lock().await.apply_record_check(&check, is_record);
    }

    Ok(editor.lock().await.view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::migrations::run_migrations_for_tests;
    use crate::repositories::NewExercise;

    fn setup() -> Repositories {
        let pool = create_memory_pool().expect("Failed to create test database");
        run_migrations_for_tests(&pool).expect("Failed to run migrations");
        Repositories::new(pool)
    }

    #[tokio::test]
    async fn test_open_get_remove() {
        let repos = setup();
        let store = DraftStore::new();
        let editor = SessionEditor::load(&repos, None).await.unwrap();

        let (id, _) = store.open(editor);
        assert_eq!(store.len(), 1);
        assert!(store.get(&id).await.is_ok());

        assert!(store.remove(&id).is_some());
        assert!(store.is_empty());
        assert!(matches!(store.get(&id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_draft_is_closed_on_access() {
        let repos = setup();
        let store = DraftStore::with_ttl(Duration::from_secs(60));
        let (id, editor) = store.open(SessionEditor::load(&repos, None).await.unwrap());

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(matches!(store.get(&id).await, Err(AppError::NotFound(_))));
        assert!(store.is_empty());
        assert!(!editor.lock().await.view().running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_access_keeps_draft_alive() {
        let repos = setup();
        let store = DraftStore::with_ttl(Duration::from_secs(60));
        let (id, editor) = store.open(SessionEditor::load(&repos, None).await.unwrap());

        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(store.get(&id).await.is_ok());
        tokio::time::advance(Duration::from_secs(40)).await;

        assert_eq!(store.sweep_expired().await, 0);
        assert!(store.get(&id).await.is_ok());
        assert!(editor.lock().await.view().running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_abandoned_drafts() {
        let repos = setup();
        let store = DraftStore::with_ttl(Duration::from_secs(60));
        let mut editors = Vec::new();
        for _ in 0..5 {
            let (_, editor) = store.open(SessionEditor::load(&repos, None).await.unwrap());
            editors.push(editor);
        }
        let sweeper = store.spawn_sweeper(Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(store.is_empty());
        for editor in &editors {
            assert!(!editor.lock().await.view().running);
        }
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_run_command_flags_first_set_as_record() {
        let repos = setup();
        let bench = repos
            .exercises
            .create(NewExercise {
                name: "Bench Press".to_string(),
                muscle_group: Some("Chest".to_string()),
                is_in_routine: true,
                ordering: 0,
            })
            .await
            .unwrap();
        let store = DraftStore::new();
        let (_, editor) = store.open(SessionEditor::load(&repos, None).await.unwrap());

        let view = run_command(
            &repos,
            &editor,
            EditorCommand::UpdateSet {
                exercise_id: bench.id,
                set_index: 0,
                weight: "60".to_string(),
                reps: "10".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(view.rows[0].sets[0].is_record);
        assert_eq!(view.rows[0].volume, "600.0");
    }

    #[tokio::test]
    async fn test_rest_countdown_uses_current_settings() {
        let repos = setup();
        let bench = repos
            .exercises
            .create(NewExercise {
                name: "Bench Press".to_string(),
                muscle_group: Some("Chest".to_string()),
                is_in_routine: true,
                ordering: 0,
            })
            .await
            .unwrap();
        let store = DraftStore::new();
        let (_, editor) = store.open(SessionEditor::load(&repos, None).await.unwrap());

        repos.settings.update(30, false).await.unwrap();
        let view = run_command(
            &repos,
            &editor,
            EditorCommand::UpdateSet {
                exercise_id: bench.id,
                set_index: 0,
                weight: "60".to_string(),
                reps: "10".to_string(),
            },
        )
        .await
        .unwrap();

        let rest = view.rows[0].sets[0].rest.clone().unwrap();
        assert!(rest == "0:30" || rest == "0:29", "unexpected countdown {}", rest);
    }
}
