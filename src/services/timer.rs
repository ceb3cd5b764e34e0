//! Session stopwatch and per-set rest countdowns.
//!
//! Both are one-second tokio interval tasks owned by the value that spawned
//! them. Every exit path (pause, stop, replacement, cancellation, drop)
//! aborts the task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::services::records::SetKey;

const TICK: Duration = Duration::from_secs(1);

/// `HH:MM:SS`
pub fn format_elapsed(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// `m:ss`
pub fn format_countdown(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Elapsed-time counter for the session being edited.
#[derive(Debug)]
pub struct SessionTimer {
    elapsed: Arc<AtomicU64>,
    ticker: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::seeded(0)
    }

    /// Continues counting from a previously recorded duration.
    pub fn seeded(seconds: u64) -> Self {
        Self {
            elapsed: Arc::new(AtomicU64::new(seconds)),
            ticker: None,
        }
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn display(&self) -> String {
        format_elapsed(self.elapsed())
    }

    pub fn resume(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let elapsed = Arc::clone(&self.elapsed);
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                elapsed.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    pub fn pause(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    /// Returns whether the timer is running afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.pause();
        } else {
            self.resume();
        }
        self.is_running()
    }

    /// Stops ticking and returns the final elapsed seconds.
    pub fn stop(&mut self) -> u64 {
        self.pause();
        self.elapsed()
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.pause();
    }
}

/// Emitted when a rest countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestAlert {
    pub key: SetKey,
    pub play_sound: bool,
}

#[derive(Debug)]
struct Countdown {
    id: u64,
    ticker: JoinHandle<()>,
    remaining: watch::Receiver<u64>,
}

type ActiveCountdowns = Arc<Mutex<HashMap<SetKey, Countdown>>>;

fn lock(active: &ActiveCountdowns) -> MutexGuard<'_, HashMap<SetKey, Countdown>> {
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Concurrent rest countdowns, at most one per set.
#[derive(Debug)]
pub struct RestTimers {
    active: ActiveCountdowns,
    next_id: u64,
    alerts: mpsc::UnboundedSender<RestAlert>,
}

impl RestTimers {
    /// The receiver yields an alert each time a countdown finishes.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RestAlert>) {
        let (alerts, receiver) = mpsc::unbounded_channel();
        let timers = Self {
            active: Arc::new(Mutex::new(HashMap::new())),
            next_id: 0,
            alerts,
        };
        (timers, receiver)
    }

    /// Starts a countdown for `key`, replacing any countdown already running
    /// for it. The returned receiver observes the remaining seconds.
    pub fn start(&mut self, key: SetKey, seconds: u64, play_sound: bool) -> watch::Receiver<u64> {
        self.next_id += 1;
        let id = self.next_id;
        let (sender, receiver) = watch::channel(seconds);

        // Held across the spawn so the task cannot finish before its entry
        // exists.
        let mut active = lock(&self.active);
        if let Some(previous) = active.remove(&key) {
            previous.ticker.abort();
        }

        let registry = Arc::clone(&self.active);
        let alerts = self.alerts.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            let mut remaining = seconds;
            while remaining > 0 {
                interval.tick().await;
                remaining -= 1;
                sender.send_replace(remaining);
            }

            let finished = {
                let mut active = lock(&registry);
                match active.get(&key) {
                    Some(countdown) if countdown.id == id => {
                        active.remove(&key);
                        true
                    }
                    _ => false,
                }
            };
            if finished {
                tracing::debug!("Rest timer finished for {:?}", key);
                let _ = alerts.send(RestAlert { key, play_sound });
            }
        });

        active.insert(
            key,
            Countdown {
                id,
                ticker,
                remaining: receiver.clone(),
            },
        );
        receiver
    }

    pub fn remaining(&self, key: &SetKey) -> Option<u64> {
        lock(&self.active)
            .get(key)
            .map(|countdown| *countdown.remaining.borrow())
    }

    pub fn display(&self, key: &SetKey) -> Option<String> {
        self.remaining(key).map(format_countdown)
    }

    pub fn is_active(&self, key: &SetKey) -> bool {
        lock(&self.active).contains_key(key)
    }

    pub fn cancel(&mut self, key: &SetKey) -> bool {
        match lock(&self.active).remove(key) {
            Some(countdown) => {
                countdown.ticker.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_exercise(&mut self, exercise_id: i64) {
        lock(&self.active).retain(|key, countdown| {
            if key.exercise_id == exercise_id {
                countdown.ticker.abort();
                false
            } else {
                true
            }
        });
    }

    pub fn cancel_all(&mut self) {
        for (_, countdown) in lock(&self.active).drain() {
            countdown.ticker.abort();
        }
    }
}

impl Drop for RestTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
