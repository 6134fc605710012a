//! Per-user dialogue state.
//!
//! A session exists only while a multi-step dialogue is in flight: it is
//! created when a category (or category type) is picked, replaced on each
//! accepted input and removed by the terminal step, by `/cancel`, or by any
//! dialogue-starting command.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use ledger::TransactionKind;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Category picked at the start of an expense/income dialogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryPick {
    pub category_id: i64,
    pub category_name: String,
}

/// Everything captured once the amount has been accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmountDraft {
    pub category_id: i64,
    pub category_name: String,
    pub amount: i64,
    pub formatted_amount: String,
}

/// One in-flight dialogue step.
///
/// Each variant carries exactly the data valid in that state, so a handler
/// can never read a field the dialogue has not produced yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dialogue {
    /// A category is chosen; the next message must be an amount.
    AwaitingAmount {
        kind: TransactionKind,
        category: CategoryPick,
    },
    /// Amount captured; the next message is a description or "skip".
    AwaitingDescription {
        kind: TransactionKind,
        draft: AmountDraft,
    },
    /// A category type is chosen; the next message must be a name.
    AwaitingCategoryName { kind: TransactionKind },
}

struct Entry {
    dialogue: Dialogue,
    touched_at: Instant,
}

/// In-memory session map keyed by Telegram user id.
///
/// Safe for concurrent use across users; [`SessionStore::user_lock`] hands
/// out a per-user mutex so the router processes one event at a time per
/// user even when the transport delivers updates concurrently.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<u64, Entry>>>,
    locks: Arc<Mutex<HashMap<u64, Arc<Mutex<()>>>>>,
}

impl SessionStore {
    pub async fn get(&self, user_id: u64) -> Option<Dialogue> {
        let guard = self.sessions.lock().await;
        guard.get(&user_id).map(|entry| entry.dialogue.clone())
    }

    /// Stores the dialogue for a user, replacing any previous one.
    pub async fn set(&self, user_id: u64, dialogue: Dialogue) {
        let mut guard = self.sessions.lock().await;
        guard.insert(
            user_id,
            Entry {
                dialogue,
                touched_at: Instant::now(),
            },
        );
    }

    pub async fn remove(&self, user_id: u64) -> Option<Dialogue> {
        let mut guard = self.sessions.lock().await;
        guard.remove(&user_id).map(|entry| entry.dialogue)
    }

    /// Serialises event handling for one user. Hold the guard for the whole
    /// handler invocation.
    pub async fn user_lock(&self, user_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut guard = self.locks.lock().await;
            guard
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drops sessions that have not advanced for longer than `max_idle`.
    /// Returns how many were evicted.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut guard = self.sessions.lock().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.touched_at.elapsed() < max_idle);
        before - guard.len()
    }
}
