//! Session counter store
//!
//! Maps session identifiers to counters behind a single mutex. Sessions are
//! never removed, so memory grows with the number of distinct identifiers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

/// Thread-safe mapping from session id to a monotonically increasing count
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, u64>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `requested` (or a fresh UUID when absent/empty), inserting it with count 0
    /// if it is not known yet.
    pub fn get_or_create(&self, requested: Option<&str>) -> String {
        let mut sessions = self.lock();

        let session_id = match requested {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        if !sessions.contains_key(&session_id) {
            tracing::debug!(session_id = %session_id, "Created session");
            sessions.insert(session_id.clone(), 0);
        }

        session_id
    }

    /// Increment the count for `session_id` and return the new value.
    ///
    /// Unknown sessions are left untouched and report 0.
    pub fn increment(&self, session_id: &str) -> u64 {
        let mut sessions = self.lock();
        match sessions.get_mut(session_id) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => 0,
        }
    }

    /// Current count for `session_id`, or 0 if unknown
    pub fn get_count(&self, session_id: &str) -> u64 {
        self.lock().get(session_id).copied().unwrap_or(0)
    }

    /// Whether `session_id` has been created
    pub fn contains(&self, session_id: &str) -> bool {
        self.lock().contains_key(session_id)
    }

    /// Number of sessions ever created
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every critical section is a single map operation, so a panicking holder
    // cannot leave the map half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
