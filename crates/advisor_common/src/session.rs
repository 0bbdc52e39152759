//! Session store.
//!
//! Owns one `StudentContext` per session id. Completed and failed courses
//! accumulate across a conversation; nothing is persisted beyond the life of
//! the store. The core provides no internal session lock — concurrent
//! queries for the same session must be serialized by the caller.

use crate::types::StudentContext;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, StudentContext>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, session_id: &str) -> &mut StudentContext {
        self.sessions.entry(session_id.to_string()).or_default()
    }

    pub fn get(&self, session_id: &str) -> Option<&StudentContext> {
        self.sessions.get(session_id)
    }

    /// Drop one session's accumulated state.
    pub fn end_session(&mut self, session_id: &str) -> Option<StudentContext> {
        self.sessions.remove(session_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
