//! Process-scoped session store.
//!
//! Sessions are keyed by a UUID v4 and kept in memory only. There is no
//! eviction and no persistence. The map is internally synchronised; callers
//! that need to serialise whole operations on one session (a run, an append)
//! take the gateway's per-session lock first.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use sl_domain::error::{Error, Result};
use sl_domain::result::StructuredResult;
use sl_domain::trace::TraceEvent;

use crate::transcript::{self, Speaker, Turn};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One conversation being worked on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub objective: String,
    pub turns: Vec<Turn>,
    /// Free-text notes carried from one run into the next.
    #[serde(default)]
    pub memory: String,
    #[serde(default)]
    pub last_result: Option<StructuredResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// The turns rendered back into transcript text.
    pub fn transcript(&self) -> String {
        transcript::render(&self.turns)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct SessionStore {
    default_objective: String,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(default_objective: impl Into<String>) -> Self {
        Self {
            default_objective: default_objective.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session from an optional objective and a raw transcript.
    ///
    /// A missing or blank objective falls back to the configured default.
    pub fn create(&self, objective: Option<&str>, raw_transcript: &str) -> Session {
        let objective = objective
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .unwrap_or(&self.default_objective)
            .to_owned();

        let now = Utc::now();
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            objective,
            turns: transcript::parse(raw_transcript),
            memory: String::new(),
            last_result: None,
            created_at: now,
            updated_at: now,
        };

        self.sessions
            .write()
            .insert(session.id.clone(), session.clone());

        TraceEvent::SessionCreated {
            session_id: session.id.clone(),
            turns: session.turns.len(),
        }
        .emit();

        session
    }

    /// Snapshot of a session.
    pub fn get(&self, id: &str) -> Result<Session> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_owned()))
    }

    pub fn set_objective(&self, id: &str, objective: &str) -> Result<()> {
        let objective = objective.trim();
        if objective.is_empty() {
            return Err(Error::missing("objective"));
        }
        self.with_session(id, |s| s.objective = objective.to_owned())?;

        TraceEvent::ObjectiveChanged {
            session_id: id.to_owned(),
        }
        .emit();
        Ok(())
    }

    /// Append one turn and return the updated session.
    pub fn append_turn(&self, id: &str, speaker: Speaker, text: &str) -> Result<Session> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::missing("text"));
        }
        let session = self.with_session(id, |s| {
            s.turns.push(Turn::new(speaker, text));
            s.clone()
        })?;

        TraceEvent::TurnAppended {
            session_id: id.to_owned(),
            speaker: speaker.to_string(),
            chars: text.chars().count(),
        }
        .emit();
        Ok(session)
    }

    /// Store a resolved result and carry its memory update forward.
    pub fn record_result(&self, id: &str, result: &StructuredResult) -> Result<()> {
        let memory_chars = self.with_session(id, |s| {
            if let Some(memory) = result.memory_update() {
                s.memory = memory;
            }
            s.last_result = Some(result.clone());
            s.memory.chars().count()
        })?;

        TraceEvent::ResultRecorded {
            session_id: id.to_owned(),
            memory_chars,
        }
        .emit();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Apply a mutation under the write lock and refresh `updated_at`.
    fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Result<T> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_owned()))?;
        let out = f(session);
        session.updated_at = Utc::now();
        Ok(out)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
