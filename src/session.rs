//! In-memory chat threads.
//!
//! A [`SessionStore`] holds the active thread and the archive of earlier
//! threads. Archived threads are snapshots: selecting one copies its content
//! into the active thread, so nothing done to the active thread afterwards
//! reaches the archive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::{Error, Result};
use crate::observability::{SESSION_ARCHIVED, SESSION_DELETED};

/// One user turn and the bot turn answering it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// What the user asked.
    pub user_text: String,
    /// The reply, or `None` while the request is in flight.
    pub bot_text: Option<String>,
}

impl Exchange {
    /// Creates an exchange that is still waiting for its reply.
    pub fn pending(user_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            bot_text: None,
        }
    }

    /// Creates a completed exchange.
    pub fn completed(user_text: impl Into<String>, bot_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            bot_text: Some(bot_text.into()),
        }
    }

    /// Returns true while the reply has not arrived.
    pub fn is_in_flight(&self) -> bool {
        self.bot_text.is_none()
    }
}

/// Identifier of an archived thread.
///
/// Derived from the archival time in nanoseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ThreadId(u64);

impl ThreadId {
    /// Returns the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ThreadId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(ThreadId)
            .map_err(|_| Error::not_found(format!("not a thread id: {s}"), None))
    }
}

/// An archived, read-only thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    id: ThreadId,
    #[serde(with = "time::serde::rfc3339")]
    archived_at: OffsetDateTime,
    exchanges: Vec<Exchange>,
}

impl Thread {
    /// The thread's identifier.
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// When the thread was archived.
    pub fn archived_at(&self) -> OffsetDateTime {
        self.archived_at
    }

    /// The thread's exchanges in chronological order.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Number of exchanges.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Returns true if the thread has no exchanges.
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

/// The thread currently being shown and extended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveThread {
    exchanges: Vec<Exchange>,
    source: Option<ThreadId>,
}

impl ActiveThread {
    /// The exchanges in chronological order.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// The archived thread this content was selected from, while it is still
    /// unchanged.
    pub fn source(&self) -> Option<ThreadId> {
        self.source
    }

    /// Number of exchanges.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Returns true if the thread has no exchanges.
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// The exchange waiting for a reply, if any.
    pub fn in_flight(&self) -> Option<&Exchange> {
        self.exchanges.last().filter(|e| e.is_in_flight())
    }

    pub(crate) fn push(&mut self, exchange: Exchange) {
        self.source = None;
        self.exchanges.push(exchange);
    }

    pub(crate) fn in_flight_mut(&mut self) -> Option<&mut Exchange> {
        self.exchanges.last_mut().filter(|e| e.is_in_flight())
    }

    fn clear(&mut self) {
        self.exchanges.clear();
        self.source = None;
    }
}

/// The active thread plus the archive of earlier threads.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    active: ActiveThread,
    history: Vec<Thread>,
    last_id: Option<ThreadId>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active thread.
    pub fn active(&self) -> &ActiveThread {
        &self.active
    }

    pub(crate) fn active_mut(&mut self) -> &mut ActiveThread {
        &mut self.active
    }

    /// Archived threads, oldest first.
    pub fn history(&self) -> &[Thread] {
        &self.history
    }

    /// Looks up an archived thread.
    pub fn thread(&self, id: ThreadId) -> Option<&Thread> {
        self.history.iter().find(|t| t.id == id)
    }

    /// Resolves a user-supplied reference to an archived thread.
    ///
    /// Small numbers are 1-based positions in [`history`](Self::history);
    /// anything else must be a full thread id.
    pub fn find(&self, reference: &str) -> Result<ThreadId> {
        let reference = reference.trim();
        if let Ok(position) = reference.parse::<usize>()
            && position >= 1
            && position <= self.history.len()
        {
            return Ok(self.history[position - 1].id);
        }
        let id: ThreadId = reference.parse()?;
        if self.thread(id).is_some() {
            Ok(id)
        } else {
            Err(Error::not_found("no such thread", Some(id.0)))
        }
    }

    /// Archives the active thread if it has content and empties it.
    ///
    /// Returns the id given to the archived copy, if one was made.
    pub fn start_new_thread(&mut self) -> Option<ThreadId> {
        let archived = if self.active.is_empty() {
            None
        } else {
            let (id, archived_at) = self.next_id();
            self.history.push(Thread {
                id,
                archived_at,
                exchanges: std::mem::take(&mut self.active.exchanges),
            });
            SESSION_ARCHIVED.click();
            debug!(%id, "archived active thread");
            Some(id)
        };
        self.active.clear();
        archived
    }

    /// Replaces the active content with a copy of an archived thread.
    ///
    /// Whatever the active thread held before is discarded.
    pub fn select_thread(&mut self, id: ThreadId) -> Result<()> {
        let thread = self
            .thread(id)
            .ok_or_else(|| Error::not_found("no such thread", Some(id.0)))?;
        self.active = ActiveThread {
            exchanges: thread.exchanges.clone(),
            source: Some(id),
        };
        debug!(%id, "selected thread");
        Ok(())
    }

    /// Removes an archived thread.
    ///
    /// If the active thread is still showing that thread's content it is
    /// cleared as well.
    pub fn delete_thread(&mut self, id: ThreadId) -> Result<Thread> {
        let position = self
            .history
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::not_found("no such thread", Some(id.0)))?;
        let removed = self.history.remove(position);
        if self.active.source == Some(id) {
            self.active.clear();
        }
        SESSION_DELETED.click();
        debug!(%id, "deleted thread");
        Ok(removed)
    }

    /// Drops every archived thread and the active thread.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.active.clear();
    }

    /// Empties the active thread and leaves the archive alone.
    pub fn clear_active(&mut self) {
        self.active.clear();
    }

    fn next_id(&mut self) -> (ThreadId, OffsetDateTime) {
        let now = OffsetDateTime::now_utc();
        let nanos = u64::try_from(now.unix_timestamp_nanos()).unwrap_or(0);
        let id = match self.last_id {
            Some(last) if nanos <= last.0 => ThreadId(last.0 + 1),
            _ => ThreadId(nanos),
        };
        self.last_id = Some(id);
        (id, now)
    }
}
