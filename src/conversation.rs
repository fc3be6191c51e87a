//! The conversation controller.
//!
//! [`Conversation`] is the single place where session state changes. It owns
//! the [`SessionStore`], the [`UsageTracker`], the input buffer, and the
//! request state, and drives one request/response cycle at a time:
//!
//! ```text
//! Idle --submit--> Sending --response--------> Idle
//!                          --transport error--> Idle (error shown as the reply)
//! ```
//!
//! Transport failures never escape [`Conversation::ask`]; they become the
//! visible bot turn so a thread never shows a silently stuck request.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::observability::{CONVERSATION_EXCHANGES, CONVERSATION_FAILURES, CONVERSATION_REJECTED};
use crate::sanitize::strip_tool_calls;
use crate::session::{Exchange, SessionStore, Thread, ThreadId};
use crate::transport::{CHAT_ENDPOINT, ChatReply, ChatRequest, TransportSelector};
use crate::usage::{DEFAULT_BUDGET, UsageState, UsageTracker};

/// Shown when a failure produced no message of its own.
pub const FALLBACK_ERROR: &str = "Error: please try again";

/// Shown when a request was abandoned before it settled.
pub const CANCELLED_ERROR: &str = "Error: request cancelled";

/// Where the controller is in its request cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationState {
    /// Ready to accept a submission.
    Idle,
    /// A request is in flight; submissions are rejected.
    Sending,
}

/// Session aggregate: threads, usage, input buffer, and request state.
#[derive(Debug)]
pub struct Conversation {
    store: SessionStore,
    usage: UsageTracker,
    input: String,
    state: ConversationState,
    timeout: Option<Duration>,
}

impl Conversation {
    /// Creates an idle conversation with the given credit budget.
    pub fn new(budget: u64) -> Self {
        Self {
            store: SessionStore::new(),
            usage: UsageTracker::new(budget),
            input: String::new(),
            state: ConversationState::Idle,
            timeout: None,
        }
    }

    /// Races every request against a timer of this length.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The current request state.
    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Returns true while a request is in flight.
    pub fn is_sending(&self) -> bool {
        self.state == ConversationState::Sending
    }

    /// The session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The exchanges of the active thread.
    pub fn exchanges(&self) -> &[Exchange] {
        self.store.active().exchanges()
    }

    /// Archived threads, oldest first.
    pub fn history(&self) -> &[Thread] {
        self.store.history()
    }

    /// The current usage snapshot.
    pub fn usage(&self) -> UsageState {
        self.usage.state()
    }

    /// The pending input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the pending input text.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Starts a request for `text`.
    ///
    /// Appends an in-flight exchange, clears the input buffer, and enters
    /// [`ConversationState::Sending`]. Blank text is a validation error and a
    /// submission while sending is a busy error; neither changes any state.
    pub fn submit(&mut self, text: &str) -> Result<()> {
        if self.is_sending() {
            CONVERSATION_REJECTED.click();
            return Err(Error::busy("a request is already in flight"));
        }
        if text.trim().is_empty() {
            CONVERSATION_REJECTED.click();
            return Err(Error::validation("message is empty"));
        }
        self.store.active_mut().push(Exchange::pending(text));
        self.input.clear();
        self.state = ConversationState::Sending;
        debug!(len = text.len(), "submitted message");
        Ok(())
    }

    /// Submits whatever is in the input buffer.
    pub fn submit_input(&mut self) -> Result<String> {
        let text = self.input.clone();
        self.submit(&text)?;
        Ok(text)
    }

    /// Completes the in-flight exchange with a reply.
    ///
    /// Tool-call markup is stripped from `reply`. Credits, when present, are
    /// added to the usage total.
    pub fn receive(&mut self, reply: &str, credits: Option<i64>) -> Result<()> {
        let exchange = self.in_flight()?;
        exchange.bot_text = Some(strip_tool_calls(reply));
        if let Some(credits) = credits {
            self.usage.record(credits);
        }
        self.state = ConversationState::Idle;
        CONVERSATION_EXCHANGES.click();
        Ok(())
    }

    /// Completes the in-flight exchange with a diagnostic message.
    pub fn fail(&mut self, message: &str) -> Result<()> {
        let exchange = self.in_flight()?;
        let message = if message.trim().is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            message.to_string()
        };
        exchange.bot_text = Some(message);
        self.state = ConversationState::Idle;
        CONVERSATION_FAILURES.click();
        Ok(())
    }

    /// Runs one full cycle: submit `text`, send it, and settle the exchange.
    ///
    /// Only validation and busy errors are returned. Every transport or
    /// backend failure is written into the exchange and the conversation
    /// returns to idle. Dropping the returned future before it completes
    /// settles the exchange with [`CANCELLED_ERROR`].
    pub async fn ask(&mut self, selector: &TransportSelector, text: &str) -> Result<&Exchange> {
        self.submit(text)?;
        let request = ChatRequest::new(text);
        let timeout = self.timeout;
        let mut in_flight = InFlight(&mut *self);
        match dispatch(selector, &request, timeout).await {
            Ok(reply) => {
                info!(credits = ?reply.credits_used, "reply received");
                in_flight.0.receive(&reply.reply, reply.credits_used)?;
            }
            Err(err) => {
                debug_assert!(err.is_transport(), "unexpected error from send: {err}");
                warn!(error = %err, "request failed");
                in_flight.0.fail(&format!("Error: {err}"))?;
            }
        }
        drop(in_flight);
        self.store
            .active()
            .exchanges()
            .last()
            .ok_or_else(|| Error::validation("exchange vanished"))
    }

    /// Archives the active thread and starts a fresh billing window.
    pub fn start_new_thread(&mut self) -> Result<Option<ThreadId>> {
        self.ensure_idle()?;
        let id = self.store.start_new_thread();
        self.usage.reset();
        Ok(id)
    }

    /// Shows a copy of an archived thread.
    pub fn select_thread(&mut self, id: ThreadId) -> Result<()> {
        self.ensure_idle()?;
        self.store.select_thread(id)
    }

    /// Deletes an archived thread.
    pub fn delete_thread(&mut self, id: ThreadId) -> Result<Thread> {
        self.ensure_idle()?;
        self.store.delete_thread(id)
    }

    /// Drops the archive and the active thread.
    pub fn clear_history(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.store.clear_history();
        Ok(())
    }

    /// Empties the active thread. Usage is left alone.
    pub fn clear_active(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.store.clear_active();
        Ok(())
    }

    /// Resolves a user-supplied thread reference.
    pub fn find_thread(&self, reference: &str) -> Result<ThreadId> {
        self.store.find(reference)
    }

    fn in_flight(&mut self) -> Result<&mut Exchange> {
        if !self.is_sending() {
            return Err(Error::validation("no request is in flight"));
        }
        self.store
            .active_mut()
            .in_flight_mut()
            .ok_or_else(|| Error::validation("no request is in flight"))
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_sending() {
            Err(Error::busy("wait for the reply before changing threads"))
        } else {
            Ok(())
        }
    }
}

/// Settles a request whose [`Conversation::ask`] future was dropped.
struct InFlight<'a>(&'a mut Conversation);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.0.is_sending() {
            warn!("request dropped before it settled");
            let _ = self.0.fail(CANCELLED_ERROR);
        }
    }
}

async fn dispatch(
    selector: &TransportSelector,
    request: &ChatRequest,
    timeout: Option<Duration>,
) -> Result<ChatReply> {
    let send = selector.send(CHAT_ENDPOINT, request);
    match timeout {
        Some(limit) => tokio::time::timeout(limit, send).await.unwrap_or_else(|_| {
            Err(Error::timeout(
                "no reply before the deadline",
                Some(limit.as_secs_f64()),
            ))
        }),
        None => send.await,
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}
