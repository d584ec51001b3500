//! Conversation session: append-only message log plus the current itinerary.
//!
//! A turn is two phases. [`ConversationSession::begin`] appends the user
//! message and moves the session to `Processing`; [`ConversationSession::complete`]
//! runs the engine, appends exactly one assistant message and returns to `Idle`.
//! [`ConversationSession::submit`] does both with a response delay in between.
//! Blank text and submissions while `Processing` are ignored.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compose::GREETING;
use crate::engine::respond;
use crate::intent::Intent;
use crate::itinerary::Itinerary;
use crate::profile::ProfileUpdateRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Processing,
}

/// A user message waiting for its reply. Only [`ConversationSession::begin`] creates one.
#[derive(Debug)]
#[must_use = "a pending turn must be completed"]
pub struct PendingTurn {
    user_message: MessageId,
    text: String,
}

impl PendingTurn {
    pub fn user_message(&self) -> MessageId {
        self.user_message
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What a completed turn produced, for the caller's collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub intent: Intent,
    pub user_message: MessageId,
    pub assistant_message: MessageId,
    pub itinerary_replaced: bool,
    /// Set for profile directives; hand it to the profile store.
    pub profile_update: Option<ProfileUpdateRequest>,
}

#[derive(Debug, Clone)]
pub struct ConversationSession {
    messages: Vec<Message>,
    current_itinerary: Option<Itinerary>,
    state: SessionState,
    next_id: u64,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    /// New session seeded with the standard greeting.
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut s = Self {
            messages: Vec::new(),
            current_itinerary: None,
            state: SessionState::Idle,
            next_id: 1,
        };
        s.push(Sender::Assistant, greeting.into());
        s
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn current_itinerary(&self) -> Option<&Itinerary> {
        self.current_itinerary.as_ref()
    }

    pub fn itinerary_visible(&self) -> bool {
        self.current_itinerary.as_ref().is_some_and(|it| !it.is_empty())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        self.state == SessionState::Processing
    }

    fn push(&mut self, sender: Sender, text: String) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message {
            id,
            sender,
            text,
            timestamp: Utc::now(),
        });
        id
    }

    /// Start a turn. Returns `None` (and changes nothing) for blank text or
    /// while a previous turn is still processing.
    pub fn begin(&mut self, text: &str) -> Option<PendingTurn> {
        if text.trim().is_empty() {
            debug!("ignoring blank submission");
            return None;
        }
        if self.is_processing() {
            warn!("submission ignored: a turn is already processing");
            return None;
        }

        let user_message = self.push(Sender::User, text.to_string());
        self.state = SessionState::Processing;
        Some(PendingTurn {
            user_message,
            text: text.to_string(),
        })
    }

    /// Finish a turn: append the assistant reply and swap in a new itinerary if one was built.
    ///
    /// Returns `None` (and changes nothing) when `pending` is not the turn this
    /// session is processing.
    pub fn complete(&mut self, pending: PendingTurn) -> Option<TurnOutcome> {
        let owned = self.is_processing()
            && self
                .messages
                .last()
                .is_some_and(|m| m.id == pending.user_message && m.sender == Sender::User);
        if !owned {
            warn!(user_message = %pending.user_message, state = ?self.state, "completion ignored: no matching turn in progress");
            return None;
        }

        let response = respond(&pending.text);
        let assistant_message = self.push(Sender::Assistant, response.reply);

        let itinerary_replaced = match response.itinerary {
            Some(it) if !it.is_empty() => {
                info!(segments = it.len(), "itinerary replaced");
                self.current_itinerary = Some(it);
                true
            }
            _ => false,
        };

        let profile_update = match &response.intent {
            Intent::ProfileUpdate { fields } => Some(ProfileUpdateRequest::new(fields.clone())),
            _ => None,
        };

        self.state = SessionState::Idle;
        Some(TurnOutcome {
            intent: response.intent,
            user_message: pending.user_message,
            assistant_message,
            itinerary_replaced,
            profile_update,
        })
    }

    /// Run one full turn, waiting `latency` between the user message and the reply.
    ///
    /// Dropping the future during the delay still appends the reply, so the
    /// session never stays in `Processing`. The outcome is lost in that case.
    pub async fn submit(&mut self, text: &str, latency: Duration) -> Option<TurnOutcome> {
        let pending = self.begin(text)?;
        let mut guard = TurnGuard {
            session: self,
            pending: Some(pending),
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let pending = guard.pending.take()?;
        guard.session.complete(pending)
    }
}

/// Completes a started turn if `submit` is dropped before it finishes.
struct TurnGuard<'a> {
    session: &'a mut ConversationSession,
    pending: Option<PendingTurn>,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            warn!(user_message = %pending.user_message, "submit dropped during the response delay; completing the turn");
            let _ = self.session.complete(pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRUISE: &str = "My Princess Cruise leaves Seattle June 14";

    #[test]
    fn test_new_session_has_greeting_only() {
        let s = ConversationSession::new();
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].sender, Sender::Assistant);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(!s.itinerary_visible());
    }

    #[test]
    fn test_blank_submission_is_noop() {
        let mut s = ConversationSession::new();
        assert!(s.begin("").is_none());
        assert!(s.begin("   \n\t").is_none());
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_begin_while_processing_is_rejected() {
        let mut s = ConversationSession::new();
        let pending = s.begin("hello").unwrap();
        assert!(s.is_processing());
        assert!(s.begin("again").is_none());
        assert_eq!(s.messages().len(), 2);

        assert!(s.complete(pending).is_some());
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.messages().len(), 3);
    }

    #[test]
    fn test_turn_alternates_user_then_assistant() {
        let mut s = ConversationSession::new();
        for text in ["hi", "5/10", CRUISE, "a hotel please"] {
            let p = s.begin(text).unwrap();
            s.complete(p).unwrap();
        }
        let senders: Vec<_> = s.messages().iter().skip(1).map(|m| m.sender).collect();
        for pair in senders.chunks(2) {
            assert_eq!(pair, [Sender::User, Sender::Assistant]);
        }
        let ids: Vec<_> = s.messages().iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_cruise_sets_itinerary_and_later_turns_keep_it() {
        let mut s = ConversationSession::new();
        let p = s.begin(CRUISE).unwrap();
        let out = s.complete(p).unwrap();
        assert!(out.itinerary_replaced);
        assert!(s.itinerary_visible());
        assert_eq!(s.current_itinerary().unwrap().len(), 8);

        let p = s.begin("5/10").unwrap();
        let out = s.complete(p).unwrap();
        assert_eq!(out.intent, Intent::BareDateRange);
        assert!(!out.itinerary_replaced);
        assert!(s.itinerary_visible());
    }

    #[test]
    fn test_profile_directive_surfaces_request() {
        let mut s = ConversationSession::new();
        let p = s.begin("update profile: name=Jane Doe, address=123 Main St").unwrap();
        let out = s.complete(p).unwrap();
        let req = out.profile_update.unwrap();
        assert_eq!(req.fields["name"], "Jane Doe");
        assert_eq!(req.fields["address"], "123 Main St");
        assert!(!out.itinerary_replaced);
    }

    #[tokio::test]
    async fn test_submit_appends_two_messages() {
        let mut s = ConversationSession::new();
        let out = s.submit("I want to relax somewhere quiet", Duration::ZERO).await.unwrap();
        assert_eq!(out.intent, Intent::Fallback);
        assert_eq!(s.messages().len(), 3);
        assert_eq!(s.messages()[2].id, out.assistant_message);
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_submit_with_latency_completes() {
        let mut s = ConversationSession::new();
        let out = s.submit("need a flight", Duration::from_millis(5)).await;
        assert_eq!(out.unwrap().intent, Intent::FlightOrHotelGeneric);
    }

    #[tokio::test]
    async fn test_submit_blank_returns_none() {
        let mut s = ConversationSession::new();
        assert!(s.submit("  ", Duration::ZERO).await.is_none());
        assert_eq!(s.messages().len(), 1);
    }

    #[test]
    fn test_complete_rejects_foreign_turn() {
        let mut a = ConversationSession::new();
        let mut b = ConversationSession::new();
        let from_a = a.begin("hello").unwrap();

        assert!(b.complete(from_a).is_none());
        assert_eq!(b.messages().len(), 1);
        assert_eq!(b.state(), SessionState::Idle);
        assert!(a.is_processing());
    }

    #[test]
    fn test_complete_on_idle_session_appends_nothing() {
        let mut a = ConversationSession::new();
        let p = a.begin("hello").unwrap();
        let stale = PendingTurn {
            user_message: p.user_message(),
            text: p.text().to_string(),
        };
        a.complete(p).unwrap();

        assert!(a.complete(stale).is_none());
        assert_eq!(a.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_submit_still_completes_turn() {
        let mut s = ConversationSession::new();
        let res = tokio::time::timeout(
            Duration::from_millis(10),
            s.submit("need a flight", Duration::from_millis(500)),
        )
        .await;
        assert!(res.is_err());

        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.messages().len(), 3);
        assert_eq!(s.messages()[1].sender, Sender::User);
        assert_eq!(s.messages()[2].sender, Sender::Assistant);

        let later = s.submit("hello", Duration::ZERO).await;
        assert!(later.is_some());
        assert_eq!(s.messages().len(), 5);
    }
}
