//! Conversation state — selection, visible feed, and message mutation.
//!
//! DESIGN
//! ======
//! One owned struct, one writer. It holds the full message log plus the
//! visible slice for the active selection. Selecting a channel or DM
//! rebuilds the visible slice from the log (sorted by timestamp, never
//! merged). Sends, deliveries and reaction toggles mutate both copies so a
//! later reselection sees the same data.
//!
//! Anything that has to happen later comes back as an `Effect` for the
//! session runtime to schedule. Randomness and the current time are passed
//! in, so every transition is deterministic under test.
//!
//! INVARIANTS
//! ==========
//! - `messages` == log entries whose target is the selection, ascending.
//! - Appends never reorder: a new message's timestamp is clamped to be no
//!   earlier than the newest message already in its conversation.
//! - `loading` is true while at least one send is waiting for delivery.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::effect::{AutoReply, Effect, Outgoing};
use crate::error::{ChatError, EntityKind, ValidationError};
use crate::model::{Channel, DirectMessage, Message, MessageId, MessageTarget, Thread, UserId};

/// Canned lines used for simulated replies.
pub const AUTO_REPLY_LINES: [&str; 8] = [
    "Thanks for sharing that!",
    "Interesting point 🤔",
    "I agree with that approach",
    "Let me think about this...",
    "Good idea! 💡",
    "Makes sense to me",
    "I'll look into this",
    "Thanks for the update!",
];

// =============================================================================
// SELECTION
// =============================================================================

/// The conversation currently shown in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Channel(Channel),
    Dm(DirectMessage),
}

impl Selection {
    #[must_use]
    pub fn target(&self) -> MessageTarget {
        match self {
            Self::Channel(c) => MessageTarget::Channel(c.id.clone()),
            Self::Dm(d) => MessageTarget::Dm(d.id.clone()),
        }
    }

    #[must_use]
    pub fn matches(&self, target: &MessageTarget) -> bool {
        match (self, target) {
            (Self::Channel(c), MessageTarget::Channel(id)) => &c.id == id,
            (Self::Dm(d), MessageTarget::Dm(id)) => &d.id == id,
            _ => false,
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone)]
pub struct ConversationState {
    current_user_id: UserId,
    config: ChatConfig,
    log: Vec<Message>,
    selection: Option<Selection>,
    thread: Option<Thread>,
    messages: Vec<Message>,
    in_flight: usize,
    sidebar_collapsed: bool,
}

impl ConversationState {
    #[must_use]
    pub fn new(log: Vec<Message>, current_user_id: impl Into<UserId>, config: ChatConfig) -> Self {
        Self {
            current_user_id: current_user_id.into(),
            config,
            log,
            selection: None,
            thread: None,
            messages: Vec::new(),
            in_flight: 0,
            sidebar_collapsed: false,
        }
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn thread(&self) -> Option<&Thread> {
        self.thread.as_ref()
    }

    /// Visible messages for the active selection, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Every message in every conversation, in append order.
    #[must_use]
    pub fn log(&self) -> &[Message] {
        &self.log
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    #[must_use]
    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    pub fn select_channel(&mut self, channel: &Channel) {
        info!(channel_id = %channel.id, "select channel");
        self.select(Selection::Channel(channel.clone()));
    }

    pub fn select_dm(&mut self, dm: &DirectMessage) {
        info!(dm_id = %dm.id, "select direct message");
        self.select(Selection::Dm(dm.clone()));
    }

    fn select(&mut self, selection: Selection) {
        let target = selection.target();
        let mut messages: Vec<Message> = self
            .log
            .iter()
            .filter(|m| m.target == target)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);

        self.selection = Some(selection);
        self.thread = None;
        self.messages = messages;
    }

    /// Drop the selection, e.g. after losing access to it.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.thread = None;
        self.messages.clear();
    }

    // =========================================================================
    // SENDING
    // =========================================================================

    /// Accept a message for delivery after the configured latency.
    ///
    /// # Errors
    ///
    /// `EmptyMessage` for blank content, `NoSelection` with nothing
    /// selected. State is untouched on error.
    pub fn send(&mut self, content: &str) -> Result<Effect, ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        let Some(selection) = &self.selection else {
            return Err(ValidationError::NoSelection.into());
        };

        let outgoing = Outgoing { target: selection.target(), content: content.to_string() };
        self.in_flight += 1;
        debug!(target = %outgoing.target.id(), in_flight = self.in_flight, "send accepted");
        Ok(Effect::Deliver { outgoing, after: self.config.send_latency })
    }

    /// Land a previously accepted message. `repliers` are the users who may
    /// answer it; an auto-reply is rolled only when that list is non-empty.
    pub fn deliver<R: Rng + ?Sized>(
        &mut self,
        outgoing: Outgoing,
        now: DateTime<Utc>,
        repliers: &[UserId],
        rng: &mut R,
    ) -> (MessageId, Option<Effect>) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let message = Message::new(
            format!("msg-{}", Uuid::new_v4()),
            outgoing.content,
            self.current_user_id.clone(),
            outgoing.target.clone(),
            now,
        );
        let id = self.append(message);

        let reply = self.roll_auto_reply(&outgoing.target, repliers, rng);
        (id, reply)
    }

    fn roll_auto_reply<R: Rng + ?Sized>(
        &self,
        target: &MessageTarget,
        repliers: &[UserId],
        rng: &mut R,
    ) -> Option<Effect> {
        if repliers.is_empty() || !rng.random_bool(self.config.reply_probability) {
            return None;
        }
        let author_id = repliers.choose(rng)?.clone();
        let content = (*AUTO_REPLY_LINES.choose(rng)?).to_string();
        let (min, max) = (self.config.reply_min_delay, self.config.reply_max_delay);
        let after: Duration = if max > min { rng.random_range(min..max) } else { min };

        debug!(target = %target.id(), %author_id, delay_ms = after.as_millis(), "auto-reply scheduled");
        Some(Effect::AutoReply { reply: AutoReply { target: target.clone(), author_id, content }, after })
    }

    /// Append a simulated reply.
    pub fn receive_reply(&mut self, reply: AutoReply, now: DateTime<Utc>) -> MessageId {
        let message = Message::new(
            format!("msg-{}-response", Uuid::new_v4()),
            reply.content,
            reply.author_id,
            reply.target,
            now,
        );
        self.append(message)
    }

    fn append(&mut self, mut message: Message) -> MessageId {
        let newest = self
            .log
            .iter()
            .filter(|m| m.target == message.target)
            .map(|m| m.timestamp)
            .max();
        if let Some(newest) = newest {
            message.timestamp = message.timestamp.max(newest);
        }

        let id = message.id.clone();
        if self.selection.as_ref().is_some_and(|s| s.matches(&message.target)) {
            self.messages.push(message.clone());
        }
        info!(message_id = %id, author_id = %message.author_id, target = %message.target.id(), "message appended");
        self.log.push(message);
        id
    }

    // =========================================================================
    // REACTIONS / THREADS / CHROME
    // =========================================================================

    /// Toggle the current user's `emoji` reaction on a visible message.
    /// Returns `true` if the reaction is now applied.
    ///
    /// # Errors
    ///
    /// `NotFound` if no visible message has `message_id`.
    pub fn toggle_reaction(&mut self, message_id: &str, emoji: &str) -> Result<bool, ChatError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| ChatError::not_found(EntityKind::Message, message_id))?;

        let applied = message.toggle_reaction(emoji, &self.current_user_id);
        if let Some(stored) = self.log.iter_mut().find(|m| m.id == message_id) {
            stored.clone_from(message);
        }
        debug!(%message_id, %emoji, applied, "reaction toggled");
        Ok(applied)
    }

    /// Open the reply thread under `parent_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the parent is not in the log.
    pub fn open_thread(&mut self, parent_id: &str) -> Result<&Thread, ChatError> {
        if !self.log.iter().any(|m| m.id == parent_id) {
            return Err(ChatError::not_found(EntityKind::Message, parent_id));
        }
        let replies = self
            .log
            .iter()
            .filter(|m| m.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect();
        Ok(self.thread.insert(Thread::new(parent_id, replies)))
    }

    pub fn close_thread(&mut self) {
        self.thread = None;
    }

    /// Returns the new collapsed state.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        self.sidebar_collapsed
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
