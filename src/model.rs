//! Entity model — users, channels, direct messages, messages, reactions.
//!
//! DESIGN
//! ======
//! Pure data with serde derives so a UI layer can ship any of it as JSON.
//! The only behavior here is what keeps an entity's own invariants:
//! a message's target is a tagged variant (never both channel and DM, never
//! neither), and reactions are mutated only through `Message::toggle_reaction`
//! so `count` always equals the size of the user set.
//!
//! Reactions are stored sorted by emoji and each user set is ordered. That
//! makes a toggle followed by the same toggle restore the message exactly.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;
pub type ChannelId = String;
pub type DmId = String;
pub type MessageId = String;

// =============================================================================
// USERS
// =============================================================================

/// Presence status shown next to a user's avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    Away,
    Busy,
    Offline,
}

impl UserStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "Active",
            Self::Away => "Away",
            Self::Busy => "Do not disturb",
            Self::Offline => "Offline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub status: UserStatus,
    pub title: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub avatar: Option<String>,
    pub members: Vec<UserId>,
}

// =============================================================================
// CONVERSATIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub is_private: bool,
    /// Member ids in join order, no duplicates.
    pub members: Vec<UserId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub unread_count: u32,
}

impl Channel {
    #[must_use]
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

/// Two-participant private conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: DmId,
    pub participants: [UserId; 2],
    pub unread_count: u32,
}

impl DirectMessage {
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// The participant that is not `me`, if `me` takes part at all.
    #[must_use]
    pub fn partner_of(&self, me: &str) -> Option<&UserId> {
        match &self.participants {
            [a, b] if a == me => Some(b),
            [a, b] if b == me => Some(a),
            _ => None,
        }
    }
}

/// Where a message lives. Exactly one of channel or DM.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MessageTarget {
    Channel(ChannelId),
    Dm(DmId),
}

impl MessageTarget {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Channel(id) | Self::Dm(id) => id,
        }
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub author_id: UserId,
    pub target: MessageTarget,
    /// Set on thread replies.
    pub parent_id: Option<MessageId>,
    pub timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_reactions")]
    reactions: Vec<Reaction>,
    pub attachments: Vec<Attachment>,
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    #[must_use]
    pub fn new(
        id: impl Into<MessageId>,
        content: impl Into<String>,
        author_id: impl Into<UserId>,
        target: MessageTarget,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author_id: author_id.into(),
            target,
            parent_id: None,
            timestamp,
            reactions: Vec::new(),
            attachments: Vec::new(),
            edited: false,
            edited_at: None,
        }
    }

    /// Replace the reaction list. Empty reactions are dropped and the rest
    /// are put in canonical order; a repeated emoji merges its user sets.
    #[must_use]
    pub fn with_reactions(mut self, reactions: Vec<Reaction>) -> Self {
        self.reactions = canonical_reactions(reactions);
        self
    }

    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    #[must_use]
    pub fn in_thread(mut self, parent_id: impl Into<MessageId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    #[must_use]
    pub fn reaction(&self, emoji: &str) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.emoji == emoji)
    }

    /// Add `user_id` to the `emoji` reaction, or remove them if already
    /// present. Returns `true` when the user is now reacting.
    pub fn toggle_reaction(&mut self, emoji: &str, user_id: &str) -> bool {
        match self.reactions.binary_search_by(|r| r.emoji.as_str().cmp(emoji)) {
            Ok(pos) => {
                let reaction = &mut self.reactions[pos];
                if reaction.users.remove(user_id) {
                    reaction.count = reaction.users.len();
                    if reaction.count == 0 {
                        self.reactions.remove(pos);
                    }
                    false
                } else {
                    reaction.users.insert(user_id.to_string());
                    reaction.count = reaction.users.len();
                    true
                }
            }
            Err(pos) => {
                self.reactions.insert(pos, Reaction::new(emoji, [user_id]));
                true
            }
        }
    }
}

fn canonical_reactions(reactions: Vec<Reaction>) -> Vec<Reaction> {
    let mut out: Vec<Reaction> = Vec::with_capacity(reactions.len());
    for reaction in reactions {
        if reaction.users.is_empty() {
            continue;
        }
        match out.binary_search_by(|r| r.emoji.cmp(&reaction.emoji)) {
            Ok(pos) => {
                let existing = &mut out[pos];
                existing.users.extend(reaction.users);
                existing.count = existing.users.len();
            }
            Err(pos) => out.insert(pos, reaction),
        }
    }
    out
}

/// Incoming reaction lists go through the same normalization as
/// `with_reactions`.
fn deserialize_reactions<'de, D>(deserializer: D) -> Result<Vec<Reaction>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Vec::<Reaction>::deserialize(deserializer).map(canonical_reactions)
}

/// An emoji and the set of users who applied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReactionRecord")]
pub struct Reaction {
    emoji: String,
    users: BTreeSet<UserId>,
    count: usize,
}

impl Reaction {
    #[must_use]
    pub fn new<I, S>(emoji: impl Into<String>, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UserId>,
    {
        let users: BTreeSet<UserId> = users.into_iter().map(Into::into).collect();
        let count = users.len();
        Self { emoji: emoji.into(), users, count }
    }

    #[must_use]
    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    pub fn users(&self) -> impl Iterator<Item = &UserId> {
        self.users.iter()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn includes(&self, user_id: &str) -> bool {
        self.users.contains(user_id)
    }
}

/// Wire shape of a reaction. `count` is recomputed from `users`.
#[derive(Deserialize)]
struct ReactionRecord {
    emoji: String,
    users: Vec<UserId>,
}

impl From<ReactionRecord> for Reaction {
    fn from(record: ReactionRecord) -> Self {
        Self::new(record.emoji, record.users)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    File,
    Video,
    Audio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub kind: AttachmentKind,
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    pub thumbnail: Option<String>,
}

/// Replies anchored to a parent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub parent_message_id: MessageId,
    pub replies: Vec<Message>,
    pub reply_count: usize,
    pub last_reply: Option<DateTime<Utc>>,
}

impl Thread {
    #[must_use]
    pub fn new(parent_message_id: impl Into<MessageId>, mut replies: Vec<Message>) -> Self {
        replies.sort_by_key(|m| m.timestamp);
        let last_reply = replies.last().map(|m| m.timestamp);
        Self { parent_message_id: parent_message_id.into(), reply_count: replies.len(), replies, last_reply }
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
