//! Channel and DM directory.
//!
//! DESIGN
//! ======
//! The directory owns every `Channel` and `DirectMessage` record. Other
//! components get shared references or clones and never edit them; all
//! membership and unread-count changes go through methods here.
//!
//! Channel creation commits the new channel to the directory, so it is
//! immediately listable and selectable.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{ChatError, EntityKind, ValidationError};
use crate::model::{Channel, DirectMessage, MessageTarget, UserId};

pub const CHANNEL_NAME_MIN: usize = 2;
pub const CHANNEL_NAME_MAX: usize = 21;
pub const CHANNEL_DESCRIPTION_MAX: usize = 250;

// =============================================================================
// NAME RULES
// =============================================================================

/// Lowercase and turn each whitespace run into a single hyphen.
fn normalize(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

fn allowed_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

/// Validate a user-typed channel name and return its normalized form.
///
/// # Errors
///
/// `EmptyName`, `NameLength` (trimmed length outside 2..=21), or
/// `NameCharset` when the normalized name has anything besides
/// `[a-z0-9_-]`.
pub fn validate_channel_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let len = trimmed.chars().count();
    if !(CHANNEL_NAME_MIN..=CHANNEL_NAME_MAX).contains(&len) {
        return Err(ValidationError::NameLength { len });
    }
    let name = normalize(trimmed);
    if !name.chars().all(allowed_name_char) {
        return Err(ValidationError::NameCharset { name });
    }
    Ok(name)
}

/// What the name field previews while typing: lowercased, each whitespace
/// run turned into a hyphen, disallowed characters stripped.
#[must_use]
pub fn preview_channel_name(raw: &str) -> String {
    let mut preview = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                preview.push('-');
            }
            in_space = true;
        } else {
            in_space = false;
            if allowed_name_char(c) {
                preview.push(c);
            }
        }
    }
    preview
}

// =============================================================================
// DIRECTORY
// =============================================================================

#[derive(Debug, Clone)]
pub struct ChannelDirectory {
    channels: Vec<Channel>,
    direct_messages: Vec<DirectMessage>,
}

impl ChannelDirectory {
    /// # Errors
    ///
    /// `DuplicateId` for repeated channel or DM ids, a DM whose two
    /// participants are the same user, or a second DM for the same pair.
    pub fn new(channels: Vec<Channel>, direct_messages: Vec<DirectMessage>) -> Result<Self, ChatError> {
        let mut channel_ids = HashSet::new();
        for channel in &channels {
            if !channel_ids.insert(channel.id.as_str()) {
                return Err(duplicate(EntityKind::Channel, &channel.id));
            }
        }

        let mut dm_ids = HashSet::new();
        let mut pairs = HashSet::new();
        for dm in &direct_messages {
            let [a, b] = &dm.participants;
            let pair = if a <= b { (a.as_str(), b.as_str()) } else { (b.as_str(), a.as_str()) };
            if !dm_ids.insert(dm.id.as_str()) || a == b || !pairs.insert(pair) {
                return Err(duplicate(EntityKind::DirectMessage, &dm.id));
            }
        }

        Ok(Self { channels, direct_messages })
    }

    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    #[must_use]
    pub fn direct_messages(&self) -> &[DirectMessage] {
        &self.direct_messages
    }

    #[must_use]
    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn dm(&self, id: &str) -> Option<&DirectMessage> {
        self.direct_messages.iter().find(|d| d.id == id)
    }

    /// Every public channel, joined or not.
    #[must_use]
    pub fn public_channels(&self) -> Vec<&Channel> {
        self.channels.iter().filter(|c| !c.is_private).collect()
    }

    #[must_use]
    pub fn channels_for_member(&self, user_id: &str) -> Vec<&Channel> {
        self.channels.iter().filter(|c| c.has_member(user_id)).collect()
    }

    /// `channels_for_member` split into (public, private).
    #[must_use]
    pub fn partition_for_member(&self, user_id: &str) -> (Vec<&Channel>, Vec<&Channel>) {
        self.channels_for_member(user_id)
            .into_iter()
            .partition(|c| !c.is_private)
    }

    #[must_use]
    pub fn public_for_member(&self, user_id: &str) -> Vec<&Channel> {
        self.partition_for_member(user_id).0
    }

    #[must_use]
    pub fn private_for_member(&self, user_id: &str) -> Vec<&Channel> {
        self.partition_for_member(user_id).1
    }

    /// The other participant of DM `dm_id` as seen by `me`.
    #[must_use]
    pub fn dm_partner(&self, dm_id: &str, me: &str) -> Option<&UserId> {
        self.dm(dm_id).and_then(|d| d.partner_of(me))
    }

    #[must_use]
    pub fn dms_for_member(&self, user_id: &str) -> Vec<&DirectMessage> {
        self.direct_messages
            .iter()
            .filter(|d| d.involves(user_id))
            .collect()
    }

    /// Whether `user_id` may open `target`: any public channel, a private
    /// channel they belong to, or a DM they take part in.
    #[must_use]
    pub fn can_view(&self, target: &MessageTarget, user_id: &str) -> bool {
        match target {
            MessageTarget::Channel(id) => self
                .channel(id)
                .is_some_and(|c| !c.is_private || c.has_member(user_id)),
            MessageTarget::Dm(id) => self.dm(id).is_some_and(|d| d.involves(user_id)),
        }
    }

    /// The DM between `a` and `b`, in either order.
    #[must_use]
    pub fn dm_for(&self, a: &str, b: &str) -> Option<&DirectMessage> {
        if a == b {
            return None;
        }
        self.direct_messages
            .iter()
            .find(|d| d.involves(a) && d.involves(b))
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Validate and commit a new channel owned by `creator`.
    ///
    /// # Errors
    ///
    /// Any name rule failure, `DuplicateName` when the normalized name is
    /// taken, `DescriptionTooLong` past 250 characters.
    pub fn create_channel(
        &mut self,
        name: &str,
        description: &str,
        is_private: bool,
        creator: &str,
        now: DateTime<Utc>,
    ) -> Result<Channel, ChatError> {
        let name = validate_channel_name(name)?;
        if self.channels.iter().any(|c| c.name == name) {
            return Err(ValidationError::DuplicateName { name }.into());
        }
        let description = description.trim();
        let len = description.chars().count();
        if len > CHANNEL_DESCRIPTION_MAX {
            return Err(ValidationError::DescriptionTooLong { len, max: CHANNEL_DESCRIPTION_MAX }.into());
        }

        let channel = Channel {
            id: format!("channel-{}", Uuid::new_v4()),
            name,
            description: (!description.is_empty()).then(|| description.to_string()),
            topic: None,
            is_private,
            members: vec![creator.to_string()],
            created_by: creator.to_string(),
            created_at: now,
            unread_count: 0,
        };
        info!(channel_id = %channel.id, name = %channel.name, is_private, "channel created");
        self.channels.push(channel.clone());
        Ok(channel)
    }

    /// Add `user_id` to a channel. Returns `false` if already a member.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown channel.
    pub fn join_channel(&mut self, channel_id: &str, user_id: &str) -> Result<bool, ChatError> {
        let channel = self.channel_mut(channel_id)?;
        if channel.has_member(user_id) {
            return Ok(false);
        }
        channel.members.push(user_id.to_string());
        info!(%channel_id, %user_id, "joined channel");
        Ok(true)
    }

    /// Remove `user_id` from a channel. Returns `false` if not a member.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown channel, `LastMember` if the channel would
    /// be left empty.
    pub fn leave_channel(&mut self, channel_id: &str, user_id: &str) -> Result<bool, ChatError> {
        let channel = self.channel_mut(channel_id)?;
        let Some(pos) = channel.members.iter().position(|m| m == user_id) else {
            return Ok(false);
        };
        if channel.members.len() == 1 {
            return Err(ValidationError::LastMember { channel: channel.name.clone() }.into());
        }
        channel.members.remove(pos);
        info!(%channel_id, %user_id, "left channel");
        Ok(true)
    }

    /// Clear the unread badge of a conversation. Returns the previous count.
    pub fn mark_read(&mut self, target: &MessageTarget) -> u32 {
        let slot = match target {
            MessageTarget::Channel(id) => self
                .channels
                .iter_mut()
                .find(|c| &c.id == id)
                .map(|c| &mut c.unread_count),
            MessageTarget::Dm(id) => self
                .direct_messages
                .iter_mut()
                .find(|d| &d.id == id)
                .map(|d| &mut d.unread_count),
        };
        slot.map_or(0, std::mem::take)
    }

    fn channel_mut(&mut self, id: &str) -> Result<&mut Channel, ChatError> {
        self.channels
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ChatError::not_found(EntityKind::Channel, id))
    }
}

fn duplicate(kind: EntityKind, id: &str) -> ChatError {
    ValidationError::DuplicateId { kind, id: id.to_string() }.into()
}

#[cfg(test)]
#[path = "channels_test.rs"]
mod tests;
