//! Quick-switcher search over channels, people and messages.
//!
//! DESIGN
//! ======
//! `search` is a pure linear scan: no index is kept, the corpus is small
//! and fixed. Matching is a case-insensitive substring test.
//!
//! Channel hits cover the channels the user belongs to. Message hits cover
//! every conversation the user can open (public channels included), so
//! activating any result resolves.
//!
//! Ordering is a total order so sorting is well defined: channels first,
//! then people, both by title; then messages newest first with title as a
//! tiebreak. The result list is truncated to the configured limit.
//!
//! `SearchDebouncer` owns the "last query wins" rule. Every submission
//! bumps a generation; a scan whose ticket is not the latest generation is
//! discarded when it completes.

use std::cmp::Ordering;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channels::ChannelDirectory;
use crate::effect::Effect;
use crate::model::{ChannelId, Message, MessageId, MessageTarget, UserId};
use crate::users::UserDirectory;

const MESSAGE_TITLE_CHARS: usize = 60;

// =============================================================================
// RESULTS
// =============================================================================

/// Source kind of a result. Declaration order is the display rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Channel,
    User,
    Message,
}

/// What a result points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchHit {
    Channel { id: ChannelId },
    User { id: UserId },
    Message { id: MessageId, target: MessageTarget },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub hit: SearchHit,
    pub title: String,
    pub subtitle: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl SearchResult {
    #[must_use]
    pub fn kind(&self) -> SearchKind {
        match self.hit {
            SearchHit::Channel { .. } => SearchKind::Channel,
            SearchHit::User { .. } => SearchKind::User,
            SearchHit::Message { .. } => SearchKind::Message,
        }
    }
}

/// Read-only view of everything searchable.
#[derive(Debug, Clone, Copy)]
pub struct SearchCorpus<'a> {
    pub users: &'a UserDirectory,
    pub channels: &'a ChannelDirectory,
    pub messages: &'a [Message],
}

// =============================================================================
// SCAN
// =============================================================================

/// Run a query against the corpus. Blank queries return nothing.
#[must_use]
pub fn search(query: &str, corpus: SearchCorpus<'_>, limit: usize) -> Vec<SearchResult> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let hit = |text: &str| contains(text, &needle);
    let hit_opt = |text: Option<&String>| text.is_some_and(|t| contains(t, &needle));

    let me = corpus.users.current_user_id();
    let mut results = Vec::new();

    for channel in corpus.channels.channels_for_member(me) {
        if hit(channel.name.as_str()) || hit_opt(channel.description.as_ref()) {
            results.push(SearchResult {
                hit: SearchHit::Channel { id: channel.id.clone() },
                title: channel.name.clone(),
                subtitle: channel.description.clone().unwrap_or_else(|| "Channel".into()),
                timestamp: None,
            });
        }
    }

    for user in corpus.users.others() {
        if hit(user.name.as_str()) || hit(user.email.as_str()) || hit_opt(user.title.as_ref()) {
            results.push(SearchResult {
                hit: SearchHit::User { id: user.id.clone() },
                title: user.name.clone(),
                subtitle: user.title.clone().unwrap_or_else(|| user.email.clone()),
                timestamp: None,
            });
        }
    }

    for message in corpus.messages {
        if hit(message.content.as_str()) && corpus.channels.can_view(&message.target, me) {
            results.push(SearchResult {
                hit: SearchHit::Message { id: message.id.clone(), target: message.target.clone() },
                title: message_title(&message.content),
                subtitle: message_subtitle(message, corpus),
                timestamp: Some(message.timestamp),
            });
        }
    }

    results.sort_by(rank);
    results.truncate(limit);
    debug!(query = %needle, hits = results.len(), "search complete");
    results
}

fn contains(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(needle)
}

fn message_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(MESSAGE_TITLE_CHARS).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}

fn message_subtitle(message: &Message, corpus: SearchCorpus<'_>) -> String {
    let author = corpus.users.display_name(&message.author_id);
    let place = match &message.target {
        MessageTarget::Channel(id) => corpus
            .channels
            .channel(id)
            .map_or_else(|| "Direct Message".to_string(), |c| format!("#{}", c.name)),
        MessageTarget::Dm(_) => "Direct Message".to_string(),
    };
    format!("From {author} in {place}")
}

fn rank(a: &SearchResult, b: &SearchResult) -> Ordering {
    a.kind()
        .cmp(&b.kind())
        .then_with(|| match (a.timestamp, b.timestamp) {
            (Some(x), Some(y)) => y.cmp(&x),
            _ => Ordering::Equal,
        })
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.title.cmp(&b.title))
}

// =============================================================================
// DEBOUNCE
// =============================================================================

/// Identifies one scheduled scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchDebouncer {
    generation: u64,
    query: String,
    results: Vec<SearchResult>,
    pending: bool,
}

impl SearchDebouncer {
    /// Record a new query, superseding any pending scan. A blank query
    /// clears results at once and schedules nothing.
    pub fn submit(&mut self, query: &str, debounce: Duration) -> Option<Effect> {
        self.generation += 1;
        self.query = query.to_string();
        if query.trim().is_empty() {
            self.results.clear();
            self.pending = false;
            return None;
        }
        self.pending = true;
        let ticket = SearchTicket { generation: self.generation, query: self.query.clone() };
        Some(Effect::RunSearch { ticket, after: debounce })
    }

    #[must_use]
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Store results for `ticket` if it is still the latest query.
    /// Returns `false` and drops the results otherwise.
    pub fn apply(&mut self, ticket: &SearchTicket, results: Vec<SearchResult>) -> bool {
        if !self.is_current(ticket) {
            debug!(stale = ticket.generation, current = self.generation, "stale search dropped");
            return false;
        }
        self.results = results;
        self.pending = false;
        true
    }

    /// Forget the query and results, e.g. when the switcher closes.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.query.clear();
        self.results.clear();
        self.pending = false;
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
