//! Session — the single owner of all chat state.
//!
//! DESIGN
//! ======
//! `Session` bundles the directories, conversation state, search debouncer,
//! clock and RNG. Every operation is a synchronous `&mut self` call that
//! returns the effects it wants scheduled; `fire` is the re-entry point
//! when one of those effects comes due. Nothing in here sleeps or spawns,
//! so tests can drive it step by step.
//!
//! `runtime` wraps a `Session` in a tokio task and exposes an async handle.

pub mod runtime;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::channels::ChannelDirectory;
use crate::clock::{Clock, SystemClock};
use crate::config::ChatConfig;
use crate::conversation::{ConversationState, Selection};
use crate::effect::Effect;
use crate::error::{ChatError, EntityKind};
use crate::fixture::Fixture;
use crate::model::{Channel, DirectMessage, Message, MessageTarget, Thread, UserId, Workspace};
use crate::search::{self, SearchCorpus, SearchDebouncer, SearchHit, SearchResult};
use crate::users::UserDirectory;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Everything a UI layer needs to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub workspace: Workspace,
    pub current_user_id: UserId,
    pub public_channels: Vec<Channel>,
    pub private_channels: Vec<Channel>,
    pub direct_messages: Vec<DirectMessage>,
    pub selection: Option<Selection>,
    pub thread: Option<Thread>,
    pub messages: Vec<Message>,
    pub loading: bool,
    pub sidebar_collapsed: bool,
    pub search_query: String,
    pub search_results: Vec<SearchResult>,
    pub search_pending: bool,
}

// =============================================================================
// SESSION
// =============================================================================

pub struct Session {
    workspace: Workspace,
    users: UserDirectory,
    channels: ChannelDirectory,
    conversation: ConversationState,
    search: SearchDebouncer,
    config: ChatConfig,
    clock: Arc<dyn Clock>,
    rng: StdRng,
}

impl Session {
    /// Boot from a fixture and open the first channel the current user
    /// belongs to.
    ///
    /// # Errors
    ///
    /// Fixture integrity errors from the directories.
    pub fn new(fixture: Fixture, config: ChatConfig, clock: Arc<dyn Clock>) -> Result<Self, ChatError> {
        let users = UserDirectory::new(fixture.users, fixture.current_user_id)?;
        let channels = ChannelDirectory::new(fixture.channels, fixture.direct_messages)?;
        let conversation = ConversationState::new(fixture.messages, users.current_user_id(), config);
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut session = Self {
            workspace: fixture.workspace,
            users,
            channels,
            conversation,
            search: SearchDebouncer::default(),
            config,
            clock,
            rng,
        };
        let first = session
            .channels
            .channels_for_member(session.users.current_user_id())
            .first()
            .map(|c| c.id.clone());
        if let Some(id) = first {
            session.select_channel(&id)?;
        }
        info!(workspace = %session.workspace.name, user_id = %session.users.current_user_id(), "session ready");
        Ok(session)
    }

    /// The seeded workspace on the system clock.
    ///
    /// # Errors
    ///
    /// Only if the built-in fixture is inconsistent.
    pub fn seeded(config: ChatConfig) -> Result<Self, ChatError> {
        Self::new(Fixture::seeded(), config, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    #[must_use]
    pub fn channels(&self) -> &ChannelDirectory {
        &self.channels
    }

    #[must_use]
    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    #[must_use]
    pub fn search_state(&self) -> &SearchDebouncer {
        &self.search
    }

    fn me(&self) -> &str {
        self.users.current_user_id()
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// # Errors
    ///
    /// `NotFound` for an unknown channel or a private one the current user
    /// is not in.
    pub fn select_channel(&mut self, id: &str) -> Result<(), ChatError> {
        if !self.can_view_channel(id) {
            return Err(ChatError::not_found(EntityKind::Channel, id));
        }
        self.channels.mark_read(&MessageTarget::Channel(id.to_string()));
        if let Some(channel) = self.channels.channel(id) {
            self.conversation.select_channel(channel);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown DM or one the current user is not part of.
    pub fn select_dm(&mut self, id: &str) -> Result<(), ChatError> {
        if !self.can_view_dm(id) {
            return Err(ChatError::not_found(EntityKind::DirectMessage, id));
        }
        self.channels.mark_read(&MessageTarget::Dm(id.to_string()));
        if let Some(dm) = self.channels.dm(id) {
            self.conversation.select_dm(dm);
        }
        Ok(())
    }

    fn can_view_channel(&self, id: &str) -> bool {
        self.channels.can_view(&MessageTarget::Channel(id.to_string()), self.me())
    }

    fn can_view_dm(&self, id: &str) -> bool {
        self.channels.can_view(&MessageTarget::Dm(id.to_string()), self.me())
    }

    /// Open the DM with `user_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if no DM exists between the current user and `user_id`.
    pub fn open_dm_with(&mut self, user_id: &str) -> Result<(), ChatError> {
        let id = self
            .channels
            .dm_for(self.me(), user_id)
            .map(|d| d.id.clone())
            .ok_or_else(|| ChatError::not_found(EntityKind::DirectMessage, user_id))?;
        self.select_dm(&id)
    }

    /// Jump to whatever a search result points at.
    ///
    /// # Errors
    ///
    /// `NotFound` when the target no longer resolves.
    pub fn activate(&mut self, hit: &SearchHit) -> Result<(), ChatError> {
        let result = match hit {
            SearchHit::Channel { id } => self.select_channel(id),
            SearchHit::User { id } => self.open_dm_with(id),
            SearchHit::Message { target: MessageTarget::Channel(id), .. } => self.select_channel(id),
            SearchHit::Message { target: MessageTarget::Dm(id), .. } => self.select_dm(id),
        };
        self.search.clear();
        result
    }

    // =========================================================================
    // MESSAGES
    // =========================================================================

    /// # Errors
    ///
    /// Validation errors from the conversation; nothing is scheduled then.
    pub fn send(&mut self, content: &str) -> Result<Vec<Effect>, ChatError> {
        Ok(vec![self.conversation.send(content)?])
    }

    /// # Errors
    ///
    /// `NotFound` if the message is not in the visible feed.
    pub fn toggle_reaction(&mut self, message_id: &str, emoji: &str) -> Result<bool, ChatError> {
        self.conversation.toggle_reaction(message_id, emoji)
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.conversation.toggle_sidebar()
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown parent message.
    pub fn open_thread(&mut self, parent_id: &str) -> Result<Thread, ChatError> {
        self.conversation.open_thread(parent_id).cloned()
    }

    pub fn close_thread(&mut self) {
        self.conversation.close_thread();
    }

    // =========================================================================
    // CHANNELS
    // =========================================================================

    /// # Errors
    ///
    /// Validation errors from the directory.
    pub fn create_channel(&mut self, name: &str, description: &str, is_private: bool) -> Result<Channel, ChatError> {
        let now = self.clock.now();
        let me = self.users.current_user_id().to_string();
        self.channels.create_channel(name, description, is_private, &me, now)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown channel.
    pub fn join_channel(&mut self, id: &str) -> Result<bool, ChatError> {
        let me = self.me().to_string();
        let joined = self.channels.join_channel(id, &me)?;
        self.refresh_selected_channel(id);
        Ok(joined)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown channel, `LastMember` for the last member.
    pub fn leave_channel(&mut self, id: &str) -> Result<bool, ChatError> {
        let me = self.me().to_string();
        let left = self.channels.leave_channel(id, &me)?;
        self.refresh_selected_channel(id);
        Ok(left)
    }

    /// Keep the selection's channel record in step with the directory.
    /// A private channel the user just left is no longer viewable, so the
    /// selection is dropped instead.
    fn refresh_selected_channel(&mut self, id: &str) {
        let selected = matches!(self.conversation.selection(), Some(Selection::Channel(c)) if c.id == id);
        if !selected {
            return;
        }
        match self.channels.channel(id) {
            Some(channel) if self.can_view_channel(id) => self.conversation.select_channel(channel),
            _ => {
                info!(channel_id = %id, "selected channel no longer viewable");
                self.conversation.clear_selection();
            }
        }
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Submit a query; the scan runs after the debounce window.
    pub fn search(&mut self, query: &str) -> Vec<Effect> {
        self.search
            .submit(query, self.config.search_debounce)
            .into_iter()
            .collect()
    }

    /// Run a query right now against the live corpus.
    #[must_use]
    pub fn search_now(&self, query: &str) -> Vec<SearchResult> {
        let corpus = SearchCorpus {
            users: &self.users,
            channels: &self.channels,
            messages: self.conversation.log(),
        };
        search::search(query, corpus, self.config.search_limit)
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Handle an effect whose delay has elapsed. May schedule follow-ups.
    pub fn fire(&mut self, effect: Effect) -> Vec<Effect> {
        debug!(kind = effect.kind(), "effect fired");
        match effect {
            Effect::Deliver { outgoing, .. } => {
                let repliers = self.repliers(&outgoing.target);
                let now = self.clock.now();
                let (_, reply) = self.conversation.deliver(outgoing, now, &repliers, &mut self.rng);
                reply.into_iter().collect()
            }
            Effect::AutoReply { reply, .. } => {
                let now = self.clock.now();
                self.conversation.receive_reply(reply, now);
                Vec::new()
            }
            Effect::RunSearch { ticket, .. } => {
                if self.search.is_current(&ticket) {
                    let results = self.search_now(&ticket.query);
                    self.search.apply(&ticket, results);
                }
                Vec::new()
            }
        }
    }

    /// Who may auto-reply in a conversation: the other channel members or
    /// the DM partner, falling back to everyone else.
    fn repliers(&self, target: &MessageTarget) -> Vec<UserId> {
        let me = self.me();
        let mut ids: Vec<UserId> = match target {
            MessageTarget::Channel(id) => self
                .channels
                .channel(id)
                .map(|c| c.members.iter().filter(|m| *m != me).cloned().collect())
                .unwrap_or_default(),
            MessageTarget::Dm(id) => self
                .channels
                .dm(id)
                .and_then(|d| d.partner_of(me))
                .into_iter()
                .cloned()
                .collect(),
        };
        if ids.is_empty() {
            ids = self.users.others().into_iter().map(|u| u.id.clone()).collect();
        }
        ids
    }

    // =========================================================================
    // VIEW
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        let me = self.me();
        let (public, private) = self.channels.partition_for_member(me);
        ViewSnapshot {
            workspace: self.workspace.clone(),
            current_user_id: me.to_string(),
            public_channels: public.into_iter().cloned().collect(),
            private_channels: private.into_iter().cloned().collect(),
            direct_messages: self.channels.dms_for_member(me).into_iter().cloned().collect(),
            selection: self.conversation.selection().cloned(),
            thread: self.conversation.thread().cloned(),
            messages: self.conversation.messages().to_vec(),
            loading: self.conversation.is_loading(),
            sidebar_collapsed: self.conversation.sidebar_collapsed(),
            search_query: self.search.query().to_string(),
            search_results: self.search.results().to_vec(),
            search_pending: self.search.is_pending(),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
