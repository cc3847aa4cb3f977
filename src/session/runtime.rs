//! Session runtime — one tokio task owns the `Session`.
//!
//! DESIGN
//! ======
//! Callers talk to the task through `SessionHandle`: each method sends a
//! `Command` over a bounded mpsc queue and awaits a oneshot reply. Effects
//! returned by the session become sleeper tasks that post the effect back
//! into the task's own queue when their delay elapses, so state is only
//! ever touched from the loop. After every command or fired effect the
//! loop publishes a fresh `ViewSnapshot` on a watch channel.
//!
//! The pending search sleeper is aborted whenever a new query comes in.
//! The generation check in the debouncer makes a late arrival harmless
//! anyway; aborting just avoids a wasted wakeup.
//!
//! The task exits once every handle is dropped.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{Session, ViewSnapshot};
use crate::effect::Effect;
use crate::error::ChatError;
use crate::model::{Channel, Thread};
use crate::search::SearchHit;

const COMMAND_QUEUE_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, ChatError>>;

enum Command {
    SelectChannel { id: String, reply: Reply<()> },
    SelectDm { id: String, reply: Reply<()> },
    OpenDmWith { user_id: String, reply: Reply<()> },
    Send { content: String, reply: Reply<()> },
    ToggleReaction { message_id: String, emoji: String, reply: Reply<bool> },
    ToggleSidebar { reply: oneshot::Sender<bool> },
    CreateChannel { name: String, description: String, is_private: bool, reply: Reply<Channel> },
    JoinChannel { id: String, reply: Reply<bool> },
    LeaveChannel { id: String, reply: Reply<bool> },
    OpenThread { parent_id: String, reply: Reply<Thread> },
    CloseThread,
    Search { query: String },
    Activate { hit: SearchHit, reply: Reply<()> },
    Snapshot { reply: oneshot::Sender<ViewSnapshot> },
}

// =============================================================================
// SPAWN
// =============================================================================

/// Move `session` into a new task and return a handle to it.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn spawn(session: Session) -> SessionHandle {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let (view_tx, view_rx) = watch::channel(session.snapshot());
    tokio::spawn(run(session, rx, view_tx));
    SessionHandle { commands: tx, view: view_rx }
}

async fn run(mut session: Session, mut commands: mpsc::Receiver<Command>, view: watch::Sender<ViewSnapshot>) {
    let (fired_tx, mut fired_rx) = mpsc::unbounded_channel::<Effect>();
    let mut pending_search: Option<JoinHandle<()>> = None;

    info!("session runtime started");
    loop {
        let effects = tokio::select! {
            maybe_command = commands.recv() => {
                let Some(command) = maybe_command else { break };
                if matches!(command, Command::Search { .. }) {
                    if let Some(handle) = pending_search.take() {
                        handle.abort();
                    }
                }
                dispatch(&mut session, command)
            }
            Some(effect) = fired_rx.recv() => session.fire(effect),
        };

        for effect in effects {
            let is_search = matches!(effect, Effect::RunSearch { .. });
            let handle = schedule(effect, fired_tx.clone());
            if is_search {
                pending_search = Some(handle);
            }
        }
        view.send_replace(session.snapshot());
    }

    if let Some(handle) = pending_search {
        handle.abort();
    }
    info!("session runtime stopped");
}

fn schedule(effect: Effect, fired: mpsc::UnboundedSender<Effect>) -> JoinHandle<()> {
    let delay = effect.delay();
    debug!(kind = effect.kind(), delay_ms = delay.as_millis(), "effect scheduled");
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        // Receiver is gone only when the runtime has stopped.
        let _ = fired.send(effect);
    })
}

/// Apply one command. Returns the effects it produced.
fn dispatch(session: &mut Session, command: Command) -> Vec<Effect> {
    match command {
        Command::SelectChannel { id, reply } => {
            let _ = reply.send(session.select_channel(&id));
        }
        Command::SelectDm { id, reply } => {
            let _ = reply.send(session.select_dm(&id));
        }
        Command::OpenDmWith { user_id, reply } => {
            let _ = reply.send(session.open_dm_with(&user_id));
        }
        Command::Send { content, reply } => {
            return match session.send(&content) {
                Ok(effects) => {
                    let _ = reply.send(Ok(()));
                    effects
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                    Vec::new()
                }
            };
        }
        Command::ToggleReaction { message_id, emoji, reply } => {
            let _ = reply.send(session.toggle_reaction(&message_id, &emoji));
        }
        Command::ToggleSidebar { reply } => {
            let _ = reply.send(session.toggle_sidebar());
        }
        Command::CreateChannel { name, description, is_private, reply } => {
            let _ = reply.send(session.create_channel(&name, &description, is_private));
        }
        Command::JoinChannel { id, reply } => {
            let _ = reply.send(session.join_channel(&id));
        }
        Command::LeaveChannel { id, reply } => {
            let _ = reply.send(session.leave_channel(&id));
        }
        Command::OpenThread { parent_id, reply } => {
            let _ = reply.send(session.open_thread(&parent_id));
        }
        Command::CloseThread => session.close_thread(),
        Command::Search { query } => return session.search(&query),
        Command::Activate { hit, reply } => {
            let _ = reply.send(session.activate(&hit));
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(session.snapshot());
        }
    }
    Vec::new()
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable async front end to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<ViewSnapshot>,
}

impl SessionHandle {
    async fn post(&self, command: Command) -> Result<(), ChatError> {
        self.commands.send(command).await.map_err(|_| ChatError::SessionClosed)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, ChatError> {
        let (tx, rx) = oneshot::channel();
        self.post(make(tx)).await?;
        rx.await.map_err(|_| ChatError::SessionClosed)
    }

    /// # Errors
    ///
    /// `NotFound`, or `SessionClosed` if the runtime is gone.
    pub async fn select_channel(&self, id: impl Into<String>) -> Result<(), ChatError> {
        let id = id.into();
        self.request(|reply| Command::SelectChannel { id, reply }).await?
    }

    /// # Errors
    ///
    /// `NotFound`, or `SessionClosed` if the runtime is gone.
    pub async fn select_dm(&self, id: impl Into<String>) -> Result<(), ChatError> {
        let id = id.into();
        self.request(|reply| Command::SelectDm { id, reply }).await?
    }

    /// # Errors
    ///
    /// `NotFound` when no DM exists with `user_id`.
    pub async fn open_dm_with(&self, user_id: impl Into<String>) -> Result<(), ChatError> {
        let user_id = user_id.into();
        self.request(|reply| Command::OpenDmWith { user_id, reply }).await?
    }

    /// Queue a message. Resolves once accepted; delivery happens later.
    ///
    /// # Errors
    ///
    /// `EmptyMessage` or `NoSelection`.
    pub async fn send(&self, content: impl Into<String>) -> Result<(), ChatError> {
        let content = content.into();
        self.request(|reply| Command::Send { content, reply }).await?
    }

    /// # Errors
    ///
    /// `NotFound` if the message is not in the visible feed.
    pub async fn toggle_reaction(
        &self,
        message_id: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Result<bool, ChatError> {
        let (message_id, emoji) = (message_id.into(), emoji.into());
        self.request(|reply| Command::ToggleReaction { message_id, emoji, reply }).await?
    }

    /// # Errors
    ///
    /// `SessionClosed` if the runtime is gone.
    pub async fn toggle_sidebar(&self) -> Result<bool, ChatError> {
        self.request(|reply| Command::ToggleSidebar { reply }).await
    }

    /// # Errors
    ///
    /// Channel validation errors.
    pub async fn create_channel(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        is_private: bool,
    ) -> Result<Channel, ChatError> {
        let (name, description) = (name.into(), description.into());
        self.request(|reply| Command::CreateChannel { name, description, is_private, reply }).await?
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown channel.
    pub async fn join_channel(&self, id: impl Into<String>) -> Result<bool, ChatError> {
        let id = id.into();
        self.request(|reply| Command::JoinChannel { id, reply }).await?
    }

    /// # Errors
    ///
    /// `NotFound` or `LastMember`.
    pub async fn leave_channel(&self, id: impl Into<String>) -> Result<bool, ChatError> {
        let id = id.into();
        self.request(|reply| Command::LeaveChannel { id, reply }).await?
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown parent.
    pub async fn open_thread(&self, parent_id: impl Into<String>) -> Result<Thread, ChatError> {
        let parent_id = parent_id.into();
        self.request(|reply| Command::OpenThread { parent_id, reply }).await?
    }

    /// # Errors
    ///
    /// `SessionClosed` if the runtime is gone.
    pub async fn close_thread(&self) -> Result<(), ChatError> {
        self.post(Command::CloseThread).await
    }

    /// Submit a quick-switcher query. Results show up in the view after
    /// the debounce window.
    ///
    /// # Errors
    ///
    /// `SessionClosed` if the runtime is gone.
    pub async fn search(&self, query: impl Into<String>) -> Result<(), ChatError> {
        self.post(Command::Search { query: query.into() }).await
    }

    /// # Errors
    ///
    /// `NotFound` when the result's target no longer resolves.
    pub async fn activate(&self, hit: SearchHit) -> Result<(), ChatError> {
        self.request(|reply| Command::Activate { hit, reply }).await?
    }

    /// Current view, taken after every queued command has been applied.
    ///
    /// # Errors
    ///
    /// `SessionClosed` if the runtime is gone.
    pub async fn snapshot(&self) -> Result<ViewSnapshot, ChatError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Watch channel that receives a new view after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.view.clone()
    }
}

#[cfg(test)]
#[path = "runtime_test.rs"]
mod tests;
