//! Deferred work returned by state transitions.
//!
//! Transitions never sleep or spawn. They return `Effect`s; the session
//! runtime turns each into a timer that posts the effect back to the task
//! owning the state once `delay()` has elapsed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{MessageTarget, UserId};
use crate::search::SearchTicket;

/// A message accepted by `send`, waiting out the simulated latency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outgoing {
    pub target: MessageTarget,
    pub content: String,
}

/// A canned response scheduled after a delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoReply {
    pub target: MessageTarget,
    pub author_id: UserId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Deliver { outgoing: Outgoing, after: Duration },
    AutoReply { reply: AutoReply, after: Duration },
    RunSearch { ticket: SearchTicket, after: Duration },
}

impl Effect {
    #[must_use]
    pub fn delay(&self) -> Duration {
        match self {
            Self::Deliver { after, .. } | Self::AutoReply { after, .. } | Self::RunSearch { after, .. } => *after,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deliver { .. } => "deliver",
            Self::AutoReply { .. } => "auto_reply",
            Self::RunSearch { .. } => "run_search",
        }
    }
}
