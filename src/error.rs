//! Error taxonomy for chat operations.
//!
//! DESIGN
//! ======
//! Two families. `ValidationError` covers bad user input (channel names,
//! empty messages, membership rules) and is reported synchronously before
//! any state is touched. `ChatError::NotFound` covers operations that need
//! a concrete target (reaction toggles, thread opens, channel joins).
//! Plain lookups never error; they return `Option`.

use std::fmt;

/// Stable machine-readable codes a UI layer can match on.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// VALIDATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("channel name is required")]
    EmptyName,
    #[error("channel name must be between 2 and 21 characters (got {len})")]
    NameLength { len: usize },
    #[error("channel name can only contain letters, numbers, hyphens, and underscores: {name}")]
    NameCharset { name: String },
    #[error("a channel named #{name} already exists")]
    DuplicateName { name: String },
    #[error("channel description must be at most {max} characters (got {len})")]
    DescriptionTooLong { len: usize, max: usize },
    #[error("message content is empty")]
    EmptyMessage,
    #[error("no channel or direct message is selected")]
    NoSelection,
    #[error("cannot leave #{channel}: last member")]
    LastMember { channel: String },
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: EntityKind, id: String },
}

// =============================================================================
// CHAT ERROR
// =============================================================================

/// Kind of entity a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Channel,
    DirectMessage,
    Message,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Channel => "channel",
            Self::DirectMessage => "direct message",
            Self::Message => "message",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("chat session closed")]
    SessionClosed,
}

impl ChatError {
    pub(crate) fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::SessionClosed => "E_SESSION_CLOSED",
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
