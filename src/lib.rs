//! Team-chat conversation core.
//!
//! A seeded workspace (users, channels, direct messages, messages) plus the
//! state machine a chat client drives: selecting conversations, sending
//! with simulated latency and auto-replies, reactions, threads, and a
//! debounced quick-switcher search. `session::runtime` runs it all on a
//! single tokio task behind an async handle.

pub mod channels;
pub mod clock;
pub mod config;
pub mod conversation;
pub mod effect;
pub mod error;
pub mod feed;
pub mod fixture;
pub mod model;
pub mod search;
pub mod session;
pub mod users;

pub use config::ChatConfig;
pub use error::{ChatError, ErrorCode, ValidationError};
pub use session::runtime::{SessionHandle, spawn};
pub use session::{Session, ViewSnapshot};
