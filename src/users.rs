//! User directory — read-only lookups over the workspace members.

use std::collections::HashSet;

use crate::error::{ChatError, EntityKind, ValidationError};
use crate::model::{User, UserId, UserStatus};

#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: Vec<User>,
    current_user_id: UserId,
    /// Index of the current user in `users`, fixed at construction.
    current: usize,
}

impl UserDirectory {
    /// Build the directory, checking that ids are unique and that the
    /// acting user is one of them.
    ///
    /// # Errors
    ///
    /// `DuplicateId` for a repeated id, `NotFound` if `current_user_id`
    /// names no user.
    pub fn new(users: Vec<User>, current_user_id: impl Into<UserId>) -> Result<Self, ChatError> {
        let current_user_id = current_user_id.into();
        let mut seen = HashSet::new();
        for user in &users {
            if !seen.insert(user.id.as_str()) {
                return Err(ValidationError::DuplicateId { kind: EntityKind::User, id: user.id.clone() }.into());
            }
        }
        let Some(current) = users.iter().position(|u| u.id == current_user_id) else {
            return Err(ChatError::not_found(EntityKind::User, current_user_id));
        };
        Ok(Self { users, current_user_id, current })
    }

    #[must_use]
    pub fn all(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    #[must_use]
    pub fn current_user_id(&self) -> &str {
        &self.current_user_id
    }

    #[must_use]
    pub fn current_user(&self) -> &User {
        &self.users[self.current]
    }

    /// Everyone except the current user, in directory order.
    #[must_use]
    pub fn others(&self) -> Vec<&User> {
        self.users.iter().filter(|u| u.id != self.current_user_id).collect()
    }

    /// Resolve `ids` in the order given, skipping unknown ones.
    #[must_use]
    pub fn resolve_many<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&User> {
        ids.iter().filter_map(|id| self.resolve(id.as_ref())).collect()
    }

    #[must_use]
    pub fn online_others(&self) -> Vec<&User> {
        self.others()
            .into_iter()
            .filter(|u| u.status == UserStatus::Online)
            .collect()
    }

    /// Display name for an id, falling back to the raw id.
    #[must_use]
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.resolve(id).map_or(id, |u| u.name.as_str())
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
