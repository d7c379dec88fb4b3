//! Registered users, identified by e-mail address.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user's identity: their e-mail address.
///
/// # Examples
/// ```
/// use platewise_core::UserId;
///
/// let user = UserId::new("ada@example.com")?;
/// assert_eq!(user.as_str(), "ada@example.com");
/// assert!(UserId::new("ada").is_err());
/// # Ok::<(), platewise_core::UserIdError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

/// Errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserIdError {
    /// No address was supplied.
    #[error("user e-mail must not be empty")]
    Empty,
    /// The address did not contain `@`.
    #[error("user e-mail {0:?} is not an e-mail address")]
    NotAnEmail(String),
}

impl UserId {
    /// Validate and wrap an e-mail address.
    ///
    /// # Errors
    /// Returns [`UserIdError`] for blank input or input without `@`.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserIdError> {
        let owned = raw.into();
        let trimmed = owned.trim();
        if trimmed.is_empty() {
            return Err(UserIdError::Empty);
        }
        if !trimmed.contains('@') {
            return Err(UserIdError::NotAnEmail(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// E-mail identity.
    pub id: UserId,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Input for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// E-mail identity.
    pub id: UserId,
    /// Optional display name.
    pub display_name: Option<String>,
}

impl NewUser {
    /// Register `id` without a display name.
    #[must_use]
    pub const fn new(id: UserId) -> Self {
        Self {
            id,
            display_name: None,
        }
    }

    /// Attach a display name, ignoring blank input.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into()).filter(|value| !value.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserIdError::Empty)]
    #[case("   ", UserIdError::Empty)]
    #[case("ada", UserIdError::NotAnEmail("ada".into()))]
    fn rejects_invalid_addresses(#[case] raw: &str, #[case] expected: UserIdError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    fn blank_display_name_is_dropped() {
        let user = UserId::new("ada@example.com").expect("valid user");
        let new_user = NewUser::new(user).with_display_name("  ");
        assert!(new_user.display_name.is_none());
    }
}
