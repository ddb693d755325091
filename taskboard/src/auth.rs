//! Identity of the user that owns the board.
//!
//! Authentication itself happens elsewhere; the board only asks who the current user is so
//! that created tasks and projects can be stamped with an owner.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("No user is signed in")]
    Unauthenticated,
}

/// Source of the current user's identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Identity: Send + Sync {
    /// Returns the current user, or fails if nobody is signed in.
    async fn me(&self) -> Result<User, Error>;
}

/// Identity taken from the server configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredIdentity {
    user: Option<User>,
}

impl ConfiguredIdentity {
    pub fn new(user: Option<User>) -> Self {
        Self { user }
    }

    /// Builds the identity from `user_id`, `user_email` and `user_display_name`.
    ///
    /// Without a user id nobody is signed in.
    pub fn from_config(config: &Config) -> Self {
        let user = config.user_id.as_ref().map(|id| User {
            id: id.clone(),
            email: config.user_email.clone().unwrap_or_default(),
            display_name: config.user_display_name.clone(),
        });
        Self::new(user)
    }
}

#[async_trait]
impl Identity for ConfiguredIdentity {
    async fn me(&self) -> Result<User, Error> {
        self.user.clone().ok_or(Error::Unauthenticated)
    }
}
