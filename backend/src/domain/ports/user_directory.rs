//! Port for the external identity directory.
//!
//! The directory owns accounts, usernames and the ban flag; the reservation
//! core only reads it to authorise principals and to derive per-principal
//! cache keys.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

/// Account projection the core consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub banned: bool,
}

define_port_error! {
    /// Errors surfaced by user directory adapters.
    pub enum UserDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } => "user directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } => "user directory lookup failed: {message}",
    }
}

/// Port for resolving principals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up an account by principal id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserDirectoryError>;
}

/// Fixture directory that resolves every id to an active account whose
/// username is the id's canonical text.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserDirectory;

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserDirectoryError> {
        Ok(Some(UserAccount {
            id: *id,
            username: id.to_string(),
            banned: false,
        }))
    }
}
