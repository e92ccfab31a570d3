//! Diesel-backed `UserDirectory` adapter over the mirrored users table.
//!
//! Identity is owned elsewhere; this adapter only reads the projection the
//! reservation core needs (username and ban flag).

use async_trait::async_trait;

use crate::domain::ports::{UserAccount, UserDirectory, UserDirectoryError};
use crate::domain::UserId;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_error_map::{map_diesel_error_with, map_pool_error_with};
use super::models::UserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user directory port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserDirectoryError {
    map_pool_error_with(error, UserDirectoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserDirectoryError {
    map_diesel_error_with(
        error,
        UserDirectoryError::query,
        UserDirectoryError::connection,
    )
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|row| UserAccount {
            id: UserId::from_uuid(row.id),
            username: row.username,
            banned: row.banned,
        }))
    }
}
