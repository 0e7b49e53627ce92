// Itinerary
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.


//! Database abstraction to manipulate users and their access tokens.

use crate::model::{AccessToken, HashedPassword, User, Username};
use itinerary_core::db::sqlite::{self, build_timestamp, map_sqlx_error, unpack_timestamp};
use itinerary_core::db::{DbError, DbResult, Executor};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::OffsetDateTime;


/// Initializes the database schema.
///
/// Services that reference users from their own tables must call this before initializing their
/// own schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    sqlite::run_schema(ex, include_str!("sqlite.sql")).await
}

impl TryFrom<SqliteRow> for User {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let username: String = row.try_get("username").map_err(map_sqlx_error)?;
        let password: String = row.try_get("password").map_err(map_sqlx_error)?;
        let created_at_secs: i64 = row.try_get("created_at_secs").map_err(map_sqlx_error)?;
        let created_at_nsecs: i64 = row.try_get("created_at_nsecs").map_err(map_sqlx_error)?;

        Ok(User::new(
            Username::new(username)?,
            HashedPassword::new(password),
            build_timestamp(created_at_secs, created_at_nsecs)?,
        ))
    }
}

/// Creates a new user named `username` with a `password` in hashed form.
///
/// Fails with `AlreadyExists` if the username is taken.
pub async fn create_user(
    ex: &mut Executor,
    username: Username,
    password: HashedPassword,
    created_at: OffsetDateTime,
) -> DbResult<User> {
    let (created_at_secs, created_at_nsecs) = unpack_timestamp(created_at);

    let query_str = "
        INSERT INTO users (username, password, created_at_secs, created_at_nsecs)
        VALUES (?, ?, ?, ?)";
    let done = sqlx::query(query_str)
        .bind(username.as_str())
        .bind(password.as_str())
        .bind(created_at_secs)
        .bind(created_at_nsecs)
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }

    Ok(User::new(username, password, created_at))
}

/// Gets information about an existing user named `username`.
pub async fn get_user_by_username(ex: &mut Executor, username: &Username) -> DbResult<User> {
    let query_str = "SELECT * FROM users WHERE username = ?";
    let raw_user = sqlx::query(query_str)
        .bind(username.as_str())
        .fetch_one(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    User::try_from(raw_user)
}

/// Deletes the user named `username` along with everything that references it.
pub async fn delete_user(ex: &mut Executor, username: &Username) -> DbResult<()> {
    let query_str = "DELETE FROM users WHERE username = ?";
    let done = sqlx::query(query_str)
        .bind(username.as_str())
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Gets the access token assigned to `username`, if any.
pub async fn get_token_for_user(
    ex: &mut Executor,
    username: &Username,
) -> DbResult<Option<AccessToken>> {
    let query_str = "SELECT key FROM tokens WHERE username = ?";
    let row = sqlx::query(query_str)
        .bind(username.as_str())
        .fetch_optional(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    match row {
        Some(row) => {
            let key: String = row.try_get("key").map_err(map_sqlx_error)?;
            Ok(Some(AccessToken::new(key)?))
        }
        None => Ok(None),
    }
}

/// Assigns the access `token` to `username`.
///
/// Fails with `AlreadyExists` if the user already has a token, and with `NotFound` if the user
/// does not exist.
pub async fn put_token(
    ex: &mut Executor,
    token: &AccessToken,
    username: &Username,
    created_at: OffsetDateTime,
) -> DbResult<()> {
    let (created_at_secs, created_at_nsecs) = unpack_timestamp(created_at);

    let query_str = "
        INSERT INTO tokens (key, username, created_at_secs, created_at_nsecs)
        VALUES (?, ?, ?, ?)";
    let done = sqlx::query(query_str)
        .bind(token.as_str())
        .bind(username.as_str())
        .bind(created_at_secs)
        .bind(created_at_nsecs)
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets the name of the user that owns the access `token`.
pub async fn get_user_by_token(ex: &mut Executor, token: &AccessToken) -> DbResult<Username> {
    let query_str = "SELECT username FROM tokens WHERE key = ?";
    let row = sqlx::query(query_str)
        .bind(token.as_str())
        .fetch_one(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    let username: String = row.try_get("username").map_err(map_sqlx_error)?;
    Ok(Username::new(username)?)
}
