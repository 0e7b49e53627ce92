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


//! Business logic for user accounts and authentication.

use crate::db;
use crate::model::{AccessToken, Username};
use itinerary_core::clocks::Clock;
use itinerary_core::db::{Db, DbError, TxExecutor};
use itinerary_core::driver::{DriverError, DriverResult};
use std::sync::Arc;
use time::OffsetDateTime;

mod login;
mod register;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction, so it's incorrect for the caller to use two separate calls.  For this reason,
/// these operations consume the driver in an attempt to minimize the possibility of executing
/// two operations.
#[derive(Clone)]
pub struct AuthnDriver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Authentication realm to return to requests.
    realm: &'static str,
}

impl AuthnDriver {
    /// Creates a new driver backed by the given dependencies.
    pub fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        realm: &'static str,
    ) -> Self {
        Self { db, clock, realm }
    }

    /// Gets the authentication realm.
    pub fn realm(&self) -> &'static str {
        self.realm
    }

    /// Returns the token already assigned to `username` or assigns a new one created at `now`.
    async fn get_or_create_token(
        tx: &mut TxExecutor,
        username: &Username,
        now: OffsetDateTime,
    ) -> DriverResult<AccessToken> {
        if let Some(token) = db::get_token_for_user(tx.ex(), username).await? {
            return Ok(token);
        }

        let token = AccessToken::generate();
        db::put_token(tx.ex(), &token, username, now).await?;
        Ok(token)
    }

    /// Resolves the access `token` to the name of the user that owns it.
    pub async fn authenticate(self, token: AccessToken) -> DriverResult<Username> {
        let mut ex = self.db.ex().await?;
        match db::get_user_by_token(&mut ex, &token).await {
            Ok(username) => Ok(username),
            Err(DbError::NotFound) => Err(DriverError::Unauthorized("Invalid token".to_owned())),
            Err(e) => Err(e.into()),
        }
    }
}
