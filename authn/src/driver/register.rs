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


//! Extends the driver with the `register` method.

use crate::db;
use crate::driver::AuthnDriver;
use crate::model::{AccessToken, Password, Username};
use itinerary_core::db::DbError;
use itinerary_core::driver::{DriverError, DriverResult};
use log::info;

impl AuthnDriver {
    /// Creates a new account for `username` with `password` and returns the access token the
    /// new user should use for subsequent requests.
    pub async fn register(self, username: Username, password: Password) -> DriverResult<AccessToken> {
        // Hash outside of the transaction as this is the most expensive part of the operation.
        let password = password.hash()?;

        let mut tx = self.db.begin_write().await?;
        let now = self.clock.now_utc();

        match db::create_user(tx.ex(), username.clone(), password, now).await {
            Ok(_user) => (),
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists("Username already exists".to_owned()));
            }
            Err(e) => return Err(e.into()),
        }

        let token = Self::get_or_create_token(&mut tx, &username, now).await?;

        tx.commit().await?;
        info!("Registered new user {}", username);
        Ok(token)
    }
}
