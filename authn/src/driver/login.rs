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


//! Extends the driver with the `login` method.

use crate::db;
use crate::driver::AuthnDriver;
use crate::model::{AccessToken, Password, Username};
use itinerary_core::db::DbError;
use itinerary_core::driver::{DriverError, DriverResult};

/// Message returned for any kind of credentials mismatch.  Unknown users and bad passwords are
/// indistinguishable to the caller.
const BAD_CREDENTIALS_MESSAGE: &str = "Unable to log in with provided credentials";

impl AuthnDriver {
    /// Logs a user with `username` and `password` in and returns their access token.
    pub async fn login(self, username: Username, password: Password) -> DriverResult<AccessToken> {
        let user = {
            let mut ex = self.db.ex().await?;
            match db::get_user_by_username(&mut ex, &username).await {
                Ok(user) => user,
                Err(DbError::NotFound) => {
                    return Err(DriverError::Unauthorized(BAD_CREDENTIALS_MESSAGE.to_owned()));
                }
                Err(e) => return Err(e.into()),
            }
        };

        // Verify without holding a connection as this is the most expensive part of the operation.
        let matches = password
            .verify(user.password())
            .map_err(|e| DriverError::BackendError(e.to_string()))?;
        if !matches {
            return Err(DriverError::Unauthorized(BAD_CREDENTIALS_MESSAGE.to_owned()));
        }

        let mut tx = self.db.begin_write().await?;
        let now = self.clock.now_utc();
        let token = Self::get_or_create_token(&mut tx, &username, now).await?;

        tx.commit().await?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::HashedPassword;
    use itinerary_core::clocks::testutils::MonotonicClock;
    use itinerary_core::db::sqlite::testutils::{remove_files, setup_on_disk};
    use std::sync::Arc;
    use time::OffsetDateTime;

    #[tokio::test]
    async fn test_login_returns_registration_token() {
        let context = TestContext::setup().await;

        let username = Username::from("hello");
        let token = context.create_user(&username).await;

        let token1 = context
            .driver()
            .login(username.clone(), Password::from(DEFAULT_TEST_PASSWORD))
            .await
            .unwrap();
        assert_eq!(token, token1);

        let token2 =
            context.driver().login(username, Password::from(DEFAULT_TEST_PASSWORD)).await.unwrap();
        assert_eq!(token, token2);
    }

    #[tokio::test]
    async fn test_login_creates_missing_token() {
        let context = TestContext::setup().await;

        let username = Username::from("legacy");
        db::create_user(
            &mut context.ex().await,
            username.clone(),
            Password::from("pass").hash().unwrap(),
            OffsetDateTime::from_unix_timestamp(1).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(None, db::get_token_for_user(&mut context.ex().await, &username).await.unwrap());

        let token = context.driver().login(username.clone(), Password::from("pass")).await.unwrap();
        assert_eq!(
            Some(token),
            db::get_token_for_user(&mut context.ex().await, &username).await.unwrap()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_login_concurrent_first_logins_share_token() {
        let (db, path) = setup_on_disk().await;
        let db = Arc::from(db);
        let clock = Arc::from(MonotonicClock::new(100000));
        let context = TestContext::setup_with(db, clock, "the-realm").await;

        let username = Username::from("legacy");
        db::create_user(
            &mut context.ex().await,
            username.clone(),
            Password::from("pass").hash().unwrap(),
            OffsetDateTime::from_unix_timestamp(1).unwrap(),
        )
        .await
        .unwrap();

        let mut handles = vec![];
        for _ in 0..8 {
            handles.push(tokio::spawn(
                context.driver().login(username.clone(), Password::from("pass")),
            ));
        }
        let mut tokens = vec![];
        for handle in handles {
            tokens.push(handle.await.unwrap().unwrap());
        }

        let stored = db::get_token_for_user(&mut context.ex().await, &username).await.unwrap();
        for token in tokens {
            assert_eq!(stored.as_ref(), Some(&token));
        }

        context.db().close().await;
        remove_files(&path);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let context = TestContext::setup().await;

        match context.driver().login(Username::from("unknown"), Password::from("password")).await {
            Err(DriverError::Unauthorized(e)) => assert_eq!(BAD_CREDENTIALS_MESSAGE, e),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_login_invalid_password() {
        let context = TestContext::setup().await;

        let username = Username::from("hello");
        context.create_user(&username).await;

        match context.driver().login(username, Password::from("bad password")).await {
            Err(DriverError::Unauthorized(e)) => assert_eq!(BAD_CREDENTIALS_MESSAGE, e),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_login_corrupted_hash() {
        let context = TestContext::setup().await;

        let username = Username::from("hello");
        db::create_user(
            &mut context.ex().await,
            username.clone(),
            HashedPassword::new("not a bcrypt hash"),
            OffsetDateTime::from_unix_timestamp(1).unwrap(),
        )
        .await
        .unwrap();

        match context.driver().login(username, Password::from("password")).await {
            Err(DriverError::BackendError(e)) => assert!(e.contains("Password error")),
            e => panic!("{:?}", e),
        }
    }
}
