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


//! Test utilities for the REST API.

use crate::db;
use crate::driver::testutils::TestContext as DriverTestContext;
use crate::model::{AccessToken, User, Username};
use crate::rest::app;
use axum::Router;
use itinerary_core::clocks::testutils::MonotonicClock;
use itinerary_core::db::DbError;
use std::sync::Arc;

/// State of a running test.
pub(crate) struct TestContext {
    /// Context of the driver backing the app.
    inner: DriverTestContext,

    /// The app under test, mounted under `/api/auth`.
    app: Router,
}

impl TestContext {
    /// Sets up the test environment with an in-memory database.
    pub(crate) async fn setup() -> Self {
        let db = Arc::from(itinerary_core::db::sqlite::testutils::setup().await);
        let clock = Arc::from(MonotonicClock::new(100000));
        let inner = DriverTestContext::setup_with(db, clock, "the-realm").await;
        let app = Router::new().nest("/api/auth", app(inner.driver()));
        Self { inner, app }
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Registers a user named `username` and returns its token.
    pub(crate) async fn create_user(&self, username: &Username) -> AccessToken {
        self.inner.create_user(username).await
    }

    /// Gets the user `username` by directly querying the backing database, if it exists.
    pub(crate) async fn get_user(&self, username: &Username) -> Option<User> {
        match db::get_user_by_username(&mut self.inner.ex().await, username).await {
            Ok(user) => Some(user),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Gets the token of the user `username` by directly querying the backing database.
    pub(crate) async fn get_token(&self, username: &Username) -> Option<AccessToken> {
        db::get_token_for_user(&mut self.inner.ex().await, username).await.unwrap()
    }
}
