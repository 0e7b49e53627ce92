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


//! Utilities to help testing services that integrate with the `authn` features.

use crate::db;
use crate::driver::AuthnDriver;
use crate::model::{AccessToken, Password, Username};
use itinerary_core::clocks::Clock;
use itinerary_core::db::Db;
#[cfg(test)]
use itinerary_core::db::Executor;
use std::sync::Arc;

/// Password assigned to all users created via `TestContext::create_user`.
pub const DEFAULT_TEST_PASSWORD: &str = "test0password";

/// State of a running test.
pub struct TestContext {
    /// The driver to handle authentication flows.
    driver: AuthnDriver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database and a monotonic clock.
    #[cfg(test)]
    pub(crate) async fn setup() -> Self {
        let db = Arc::from(itinerary_core::db::sqlite::testutils::setup().await);
        let clock = Arc::from(itinerary_core::clocks::testutils::MonotonicClock::new(100000));
        Self::setup_with(db, clock, "the-realm").await
    }

    /// Initializes the test context using the given already-initialized objects.
    ///
    /// This initializes the schema of this crate in `db`.
    pub async fn setup_with(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        realm: &'static str,
    ) -> Self {
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = AuthnDriver::new(db, clock, realm);
        TestContext { driver }
    }

    /// Syntactic sugar to register a user with the default test password and get its token.
    pub async fn create_user(&self, username: &Username) -> AccessToken {
        self.driver
            .clone()
            .register(username.clone(), Password::from(DEFAULT_TEST_PASSWORD))
            .await
            .unwrap()
    }

    /// Gets access to the database used by this test context.
    #[cfg(test)]
    pub(crate) fn db(&self) -> &(dyn Db + Send + Sync) {
        self.driver.db.as_ref()
    }

    /// Gets a direct executor against the database.
    #[cfg(test)]
    pub(crate) async fn ex(&self) -> Executor {
        self.driver.db.ex().await.unwrap()
    }

    /// Gets a copy of the driver in this test context.
    pub fn driver(&self) -> AuthnDriver {
        self.driver.clone()
    }
}
