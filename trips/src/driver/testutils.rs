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


//! Test utilities for the business layer.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use itinerary_authn::driver::testutils::TestContext as AuthnTestContext;
use itinerary_authn::driver::AuthnDriver;
use itinerary_authn::model::{AccessToken, Username};
use itinerary_core::clocks::testutils::MonotonicClock;
use itinerary_core::db::{Db, DbError};
use std::path::PathBuf;
use std::sync::Arc;
use time::macros::date;

/// Realm used by the authentication driver in tests.
pub(crate) const TEST_REALM: &str = "itinerary-test";

/// Builds a new activity for tests.
pub(crate) fn new_activity(title: &'static str, day_number: i64, order_index: i64) -> NewActivity {
    NewActivity {
        title: ShortText::from(title),
        time: None,
        day_number: DayNumber::new(day_number).unwrap(),
        order_index: OrderIndex::new(order_index).unwrap(),
    }
}

/// Builds a new trip named `name` for tests with the given `(title, day_number)` activities.
///
/// The order index of each activity is its position in the list.
pub(crate) fn new_trip(name: &'static str, activities: &[(&'static str, i64)]) -> NewTrip {
    NewTrip {
        details: TripDetails {
            name: ShortText::from(name),
            destination_city: ShortText::from("Lisbon"),
            start_date: date!(2024 - 01 - 10),
            end_date: date!(2024 - 01 - 15),
        },
        activities: activities
            .iter()
            .enumerate()
            .map(|(i, (title, day))| new_activity(*title, *day, i as i64))
            .collect(),
    }
}

pub(crate) struct TestContext {
    authn: AuthnTestContext,
    db: Arc<dyn Db + Send + Sync>,
    driver: Driver,
    db_path: Option<PathBuf>,
}

impl TestContext {
    async fn setup_with(db: Arc<dyn Db + Send + Sync>, db_path: Option<PathBuf>) -> Self {
        let clock = Arc::from(MonotonicClock::new(100000));
        let authn = AuthnTestContext::setup_with(db.clone(), clock.clone(), TEST_REALM).await;
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone(), clock);
        Self { authn, db, driver, db_path }
    }

    pub(crate) async fn setup() -> Self {
        let db = Arc::from(itinerary_core::db::sqlite::testutils::setup().await);
        Self::setup_with(db, None).await
    }

    /// Sets up a context backed by a database file so that concurrent transactions go through
    /// SQLite's file locking.  Call `teardown` to delete the file.
    pub(crate) async fn setup_on_disk() -> Self {
        let (db, path) = itinerary_core::db::sqlite::testutils::setup_on_disk().await;
        let db = Arc::from(db);
        Self::setup_with(db, Some(path)).await
    }

    /// Closes the database and deletes its files, if any.
    pub(crate) async fn teardown(self) {
        self.db.close().await;
        if let Some(path) = self.db_path {
            itinerary_core::db::sqlite::testutils::remove_files(&path);
        }
    }

    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Gets a copy of the authentication driver that shares the database with `driver`.
    pub(crate) fn authn(&self) -> AuthnDriver {
        self.authn.driver()
    }

    /// Registers a new user and returns its name along with its access token.
    pub(crate) async fn register(&self, username: &'static str) -> (Username, AccessToken) {
        let username = Username::from(username);
        let token = self.authn.create_user(&username).await;
        (username, token)
    }

    /// Registers a new user and returns its name.
    pub(crate) async fn create_user(&self, username: &'static str) -> Username {
        self.register(username).await.0
    }

    /// Fetches a trip straight from the database, bypassing the driver.
    pub(crate) async fn get_trip(&self, id: TripId) -> Option<Trip> {
        match db::get_trip(&mut self.db.ex().await.unwrap(), id).await {
            Ok(trip) => Some(trip),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Counts the activities stored across all trips.
    pub(crate) async fn count_activities(&self) -> i64 {
        let mut ex = self.db.ex().await.unwrap();
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activities")
            .fetch_one(ex.conn())
            .await
            .unwrap()
    }
}
