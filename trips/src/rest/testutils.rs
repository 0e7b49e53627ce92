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

use crate::driver::testutils::{new_trip, TestContext as DriverTestContext};
use crate::model::{Trip, TripId};
use crate::rest::app;
use axum::Router;
use itinerary_authn::model::{AccessToken, Username};

/// State of a running test.
pub(crate) struct TestContext {
    /// Context of the drivers backing the app.
    inner: DriverTestContext,

    /// The app under test.
    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let inner = DriverTestContext::setup().await;
        let app = app(inner.driver(), inner.authn());
        Self { inner, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Registers a new user and returns its name along with its access token.
    pub(crate) async fn register(&self, username: &'static str) -> (Username, AccessToken) {
        self.inner.register(username).await
    }

    /// Creates a trip named `name` with `(title, day_number)` activities owned by `owner`.
    pub(crate) async fn create_trip(
        &self,
        owner: Option<&Username>,
        name: &'static str,
        activities: &[(&'static str, i64)],
    ) -> Trip {
        self.inner
            .driver()
            .create_trip(owner.cloned(), new_trip(name, activities))
            .await
            .unwrap()
    }

    /// Fetches a trip straight from the database, if it exists.
    pub(crate) async fn get_trip(&self, id: TripId) -> Option<Trip> {
        self.inner.get_trip(id).await
    }

    /// Counts the activities stored across all trips.
    pub(crate) async fn count_activities(&self) -> i64 {
        self.inner.count_activities().await
    }
}
