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


//! Entry point to the REST server.

use crate::driver::Driver;
use axum::Router;
use itinerary_authn::driver::AuthnDriver;

mod payload;
mod share_get;
#[cfg(test)]
mod testutils;
mod trip_delete;
mod trip_get;
mod trip_patch;
mod trip_put;
mod trips_get;
mod trips_post;

/// State shared by all handlers of the trips API.
#[derive(Clone)]
pub(crate) struct AppState {
    /// Business logic for trips.
    driver: Driver,

    /// Business logic to identify callers.
    authn: AuthnDriver,
}

/// Creates the router for the application.
///
/// Everything is served under `/api`, including the authentication endpoints handled by `authn`.
pub(crate) fn app(driver: Driver, authn: AuthnDriver) -> Router {
    use axum::routing::get;

    let state = AppState { driver, authn: authn.clone() };
    let api = Router::new()
        .route("/trips/", get(trips_get::handler).post(trips_post::handler))
        .route("/trips/share/:token/", get(share_get::handler))
        .route(
            "/trips/:id/",
            get(trip_get::handler)
                .put(trip_put::handler)
                .patch(trip_patch::handler)
                .delete(trip_delete::handler),
        )
        .with_state(state)
        .nest("/auth", itinerary_authn::rest::app(authn));
    Router::new().nest("/api", api)
}
