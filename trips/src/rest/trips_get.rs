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


//! API to list the trips of the caller.

use crate::rest::payload::TripResponse;
use crate::rest::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use http::HeaderMap;
use itinerary_authn::rest::get_caller;
use itinerary_core::rest::{EmptyBody, RestError};

/// GET handler for this API.
pub(crate) async fn handler(
    State(AppState { driver, authn }): State<AppState>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let caller = get_caller(authn, &headers).await?;
    let trips = driver.list_trips(caller).await?;
    Ok(Json(trips.into_iter().map(TripResponse::from).collect::<Vec<TripResponse>>()))
}
