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


//! API to create a trip along with its activities.

use crate::rest::payload::{parse_new_trip, TripResponse};
use crate::rest::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use http::HeaderMap;
use itinerary_authn::rest::get_caller;
use itinerary_core::rest::{JsonObject, RestError};

/// POST handler for this API.
///
/// Authenticated callers become the owners of the new trip.  Trips created anonymously have no
/// owner.
pub(crate) async fn handler(
    State(AppState { driver, authn }): State<AppState>,
    headers: HeaderMap,
    payload: JsonObject,
) -> Result<impl IntoResponse, RestError> {
    let owner = get_caller(authn, &headers).await?;
    let new = parse_new_trip(payload)?;
    let trip = driver.create_trip(owner, new).await?;
    Ok((http::StatusCode::CREATED, Json(TripResponse::from(trip))))
}
