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


//! API to replace the contents of a trip.

use crate::rest::payload::{parse_trip_id, parse_trip_update, TripResponse};
use crate::rest::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use http::HeaderMap;
use itinerary_authn::rest::require_caller;
use itinerary_core::rest::{JsonObject, RestError};

/// PUT handler for this API.
///
/// All scalar fields must be provided.  The activities are replaced wholesale only if the payload
/// carries them.
pub(crate) async fn handler(
    State(AppState { driver, authn }): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: JsonObject,
) -> Result<impl IntoResponse, RestError> {
    require_caller(authn, &headers).await?;
    let id = parse_trip_id(&id)?;
    let update = parse_trip_update(payload, false)?;
    let trip = driver.update_trip(id, update).await?;
    Ok(Json(TripResponse::from(trip)))
}
