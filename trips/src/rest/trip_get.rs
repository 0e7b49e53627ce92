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


//! API to get a single trip.

use crate::rest::payload::{parse_trip_id, TripResponse};
use crate::rest::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use http::HeaderMap;
use itinerary_authn::rest::get_caller;
use itinerary_core::rest::{EmptyBody, RestError};

/// GET handler for this API.
///
/// Any caller can fetch any trip by its identifier, but a caller that presents invalid
/// credentials is still rejected.
pub(crate) async fn handler(
    State(AppState { driver, authn }): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    get_caller(authn, &headers).await?;
    let id = parse_trip_id(&id)?;
    let trip = driver.get_trip(id).await?;
    Ok(Json(TripResponse::from(trip)))
}
