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


//! API to delete a trip.

use crate::rest::payload::parse_trip_id;
use crate::rest::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use http::HeaderMap;
use itinerary_authn::rest::require_caller;
use itinerary_core::rest::{EmptyBody, RestError};

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(AppState { driver, authn }): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    require_caller(authn, &headers).await?;
    let id = parse_trip_id(&id)?;
    driver.delete_trip(id).await?;
    Ok(http::StatusCode::NO_CONTENT)
}
