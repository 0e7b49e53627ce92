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


//! API to create a new user account.

use crate::driver::AuthnDriver;
use crate::rest::{parse_credentials, TokenResponse};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use itinerary_core::rest::{JsonObject, RestError};

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<AuthnDriver>,
    payload: JsonObject,
) -> Result<impl IntoResponse, RestError> {
    let (username, password) = parse_credentials(payload)?;
    let token = driver.register(username.clone(), password).await?;
    Ok((http::StatusCode::CREATED, Json(TokenResponse { token, username })))
}
