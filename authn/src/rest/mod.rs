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


//! REST interface for account management and authentication.

use crate::driver::AuthnDriver;
use crate::model::{AccessToken, Password, Username};
use axum::Router;
use itinerary_core::rest::{json_kind, FieldErrors, JsonObject, RestError, RestResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod api_login_post;
mod api_register_post;
mod httputils;
#[cfg(test)]
mod testutils;

pub use httputils::{get_caller, get_token_auth, require_caller, TOKEN_SCHEME};

/// Creates the router for the authentication endpoints.
///
/// The `driver` is a configured instance of the `AuthnDriver` to handle accounts.
pub fn app(driver: AuthnDriver) -> Router {
    use axum::routing::post;

    Router::new()
        .route("/login/", post(api_login_post::handler))
        .route("/register/", post(api_register_post::handler))
        .with_state(driver)
}

/// Message sent to the server to register or to log in.
///
/// Both fields are optional at this level so that clients can build incomplete requests, but
/// the server rejects those.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CredentialsRequest {
    /// Name of the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password of the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Creates a new request with both fields set.
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self { username: Some(username.into()), password: Some(password.into()) }
    }
}

/// Message returned by the server after a successful registration or login.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token to send in the `Authorization` header of future requests.
    pub token: AccessToken,

    /// Name of the account the token belongs to.
    pub username: Username,
}

/// Extracts the non-empty string in `field` of `object`, recording any problems in `errors`.
fn take_string(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match object.get(field) {
        None => errors.add(field, "This field is required"),
        Some(Value::Null) => errors.add(field, "This field may not be null"),
        Some(Value::String(s)) if s.is_empty() => errors.add(field, "This field may not be blank"),
        Some(Value::String(s)) => return Some(s.clone()),
        Some(other) => errors.add(field, format!("Expected a string but got {}", json_kind(other))),
    }
    None
}

/// Validates the credentials in a request payload.
fn parse_credentials(payload: JsonObject) -> RestResult<(Username, Password)> {
    let JsonObject(object) = payload;
    let mut errors = FieldErrors::default();

    let username = take_string(&object, "username", &mut errors).and_then(|s| {
        Username::new(s).map_err(|e| errors.add("username", e.to_string())).ok()
    });
    let password = take_string(&object, "password", &mut errors).and_then(|s| {
        Password::new(s).map_err(|e| errors.add("password", e.to_string())).ok()
    });

    match (username, password) {
        (Some(username), Some(password)) => errors.into_result((username, password)),
        _ => Err(RestError::InvalidFields(errors)),
    }
}
