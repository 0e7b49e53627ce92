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


//! Utilities to deal with HTTP authorization.

use crate::driver::AuthnDriver;
use crate::model::{AccessToken, Username};
use http::header::HeaderMap;
use itinerary_core::driver::DriverError;
use itinerary_core::rest::{get_unique_header, RestError, RestResult};

/// Name of the authorization scheme that carries access tokens.
pub const TOKEN_SCHEME: &str = "Token";

/// Builds an authorization error for the token scheme in `realm` with a `message`.
fn unauthorized<S: Into<String>>(realm: &'static str, message: S) -> RestError {
    RestError::Unauthorized { scheme: TOKEN_SCHEME, realm, message: message.into() }
}

/// Extracts the access token from the `Authorization` header in `headers`.
///
/// Returns `None` if there is no such header or if it is for a scheme other than ours, which
/// means that the caller is anonymous as far as we are concerned.  A header for our scheme that
/// does not carry a well-formed token is an error.
pub fn get_token_auth(
    headers: &HeaderMap,
    exp_realm: &'static str,
) -> RestResult<Option<AccessToken>> {
    let authz = match get_unique_header(headers, "Authorization") {
        Ok(Some(value)) => value,
        Ok(None) => return Ok(None),
        Err(e) => return Err(unauthorized(exp_realm, e.to_string())),
    };

    let authz = match authz.to_str() {
        Ok(value) => value,
        Err(e) => {
            return Err(unauthorized(
                exp_realm,
                format!("Bad encoding in Authorization header: {}", e),
            ));
        }
    };

    let mut fields = authz.split_whitespace();
    match fields.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => (),
        _ => return Ok(None),
    }
    let payload = match fields.next() {
        Some(payload) => payload,
        None => {
            return Err(unauthorized(exp_realm, "Invalid token header: no credentials provided"));
        }
    };
    if fields.next().is_some() {
        return Err(unauthorized(
            exp_realm,
            "Invalid token header: token string should not contain spaces",
        ));
    }

    match AccessToken::new(payload) {
        Ok(token) => Ok(Some(token)),
        Err(e) => Err(unauthorized(exp_realm, e.to_string())),
    }
}

/// Identifies the caller of a request given its `headers`.
///
/// Returns `None` for anonymous callers.  Fails if the request carries a token that does not
/// belong to any user.
pub async fn get_caller(driver: AuthnDriver, headers: &HeaderMap) -> RestResult<Option<Username>> {
    let realm = driver.realm();
    let token = match get_token_auth(headers, realm)? {
        Some(token) => token,
        None => return Ok(None),
    };

    match driver.authenticate(token).await {
        Ok(username) => Ok(Some(username)),
        Err(DriverError::Unauthorized(message)) => Err(unauthorized(realm, message)),
        Err(e) => Err(e.into()),
    }
}

/// Identifies the caller of a request given its `headers`, failing if the caller is anonymous.
pub async fn require_caller(driver: AuthnDriver, headers: &HeaderMap) -> RestResult<Username> {
    let realm = driver.realm();
    match get_caller(driver, headers).await? {
        Some(username) => Ok(username),
        None => Err(unauthorized(realm, "Authentication credentials were not provided")),
    }
}
