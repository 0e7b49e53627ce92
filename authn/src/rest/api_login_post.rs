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


//! API to obtain the access token of an existing account.

use crate::driver::AuthnDriver;
use crate::rest::{parse_credentials, TokenResponse};
use axum::extract::State;
use axum::Json;
use itinerary_core::driver::DriverError;
use itinerary_core::rest::{JsonObject, RestError};

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<AuthnDriver>,
    payload: JsonObject,
) -> Result<Json<TokenResponse>, RestError> {
    let (username, password) = parse_credentials(payload)?;
    let token = match driver.login(username.clone(), password).await {
        Ok(token) => token,
        // Bad credentials are a problem with the request, not with the caller's identity.
        Err(DriverError::Unauthorized(message)) => return Err(RestError::InvalidRequest(message)),
        Err(e) => return Err(e.into()),
    };
    Ok(Json(TokenResponse { token, username }))
}

#[cfg(test)]
mod tests {
    use crate::driver::testutils::DEFAULT_TEST_PASSWORD;
    use crate::model::Username;
    use crate::rest::testutils::*;
    use crate::rest::{CredentialsRequest, TokenResponse};
    use axum::http;
    use itinerary_core::rest::testutils::OneShotBuilder;
    use itinerary_core::test_payload_must_be_json;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/auth/login/".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let username = Username::from("some-user");
        let token = context.create_user(&username).await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(CredentialsRequest::new("some-user", DEFAULT_TEST_PASSWORD))
            .await
            .expect_json::<TokenResponse>()
            .await;
        assert_eq!(token, response.token);
        assert_eq!(username, response.username);
    }

    #[tokio::test]
    async fn test_bad_password() {
        let context = TestContext::setup().await;

        context.create_user(&Username::from("some-user")).await;

        OneShotBuilder::new(context.app(), route())
            .send_json(CredentialsRequest::new("some-user", "wrong"))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Unable to log in with provided credentials")
            .await;
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.into_app(), route())
            .send_json(CredentialsRequest::new("ghost", DEFAULT_TEST_PASSWORD))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Unable to log in with provided credentials")
            .await;
    }

    #[tokio::test]
    async fn test_missing_password() {
        let context = TestContext::setup().await;

        let request = CredentialsRequest { username: Some("some-user".to_owned()), password: None };
        OneShotBuilder::new(context.into_app(), route())
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_field_errors(&["password"])
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}
