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


//! API to partially update a trip.

use crate::rest::payload::{parse_trip_id, parse_trip_update, TripResponse};
use crate::rest::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use http::HeaderMap;
use itinerary_authn::rest::require_caller;
use itinerary_core::rest::{JsonObject, RestError};

/// PATCH handler for this API.
pub(crate) async fn handler(
    State(AppState { driver, authn }): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: JsonObject,
) -> Result<impl IntoResponse, RestError> {
    require_caller(authn, &headers).await?;
    let id = parse_trip_id(&id)?;
    let update = parse_trip_update(payload, true)?;
    let trip = driver.update_trip(id, update).await?;
    Ok(Json(TripResponse::from(trip)))
}

#[cfg(test)]
mod tests {
    use crate::model::TripId;
    use crate::rest::payload::TripResponse;
    use crate::rest::testutils::*;
    use axum::http;
    use itinerary_core::rest::testutils::OneShotBuilder;
    use itinerary_core::test_payload_must_be_json;
    use serde_json::json;

    fn route<I: std::fmt::Display>(id: I) -> (http::Method, String) {
        (http::Method::PATCH, format!("/api/trips/{}/", id))
    }

    #[tokio::test]
    async fn test_empty_update() {
        let context = TestContext::setup().await;
        let (_alice, token) = context.register("alice").await;
        let trip = context.create_trip(None, "Trip", &[("a", 1)]).await;

        let response = OneShotBuilder::new(context.app(), route(trip.id()))
            .with_token_auth(token)
            .send_json(json!({}))
            .await
            .expect_json::<TripResponse>()
            .await;
        assert_eq!(TripResponse::from(trip).activities, response.activities);
        assert_eq!("Trip", response.name);
    }

    #[tokio::test]
    async fn test_single_field() {
        let context = TestContext::setup().await;
        let (alice, token) = context.register("alice").await;
        let trip = context.create_trip(Some(&alice), "Trip", &[("a", 1)]).await;

        let response = OneShotBuilder::new(context.app(), route(trip.id()))
            .with_token_auth(token)
            .send_json(json!({"destination_city": "Berlin"}))
            .await
            .expect_json::<TripResponse>()
            .await;

        let mut expected = TripResponse::from(trip);
        expected.destination_city = "Berlin".to_owned();
        assert_eq!(expected, response);
    }

    #[tokio::test]
    async fn test_only_activities() {
        let context = TestContext::setup().await;
        let (_alice, token) = context.register("alice").await;
        let trip = context.create_trip(None, "Trip", &[("a", 1), ("b", 1)]).await;

        let response = OneShotBuilder::new(context.app(), route(trip.id()))
            .with_token_auth(token)
            .send_json(json!({"activities": [{"title": "c", "day_number": 4, "order_index": 9}]}))
            .await
            .expect_json::<TripResponse>()
            .await;

        assert_eq!(1, response.activities.len());
        assert_eq!("c", response.activities[0].title);
        assert_eq!(4, response.activities[0].day_number);
        assert_eq!(0, response.activities[0].order_index);
        assert_eq!(trip.details().name.as_str(), response.name);
        assert_eq!(1, context.count_activities().await);
    }

    #[tokio::test]
    async fn test_invalid_fields() {
        let context = TestContext::setup().await;
        let (_alice, token) = context.register("alice").await;
        let trip = context.create_trip(None, "Trip", &[("a", 1)]).await;

        OneShotBuilder::new(context.app(), route(trip.id()))
            .with_token_auth(token)
            .send_json(json!({"start_date": "tomorrow", "activities": [{"day_number": 1}]}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_field_errors(&["activities[0].title", "start_date"])
            .await;

        assert_eq!(Some(trip), context.get_trip(TripId::new(1)).await);
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let context = TestContext::setup().await;
        let trip = context.create_trip(None, "Trip", &[]).await;

        OneShotBuilder::new(context.app(), route(trip.id()))
            .send_json(json!({"name": "Stolen"}))
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("credentials were not provided")
            .await;

        assert_eq!(Some(trip), context.get_trip(TripId::new(1)).await);
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route(1));
}
