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


//! Wire format of trips and validation of incoming trip payloads.
//!
//! Incoming payloads are validated field by field so that a single response can report every
//! problem found, keyed by the path of the offending field (`name`, `activities[2].day_number`).
//! Fields that the server controls (`id`, `share_token` and `owner`) are ignored on input.

use crate::model::{
    format_date, format_time, parse_date, parse_time, Activity, DayNumber, NewActivity, NewTrip,
    OrderIndex, ShareToken, ShortText, Trip, TripDetails, TripId, TripUpdate,
};
use itinerary_core::rest::{json_kind, FieldErrors, JsonObject, RestError, RestResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Date, Time};

/// Wire representation of an activity.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct ActivityResponse {
    /// Identifier of the activity.
    pub(crate) id: i64,

    /// Short description of the activity.
    pub(crate) title: String,

    /// Time of the day as `HH:MM:SS`, if known.
    pub(crate) time: Option<String>,

    /// Day of the trip, counting from 1.
    pub(crate) day_number: u32,

    /// Position within the day, counting from 0.
    pub(crate) order_index: u32,
}

impl From<&Activity> for ActivityResponse {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id().as_i64(),
            title: activity.title().as_str().to_owned(),
            time: activity.time().map(format_time),
            day_number: activity.day_number().as_u32(),
            order_index: activity.order_index().as_u32(),
        }
    }
}

/// Wire representation of a trip.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct TripResponse {
    /// Identifier of the trip.
    pub(crate) id: i64,

    /// Name of the trip.
    pub(crate) name: String,

    /// City the trip goes to.
    pub(crate) destination_city: String,

    /// First day of the trip as `YYYY-MM-DD`.
    pub(crate) start_date: String,

    /// Last day of the trip as `YYYY-MM-DD`.
    pub(crate) end_date: String,

    /// Activities of the trip in display order.
    pub(crate) activities: Vec<ActivityResponse>,

    /// Key to look up the trip without authentication.
    pub(crate) share_token: String,

    /// Username of the owner, or null for anonymous trips.
    pub(crate) owner: Option<String>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        let details = trip.details();
        Self {
            id: trip.id().as_i64(),
            name: details.name.as_str().to_owned(),
            destination_city: details.destination_city.as_str().to_owned(),
            start_date: format_date(details.start_date),
            end_date: format_date(details.end_date),
            activities: trip.activities().iter().map(ActivityResponse::from).collect(),
            share_token: trip.share_token().as_str().to_owned(),
            owner: trip.owner().as_ref().map(|owner| owner.as_str().to_owned()),
        }
    }
}

/// Parses the trip identifier given in a URL path.
///
/// Identifiers that cannot possibly exist are reported as missing trips.
pub(crate) fn parse_trip_id(s: &str) -> RestResult<TripId> {
    match s.parse::<i64>() {
        Ok(id) => Ok(TripId::new(id)),
        Err(_) => Err(RestError::NotFound("Trip not found".to_owned())),
    }
}

/// Parses the share token given in a URL path.
///
/// Malformed tokens are reported as missing trips.
pub(crate) fn parse_share_token(s: String) -> RestResult<ShareToken> {
    ShareToken::new(s).map_err(|_| RestError::NotFound("Trip not found".to_owned()))
}

/// Builds the path of `name` within the object at `prefix`.
fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Describes why `value` does not hold a value of the `expected` kind.
fn unexpected(value: &Value, expected: &str) -> String {
    match value {
        Value::Null => "This field may not be null".to_owned(),
        other => format!("Expected {} but got {}", expected, json_kind(other)),
    }
}

/// Parses a free-form text field.
fn parse_text_value(value: &Value) -> Result<ShortText, String> {
    match value {
        Value::String(s) => ShortText::new(s.as_str()).map_err(|e| e.to_string()),
        other => Err(unexpected(other, "a string")),
    }
}

/// Parses a date field.
fn parse_date_value(value: &Value) -> Result<Date, String> {
    match value {
        Value::String(s) => parse_date(s).map_err(|e| e.to_string()),
        other => Err(unexpected(other, "a string")),
    }
}

/// Parses a nullable time field.  Empty strings count as null.
fn parse_time_value(value: &Value) -> Result<Option<Time>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => parse_time(s).map(Some).map_err(|e| e.to_string()),
        other => Err(unexpected(other, "a string")),
    }
}

/// Parses an integer field.  Strings holding integers are accepted too.
fn parse_integer_value(value: &Value) -> Result<i64, String> {
    let n = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        other => return Err(unexpected(other, "an integer")),
    };
    n.ok_or_else(|| "A valid integer is required".to_owned())
}

/// Parses a day number field.
fn parse_day_number_value(value: &Value) -> Result<DayNumber, String> {
    DayNumber::new(parse_integer_value(value)?).map_err(|e| e.to_string())
}

/// Parses an order index field.
fn parse_order_index_value(value: &Value) -> Result<OrderIndex, String> {
    OrderIndex::new(parse_integer_value(value)?).map_err(|e| e.to_string())
}

/// Extracts and parses field `name` of `object`, recording any problems in `errors` under the
/// path of the field within `prefix`.
///
/// Returns `None` if the field is invalid or if it is absent, and absent fields are only an
/// error when they are `required`.
fn take<T>(
    object: &Map<String, Value>,
    prefix: &str,
    name: &str,
    required: bool,
    errors: &mut FieldErrors,
    parse: fn(&Value) -> Result<T, String>,
) -> Option<T> {
    match object.get(name) {
        None => {
            if required {
                errors.add(field_path(prefix, name), "This field is required");
            }
            None
        }
        Some(value) => match parse(value) {
            Ok(value) => Some(value),
            Err(message) => {
                errors.add(field_path(prefix, name), message);
                None
            }
        },
    }
}

/// Parses the activity at `position` of the activities list.
///
/// The `order_index` of the item is validated if present but is always replaced by `position`.
fn parse_activity(item: &Value, position: usize, errors: &mut FieldErrors) -> Option<NewActivity> {
    let prefix = format!("activities[{}]", position);
    let object = match item {
        Value::Object(object) => object,
        other => {
            errors.add(prefix, unexpected(other, "an object"));
            return None;
        }
    };

    let title = take(object, &prefix, "title", true, errors, parse_text_value);
    let time = take(object, &prefix, "time", false, errors, parse_time_value).flatten();
    let day_number = take(object, &prefix, "day_number", true, errors, parse_day_number_value);
    let _ = take(object, &prefix, "order_index", false, errors, parse_order_index_value);
    let order_index = match OrderIndex::from_position(position) {
        Ok(order_index) => order_index,
        Err(e) => {
            errors.add(field_path(&prefix, "order_index"), e.to_string());
            return None;
        }
    };

    Some(NewActivity { title: title?, time, day_number: day_number?, order_index })
}

/// Parses the list of activities in `value`.
///
/// Items that fail validation are left out of the result, so callers must check `errors` before
/// trusting it.
fn parse_activities(value: &Value, errors: &mut FieldErrors) -> Option<Vec<NewActivity>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .filter_map(|(position, item)| parse_activity(item, position, errors))
                .collect(),
        ),
        other => {
            errors.add("activities", unexpected(other, "a list of items"));
            None
        }
    }
}

/// How to treat fields that are absent from a trip payload.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Mode {
    /// All fields are required.
    Create,

    /// All fields but the activities are required.  Absent activities are left untouched, so a
    /// client can replace the trip details without resending its itinerary.
    Replace,

    /// No field is required.
    Partial,
}

/// Parses all fields of a trip payload according to `mode`.
fn parse_fields(payload: JsonObject, mode: Mode) -> (TripUpdate, FieldErrors) {
    let JsonObject(object) = payload;
    let mut errors = FieldErrors::default();

    let required = mode != Mode::Partial;
    let name = take(&object, "", "name", required, &mut errors, parse_text_value);
    let destination_city =
        take(&object, "", "destination_city", required, &mut errors, parse_text_value);
    let start_date = take(&object, "", "start_date", required, &mut errors, parse_date_value);
    let end_date = take(&object, "", "end_date", required, &mut errors, parse_date_value);

    let activities = match object.get("activities") {
        Some(value) => parse_activities(value, &mut errors),
        None => {
            if mode == Mode::Create {
                errors.add("activities", "This field is required");
            }
            None
        }
    };

    let update = TripUpdate { name, destination_city, start_date, end_date, activities };
    (update, errors)
}

/// Validates the payload of a request to create a trip.
pub(crate) fn parse_new_trip(payload: JsonObject) -> RestResult<NewTrip> {
    let (update, errors) = parse_fields(payload, Mode::Create);
    match update {
        TripUpdate {
            name: Some(name),
            destination_city: Some(destination_city),
            start_date: Some(start_date),
            end_date: Some(end_date),
            activities: Some(activities),
        } => errors.into_result(NewTrip {
            details: TripDetails { name, destination_city, start_date, end_date },
            activities,
        }),
        _ => Err(RestError::InvalidFields(errors)),
    }
}

/// Validates the payload of a request to update a trip.
///
/// A `partial` update accepts any subset of the fields.  Otherwise, only the activities may be
/// left out.
pub(crate) fn parse_trip_update(payload: JsonObject, partial: bool) -> RestResult<TripUpdate> {
    let mode = if partial { Mode::Partial } else { Mode::Replace };
    let (update, errors) = parse_fields(payload, mode);
    errors.into_result(update)
}
