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


//! High-level data types.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use derive_getters::Getters;
use derive_more::Constructor;
use itinerary_authn::model::Username;
use itinerary_core::model::{ModelError, ModelResult};
use std::fmt;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

/// Maximum length, in characters, of the free-form text fields of trips and activities.
pub(crate) const MAX_TEXT_LENGTH: usize = 200;

/// Number of random bytes that make up a share token.
const SHARE_TOKEN_BYTES: usize = 24;

/// Length of the textual form of a share token.
pub(crate) const SHARE_TOKEN_LENGTH: usize = SHARE_TOKEN_BYTES / 3 * 4;

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> ModelResult<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ModelError("Date has wrong format; use YYYY-MM-DD".to_owned()))
}

/// Formats a calendar date in `YYYY-MM-DD` form.
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .expect("Dates we can parse must be formattable")
}

/// Parses a clock time in `hh:mm:ss` or `hh:mm` form.
pub fn parse_time(s: &str) -> ModelResult<Time> {
    Time::parse(s, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(s, format_description!("[hour]:[minute]")))
        .map_err(|_| ModelError("Time has wrong format; use hh:mm[:ss]".to_owned()))
}

/// Formats a clock time in `hh:mm:ss` form.
pub fn format_time(time: Time) -> String {
    time.format(format_description!("[hour]:[minute]:[second]"))
        .expect("Times must always be formattable")
}

/// Identifier of a trip.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TripId(i64);

impl TripId {
    /// Creates a new identifier from its database representation.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the identifier in its database representation.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an activity.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ActivityId(i64);

impl ActivityId {
    /// Creates a new identifier from its database representation.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the identifier in its database representation.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

/// Opaque key that grants read-only access to a single trip without authentication.
///
/// Tokens are URL-safe base64 strings without padding.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ShareToken(String);

impl ShareToken {
    /// Creates a share token from an untrusted string `s`, making sure it is well-formed.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.len() != SHARE_TOKEN_LENGTH {
            return Err(ModelError("Invalid share token".to_owned()));
        }
        if !s.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_') {
            return Err(ModelError("Invalid share token".to_owned()));
        }
        Ok(Self(s))
    }

    /// Generates a new random share token.
    pub fn generate() -> Self {
        let bytes = rand::random::<[u8; SHARE_TOKEN_BYTES]>();
        Self::new(URL_SAFE_NO_PAD.encode(bytes)).expect("Auto-generated tokens must be valid")
    }

    /// Returns the string representation of the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A non-empty piece of text of bounded length, used for names and titles.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShortText(String);

impl ShortText {
    /// Creates a new text from an untrusted string `s`, making sure it is valid.
    ///
    /// Leading and trailing whitespace is dropped.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s: String = s.into();
        let s = s.trim().to_owned();
        if s.is_empty() {
            return Err(ModelError("Text cannot be empty".to_owned()));
        }
        if s.chars().count() > MAX_TEXT_LENGTH {
            return Err(ModelError(format!(
                "Text cannot be longer than {} characters",
                MAX_TEXT_LENGTH
            )));
        }
        Ok(Self(s))
    }

    /// Returns a string view of the text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
impl From<&'static str> for ShortText {
    /// Creates a new text from a hardcoded string, which must be valid.
    fn from(s: &'static str) -> Self {
        ShortText::new(s).expect("Hardcoded texts must be valid")
    }
}

/// The day of a trip an activity happens on, counting from 1.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct DayNumber(u32);

impl DayNumber {
    /// Creates a day number from an untrusted integer, making sure it is in range.
    pub fn new(n: i64) -> ModelResult<Self> {
        if n < 1 {
            return Err(ModelError("Day number must be 1 or greater".to_owned()));
        }
        match u32::try_from(n) {
            Ok(n) => Ok(Self(n)),
            Err(_) => Err(ModelError(format!("Day number {} is too large", n))),
        }
    }

    /// Returns the day number as an integer.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Display position of an activity within its day, counting from 0.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct OrderIndex(u32);

impl OrderIndex {
    /// Creates an order index from an untrusted integer, making sure it is in range.
    pub fn new(n: i64) -> ModelResult<Self> {
        if n < 0 {
            return Err(ModelError("Order index cannot be negative".to_owned()));
        }
        match u32::try_from(n) {
            Ok(n) => Ok(Self(n)),
            Err(_) => Err(ModelError(format!("Order index {} is too large", n))),
        }
    }

    /// Creates an order index from the position of an item in a list.
    pub fn from_position(position: usize) -> ModelResult<Self> {
        match i64::try_from(position) {
            Ok(n) => Self::new(n),
            Err(_) => Err(ModelError(format!("Order index {} is too large", position))),
        }
    }

    /// Returns the order index as an integer.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// A single planned event within a trip.
#[derive(Clone, Constructor, Debug, Getters, PartialEq)]
pub struct Activity {
    /// Unique identifier of the activity.
    id: ActivityId,

    /// Short description of what the activity is.
    title: ShortText,

    /// Time of the day at which the activity happens, if known.
    time: Option<Time>,

    /// Day of the trip on which the activity happens.
    day_number: DayNumber,

    /// Display position of the activity within its day.
    order_index: OrderIndex,
}

/// The fields of a trip that callers can set directly.
#[derive(Clone, Debug, PartialEq)]
pub struct TripDetails {
    /// Name of the trip.
    pub name: ShortText,

    /// City the trip goes to.
    pub destination_city: ShortText,

    /// First day of the trip.
    pub start_date: Date,

    /// Last day of the trip.  Not validated against `start_date`.
    pub end_date: Date,
}

/// A planned journey along with its activities.
#[derive(Clone, Constructor, Debug, Getters, PartialEq)]
pub struct Trip {
    /// Unique identifier of the trip.
    id: TripId,

    /// Caller-controlled fields of the trip.
    details: TripDetails,

    /// Account that created the trip, if the trip was not created anonymously.
    owner: Option<Username>,

    /// Public lookup key for the trip.  Immutable once assigned.
    share_token: ShareToken,

    /// Activities of the trip, sorted by day, then by order index, then by identifier.
    activities: Vec<Activity>,

    /// Time when the trip was created.
    created_at: OffsetDateTime,

    /// Time when the trip was last modified.
    updated_at: OffsetDateTime,
}

/// An activity to be added to a trip.
#[derive(Clone, Debug, PartialEq)]
pub struct NewActivity {
    /// Short description of what the activity is.
    pub title: ShortText,

    /// Time of the day at which the activity happens, if known.
    pub time: Option<Time>,

    /// Day of the trip on which the activity happens.
    pub day_number: DayNumber,

    /// Display position of the activity within its day.
    pub order_index: OrderIndex,
}

/// A trip to be created along with its initial activities.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTrip {
    /// Caller-controlled fields of the trip.
    pub details: TripDetails,

    /// Initial activities of the trip.
    pub activities: Vec<NewActivity>,
}

/// Modifications to apply to an existing trip.  Fields set to `None` are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripUpdate {
    /// New name of the trip.
    pub name: Option<ShortText>,

    /// New destination of the trip.
    pub destination_city: Option<ShortText>,

    /// New first day of the trip.
    pub start_date: Option<Date>,

    /// New last day of the trip.
    pub end_date: Option<Date>,

    /// Replacement for the whole set of activities of the trip.
    pub activities: Option<Vec<NewActivity>>,
}

impl TripUpdate {
    /// Computes the details that result from applying the scalar fields of this update on top of
    /// `details`.
    pub fn apply(&self, details: &TripDetails) -> TripDetails {
        TripDetails {
            name: self.name.clone().unwrap_or_else(|| details.name.clone()),
            destination_city: self
                .destination_city
                .clone()
                .unwrap_or_else(|| details.destination_city.clone()),
            start_date: self.start_date.unwrap_or(details.start_date),
            end_date: self.end_date.unwrap_or(details.end_date),
        }
    }
}
