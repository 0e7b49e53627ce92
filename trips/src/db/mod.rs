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


//! Database abstraction to manipulate trips and their activities.

use crate::model::{
    format_date, format_time, parse_date, parse_time, Activity, ActivityId, DayNumber,
    NewActivity, OrderIndex, ShareToken, ShortText, Trip, TripDetails, TripId,
};
use itinerary_authn::model::Username;
use itinerary_core::db::sqlite::{self, build_timestamp, map_sqlx_error, unpack_timestamp};
use itinerary_core::db::{DbError, DbResult, Executor};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// Initializes the database schema.
///
/// The schema of the `authn` crate must have been initialized first.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    sqlite::run_schema(ex, include_str!("sqlite.sql")).await
}

/// Extracts a timestamp stored in the `<prefix>_secs` and `<prefix>_nsecs` columns of `row`.
fn get_timestamp(row: &SqliteRow, prefix: &str) -> DbResult<OffsetDateTime> {
    let secs: i64 = row.try_get(format!("{}_secs", prefix).as_str()).map_err(map_sqlx_error)?;
    let nsecs: i64 = row.try_get(format!("{}_nsecs", prefix).as_str()).map_err(map_sqlx_error)?;
    build_timestamp(secs, nsecs)
}

impl TryFrom<SqliteRow> for Activity {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let title: String = row.try_get("title").map_err(map_sqlx_error)?;
        let time: Option<String> = row.try_get("time").map_err(map_sqlx_error)?;
        let day_number: i64 = row.try_get("day_number").map_err(map_sqlx_error)?;
        let order_index: i64 = row.try_get("order_index").map_err(map_sqlx_error)?;

        let time = match time {
            Some(time) => Some(parse_time(&time)?),
            None => None,
        };

        Ok(Activity::new(
            ActivityId::new(id),
            ShortText::new(title)?,
            time,
            DayNumber::new(day_number)?,
            OrderIndex::new(order_index)?,
        ))
    }
}

/// Builds a trip from its raw `row` and its already-loaded `activities`.
fn trip_from_row(row: &SqliteRow, activities: Vec<Activity>) -> DbResult<Trip> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let name: String = row.try_get("name").map_err(map_sqlx_error)?;
    let destination_city: String = row.try_get("destination_city").map_err(map_sqlx_error)?;
    let start_date: String = row.try_get("start_date").map_err(map_sqlx_error)?;
    let end_date: String = row.try_get("end_date").map_err(map_sqlx_error)?;
    let owner: Option<String> = row.try_get("owner").map_err(map_sqlx_error)?;
    let share_token: String = row.try_get("share_token").map_err(map_sqlx_error)?;

    let details = TripDetails {
        name: ShortText::new(name)?,
        destination_city: ShortText::new(destination_city)?,
        start_date: parse_date(&start_date)?,
        end_date: parse_date(&end_date)?,
    };
    let owner = match owner {
        Some(owner) => Some(Username::new(owner)?),
        None => None,
    };

    Ok(Trip::new(
        TripId::new(id),
        details,
        owner,
        ShareToken::new(share_token)?,
        activities,
        get_timestamp(row, "created_at")?,
        get_timestamp(row, "updated_at")?,
    ))
}

/// Creates a new trip without activities and returns its identifier.
///
/// Fails with `AlreadyExists` if the `share_token` is already in use and with `NotFound` if the
/// `owner` does not exist.
pub async fn create_trip(
    ex: &mut Executor,
    details: &TripDetails,
    owner: Option<&Username>,
    share_token: &ShareToken,
    now: OffsetDateTime,
) -> DbResult<TripId> {
    let (now_secs, now_nsecs) = unpack_timestamp(now);

    let query_str = "
        INSERT INTO trips (
            name, destination_city, start_date, end_date, owner, share_token,
            created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
    let done = sqlx::query(query_str)
        .bind(details.name.as_str())
        .bind(details.destination_city.as_str())
        .bind(format_date(details.start_date))
        .bind(format_date(details.end_date))
        .bind(owner.map(Username::as_str))
        .bind(share_token.as_str())
        .bind(now_secs)
        .bind(now_nsecs)
        .bind(now_secs)
        .bind(now_nsecs)
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(TripId::new(done.last_insert_rowid()))
}

/// Replaces the caller-controlled fields of trip `id` with `details`.
pub async fn update_trip(
    ex: &mut Executor,
    id: TripId,
    details: &TripDetails,
    now: OffsetDateTime,
) -> DbResult<()> {
    let (now_secs, now_nsecs) = unpack_timestamp(now);

    let query_str = "
        UPDATE trips
        SET name = ?, destination_city = ?, start_date = ?, end_date = ?,
            updated_at_secs = ?, updated_at_nsecs = ?
        WHERE id = ?";
    let done = sqlx::query(query_str)
        .bind(details.name.as_str())
        .bind(details.destination_city.as_str())
        .bind(format_date(details.start_date))
        .bind(format_date(details.end_date))
        .bind(now_secs)
        .bind(now_nsecs)
        .bind(id.as_i64())
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Deletes trip `id` and, through the cascade, all of its activities.
pub async fn delete_trip(ex: &mut Executor, id: TripId) -> DbResult<()> {
    let query_str = "DELETE FROM trips WHERE id = ?";
    let done = sqlx::query(query_str)
        .bind(id.as_i64())
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    if done.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Adds `activities` to trip `trip_id` as given.
pub async fn insert_activities(
    ex: &mut Executor,
    trip_id: TripId,
    activities: &[NewActivity],
    now: OffsetDateTime,
) -> DbResult<()> {
    let (now_secs, now_nsecs) = unpack_timestamp(now);

    let query_str = "
        INSERT INTO activities (
            trip_id, title, time, day_number, order_index,
            created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
    for activity in activities {
        sqlx::query(query_str)
            .bind(trip_id.as_i64())
            .bind(activity.title.as_str())
            .bind(activity.time.map(format_time))
            .bind(activity.day_number.as_u32())
            .bind(activity.order_index.as_u32())
            .bind(now_secs)
            .bind(now_nsecs)
            .bind(now_secs)
            .bind(now_nsecs)
            .execute(ex.conn())
            .await
            .map_err(map_sqlx_error)?;
    }
    Ok(())
}

/// Deletes all activities of trip `trip_id`.
pub async fn delete_activities(ex: &mut Executor, trip_id: TripId) -> DbResult<()> {
    let query_str = "DELETE FROM activities WHERE trip_id = ?";
    sqlx::query(query_str)
        .bind(trip_id.as_i64())
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

/// Gets the activities of trip `trip_id` in display order.
pub async fn get_activities(ex: &mut Executor, trip_id: TripId) -> DbResult<Vec<Activity>> {
    let query_str = "
        SELECT * FROM activities
        WHERE trip_id = ?
        ORDER BY day_number, order_index, id";
    let rows = sqlx::query(query_str)
        .bind(trip_id.as_i64())
        .fetch_all(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    rows.into_iter().map(Activity::try_from).collect()
}

/// Gets trip `id` along with its activities.
pub async fn get_trip(ex: &mut Executor, id: TripId) -> DbResult<Trip> {
    let query_str = "SELECT * FROM trips WHERE id = ?";
    let row = sqlx::query(query_str)
        .bind(id.as_i64())
        .fetch_one(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    let activities = get_activities(ex, id).await?;
    trip_from_row(&row, activities)
}

/// Gets the trip identified by `share_token` along with its activities.
pub async fn get_trip_by_share_token(
    ex: &mut Executor,
    share_token: &ShareToken,
) -> DbResult<Trip> {
    let query_str = "SELECT * FROM trips WHERE share_token = ?";
    let row = sqlx::query(query_str)
        .bind(share_token.as_str())
        .fetch_one(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let activities = get_activities(ex, TripId::new(id)).await?;
    trip_from_row(&row, activities)
}

/// Gets all trips owned by `owner`, sorted by identifier, along with their activities.
pub async fn list_trips_by_owner(ex: &mut Executor, owner: &Username) -> DbResult<Vec<Trip>> {
    let query_str = "
        SELECT activities.* FROM activities
        JOIN trips ON activities.trip_id = trips.id
        WHERE trips.owner = ?
        ORDER BY activities.trip_id, activities.day_number, activities.order_index, activities.id";
    let rows = sqlx::query(query_str)
        .bind(owner.as_str())
        .fetch_all(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    let mut activities: HashMap<i64, Vec<Activity>> = HashMap::new();
    for row in rows {
        let trip_id: i64 = row.try_get("trip_id").map_err(map_sqlx_error)?;
        activities.entry(trip_id).or_default().push(Activity::try_from(row)?);
    }

    let query_str = "SELECT * FROM trips WHERE owner = ? ORDER BY id";
    let rows = sqlx::query(query_str)
        .bind(owner.as_str())
        .fetch_all(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    let mut trips = Vec::with_capacity(rows.len());
    for row in rows {
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        trips.push(trip_from_row(&row, activities.remove(&id).unwrap_or_default())?);
    }
    Ok(trips)
}
