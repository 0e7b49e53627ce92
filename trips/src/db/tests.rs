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


//! Tests for the database layer.

use super::*;
use crate::model::NewTrip;
use itinerary_core::db::sqlite::testutils::setup;
use itinerary_core::db::Db;
use std::sync::Arc;
use time::macros::{date, time};

/// Initializes a test database with the schemas this crate depends on.
async fn setup_db() -> Arc<dyn Db + Send + Sync> {
    let db = Arc::from(setup().await);
    let mut ex = db.ex().await.unwrap();
    itinerary_authn::db::init_schema(&mut ex).await.unwrap();
    init_schema(&mut ex).await.unwrap();
    drop(ex);
    db
}

/// Creates a user named `username` directly in the database.
async fn create_user(ex: &mut Executor, username: &'static str) -> Username {
    let username = Username::new(username).unwrap();
    itinerary_authn::db::create_user(
        ex,
        username.clone(),
        itinerary_authn::model::HashedPassword::new("hash"),
        OffsetDateTime::from_unix_timestamp(1).unwrap(),
    )
    .await
    .unwrap();
    username
}

/// Builds trip details with the given `name` and fixed values for everything else.
fn details(name: &'static str) -> TripDetails {
    TripDetails {
        name: ShortText::from(name),
        destination_city: ShortText::from("Lisbon"),
        start_date: date!(2024 - 05 - 01),
        end_date: date!(2024 - 05 - 04),
    }
}

/// Builds a new activity with the given properties.
fn activity(title: &'static str, day: i64, order: i64) -> NewActivity {
    NewActivity {
        title: ShortText::from(title),
        time: None,
        day_number: DayNumber::new(day).unwrap(),
        order_index: OrderIndex::new(order).unwrap(),
    }
}

/// Creates a trip with `new` contents directly in the database.
async fn create_full_trip(
    ex: &mut Executor,
    new: &NewTrip,
    owner: Option<&Username>,
    now: OffsetDateTime,
) -> TripId {
    let id = create_trip(ex, &new.details, owner, &ShareToken::generate(), now).await.unwrap();
    insert_activities(ex, id, &new.activities, now).await.unwrap();
    id
}

/// Counts the number of rows in the activities table.
async fn count_activities(ex: &mut Executor) -> i64 {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM activities")
        .fetch_one(ex.conn())
        .await
        .unwrap();
    row.try_get("count").unwrap()
}

#[tokio::test]
async fn test_create_and_get_trip() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let owner = create_user(&mut ex, "alice").await;
    let share_token = ShareToken::generate();
    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    let id = create_trip(&mut ex, &details("Trip"), Some(&owner), &share_token, now).await.unwrap();
    let mut new_activity = activity("Museum", 2, 0);
    new_activity.time = Some(time!(10:30));
    insert_activities(&mut ex, id, &[new_activity], now).await.unwrap();

    let trip = get_trip(&mut ex, id).await.unwrap();
    assert_eq!(id, *trip.id());
    assert_eq!(&details("Trip"), trip.details());
    assert_eq!(&Some(owner), trip.owner());
    assert_eq!(&share_token, trip.share_token());
    assert_eq!(now, *trip.created_at());
    assert_eq!(now, *trip.updated_at());
    assert_eq!(1, trip.activities().len());
    let activity = &trip.activities()[0];
    assert_eq!("Museum", activity.title().as_str());
    assert_eq!(&Some(time!(10:30)), activity.time());
    assert_eq!(2, activity.day_number().as_u32());
    assert_eq!(0, activity.order_index().as_u32());

    assert_eq!(trip, get_trip_by_share_token(&mut ex, &share_token).await.unwrap());
}

#[tokio::test]
async fn test_create_trip_anonymous() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    let id = create_trip(&mut ex, &details("Trip"), None, &ShareToken::generate(), now)
        .await
        .unwrap();
    let trip = get_trip(&mut ex, id).await.unwrap();
    assert_eq!(&None, trip.owner());
    assert!(trip.activities().is_empty());
}

#[tokio::test]
async fn test_create_trip_unknown_owner() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    assert_eq!(
        DbError::NotFound,
        create_trip(
            &mut ex,
            &details("Trip"),
            Some(&Username::new("ghost").unwrap()),
            &ShareToken::generate(),
            now
        )
        .await
        .unwrap_err()
    );
}

#[tokio::test]
async fn test_create_trip_duplicate_share_token() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let share_token = ShareToken::generate();
    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    create_trip(&mut ex, &details("First"), None, &share_token, now).await.unwrap();
    assert_eq!(
        DbError::AlreadyExists,
        create_trip(&mut ex, &details("Second"), None, &share_token, now).await.unwrap_err()
    );
}

#[tokio::test]
async fn test_get_trip_not_found() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    assert_eq!(DbError::NotFound, get_trip(&mut ex, TripId::new(123)).await.unwrap_err());
    assert_eq!(
        DbError::NotFound,
        get_trip_by_share_token(&mut ex, &ShareToken::generate()).await.unwrap_err()
    );
}

#[tokio::test]
async fn test_activities_order() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    let new = NewTrip {
        details: details("Trip"),
        activities: vec![
            activity("d2-o0", 2, 0),
            activity("d1-o1", 1, 1),
            activity("d1-o0-first", 1, 0),
            activity("d1-o0-second", 1, 0),
        ],
    };
    let id = create_full_trip(&mut ex, &new, None, now).await;

    let titles = get_activities(&mut ex, id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.title().as_str().to_owned())
        .collect::<Vec<String>>();
    assert_eq!(vec!["d1-o0-first", "d1-o0-second", "d1-o1", "d2-o0"], titles);
}

#[tokio::test]
async fn test_update_trip() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let created = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    let new = NewTrip { details: details("Before"), activities: vec![activity("Keep", 1, 0)] };
    let id = create_full_trip(&mut ex, &new, None, created).await;
    let before = get_trip(&mut ex, id).await.unwrap();

    let updated = OffsetDateTime::from_unix_timestamp(2000).unwrap();
    update_trip(&mut ex, id, &details("After"), updated).await.unwrap();

    let after = get_trip(&mut ex, id).await.unwrap();
    assert_eq!(&details("After"), after.details());
    assert_eq!(created, *after.created_at());
    assert_eq!(updated, *after.updated_at());
    assert_eq!(before.share_token(), after.share_token());
    assert_eq!(before.activities(), after.activities());

    assert_eq!(
        DbError::NotFound,
        update_trip(&mut ex, TripId::new(id.as_i64() + 1), &details("X"), updated)
            .await
            .unwrap_err()
    );
}

#[tokio::test]
async fn test_replace_activities() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    let new1 = NewTrip {
        details: details("One"),
        activities: vec![activity("a", 1, 0), activity("b", 1, 1)],
    };
    let new2 = NewTrip { details: details("Two"), activities: vec![activity("c", 1, 0)] };
    let id1 = create_full_trip(&mut ex, &new1, None, now).await;
    let id2 = create_full_trip(&mut ex, &new2, None, now).await;

    delete_activities(&mut ex, id1).await.unwrap();
    assert!(get_activities(&mut ex, id1).await.unwrap().is_empty());
    assert_eq!(1, get_activities(&mut ex, id2).await.unwrap().len());

    insert_activities(&mut ex, id1, &[activity("z", 3, 0)], now).await.unwrap();
    let activities = get_activities(&mut ex, id1).await.unwrap();
    assert_eq!(1, activities.len());
    assert_eq!("z", activities[0].title().as_str());
}

#[tokio::test]
async fn test_delete_trip_cascades() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    let new = NewTrip {
        details: details("Trip"),
        activities: vec![activity("a", 1, 0), activity("b", 2, 0)],
    };
    let id = create_full_trip(&mut ex, &new, None, now).await;
    assert_eq!(2, count_activities(&mut ex).await);

    delete_trip(&mut ex, id).await.unwrap();
    assert_eq!(0, count_activities(&mut ex).await);
    assert_eq!(DbError::NotFound, get_trip(&mut ex, id).await.unwrap_err());
    assert_eq!(DbError::NotFound, delete_trip(&mut ex, id).await.unwrap_err());
}

#[tokio::test]
async fn test_delete_owner_cascades() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let owner = create_user(&mut ex, "alice").await;
    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    let new = NewTrip { details: details("Trip"), activities: vec![activity("a", 1, 0)] };
    let id = create_full_trip(&mut ex, &new, Some(&owner), now).await;

    itinerary_authn::db::delete_user(&mut ex, &owner).await.unwrap();
    assert_eq!(DbError::NotFound, get_trip(&mut ex, id).await.unwrap_err());
    assert_eq!(0, count_activities(&mut ex).await);
}

#[tokio::test]
async fn test_list_trips_by_owner() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let alice = create_user(&mut ex, "alice").await;
    let bob = create_user(&mut ex, "bob").await;
    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();

    let new1 = NewTrip {
        details: details("Alice 1"),
        activities: vec![activity("x", 2, 0), activity("y", 1, 0)],
    };
    let new2 = NewTrip { details: details("Bob 1"), activities: vec![activity("z", 1, 0)] };
    let new3 = NewTrip { details: details("Alice 2"), activities: vec![] };
    let new4 = NewTrip { details: details("Nobody"), activities: vec![activity("w", 1, 0)] };
    let id1 = create_full_trip(&mut ex, &new1, Some(&alice), now).await;
    let id2 = create_full_trip(&mut ex, &new2, Some(&bob), now).await;
    let id3 = create_full_trip(&mut ex, &new3, Some(&alice), now).await;
    create_full_trip(&mut ex, &new4, None, now).await;

    let trips = list_trips_by_owner(&mut ex, &alice).await.unwrap();
    assert_eq!(vec![id1, id3], trips.iter().map(|t| *t.id()).collect::<Vec<TripId>>());
    assert_eq!(trips[0], get_trip(&mut ex, id1).await.unwrap());
    assert_eq!(trips[1], get_trip(&mut ex, id3).await.unwrap());

    let trips = list_trips_by_owner(&mut ex, &bob).await.unwrap();
    assert_eq!(1, trips.len());
    assert_eq!(trips[0], get_trip(&mut ex, id2).await.unwrap());

    let carol = create_user(&mut ex, "carol").await;
    assert!(list_trips_by_owner(&mut ex, &carol).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupted_date() {
    let db = setup_db().await;
    let mut ex = db.ex().await.unwrap();

    let now = OffsetDateTime::from_unix_timestamp(1000).unwrap();
    let id = create_trip(&mut ex, &details("Trip"), None, &ShareToken::generate(), now)
        .await
        .unwrap();
    sqlx::query("UPDATE trips SET start_date = 'yesterday'").execute(ex.conn()).await.unwrap();

    match get_trip(&mut ex, id).await {
        Err(DbError::DataIntegrityError(e)) => assert!(e.contains("Date has wrong format")),
        e => panic!("{:?}", e),
    }
}
