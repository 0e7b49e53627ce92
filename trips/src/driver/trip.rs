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


//! Operations on a single trip.

use crate::db;
use crate::driver::{trip_lookup_error, Driver};
use crate::model::{ShareToken, Trip, TripId, TripUpdate};
use itinerary_core::driver::DriverResult;
use log::info;

impl Driver {
    /// Gets the trip identified by `id`.
    pub(crate) async fn get_trip(self, id: TripId) -> DriverResult<Trip> {
        let mut tx = self.db.begin().await?;
        let trip = db::get_trip(tx.ex(), id).await.map_err(trip_lookup_error)?;
        tx.commit().await?;
        Ok(trip)
    }

    /// Gets the trip that was shared under `share_token`.
    pub(crate) async fn get_shared_trip(self, share_token: ShareToken) -> DriverResult<Trip> {
        let mut tx = self.db.begin().await?;
        let trip =
            db::get_trip_by_share_token(tx.ex(), &share_token).await.map_err(trip_lookup_error)?;
        tx.commit().await?;
        Ok(trip)
    }

    /// Modifies the trip identified by `id` according to `update`.
    ///
    /// If the update carries activities, these replace all existing activities of the trip.
    pub(crate) async fn update_trip(self, id: TripId, update: TripUpdate) -> DriverResult<Trip> {
        let mut tx = self.db.begin_write().await?;
        let now = self.clock.now_utc();

        let current = db::get_trip(tx.ex(), id).await.map_err(trip_lookup_error)?;
        let details = update.apply(current.details());
        db::update_trip(tx.ex(), id, &details, now).await?;

        if let Some(activities) = update.activities {
            db::delete_activities(tx.ex(), id).await?;
            db::insert_activities(tx.ex(), id, &activities, now).await?;
        }

        let trip = db::get_trip(tx.ex(), id).await?;
        tx.commit().await?;
        info!("Updated trip {}", id);
        Ok(trip)
    }

    /// Deletes the trip identified by `id` along with all of its activities.
    pub(crate) async fn delete_trip(self, id: TripId) -> DriverResult<()> {
        let mut tx = self.db.begin_write().await?;
        db::delete_trip(tx.ex(), id).await.map_err(trip_lookup_error)?;
        tx.commit().await?;
        info!("Deleted trip {}", id);
        Ok(())
    }
}
