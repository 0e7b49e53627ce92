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


//! Operations on the collection of trips.

use crate::db;
use crate::driver::Driver;
use crate::model::{NewTrip, ShareToken, Trip};
use itinerary_authn::model::Username;
use itinerary_core::driver::DriverResult;
use log::info;

impl Driver {
    /// Creates a new trip with its initial activities.  The trip belongs to `owner`, if any.
    pub(crate) async fn create_trip(
        self,
        owner: Option<Username>,
        new: NewTrip,
    ) -> DriverResult<Trip> {
        let mut tx = self.db.begin_write().await?;
        let now = self.clock.now_utc();

        let share_token = ShareToken::generate();
        let id = db::create_trip(tx.ex(), &new.details, owner.as_ref(), &share_token, now).await?;
        db::insert_activities(tx.ex(), id, &new.activities, now).await?;
        let trip = db::get_trip(tx.ex(), id).await?;

        tx.commit().await?;
        info!("Created trip {} with {} activities", id, trip.activities().len());
        Ok(trip)
    }

    /// Gets all trips that belong to `owner`.  Anonymous callers own nothing.
    pub(crate) async fn list_trips(self, owner: Option<Username>) -> DriverResult<Vec<Trip>> {
        let owner = match owner {
            Some(owner) => owner,
            None => return Ok(vec![]),
        };

        let mut tx = self.db.begin().await?;
        let trips = db::list_trips_by_owner(tx.ex(), &owner).await?;
        tx.commit().await?;
        Ok(trips)
    }
}
